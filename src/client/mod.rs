//! Typed access to the rental API, for front ends and tools.

pub mod api;
pub mod workflow;

pub use api::{ApiClient, ClientError};
pub use workflow::{BookingConfirmation, BookingError, BookingForm, BookingWorkflow};
