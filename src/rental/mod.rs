pub mod booking;
pub mod car;

pub use booking::{Booking, BookingRequest, BookingWindow, DateError, NewBooking};
pub use car::{AvailabilityUpdate, Car, NewCar};

/// Every successful API response is wrapped as `{ "data": ... }`.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Data<T> {
	pub data: T,
}
