//! Persistence for the `cars` and `bookings` collections.
//!
//! Two backends implement [`Store`]: [`crate::db_client::DbClient`] over
//! Postgres and [`MemoryStore`] for tests and local runs. Both must make
//! [`Store::reserve_car`] atomic: the availability check, the flip to
//! unavailable and the booking insert either all happen or none do.

use async_trait::async_trait;
use thiserror::Error;

use crate::rental::{Booking, Car, NewBooking, NewCar};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
	#[error("Car not found")]
	CarNotFound,

	#[error("Car is not available")]
	CarUnavailable,

	#[error("Database error: {0}")]
	Database(#[from] tokio_postgres::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
	async fn list_cars(&self) -> Result<Vec<Car>, StoreError>;

	async fn get_car(&self, id: &str) -> Result<Car, StoreError>;

	async fn insert_car(&self, car: NewCar) -> Result<Car, StoreError>;

	async fn set_availability(&self, id: &str, availability: bool) -> Result<Car, StoreError>;

	/// Bookings owned by `user_id`, earliest start first.
	async fn list_bookings(&self, user_id: &str) -> Result<Vec<Booking>, StoreError>;

	/// Claims the car and records the booking in one step. Fails with
	/// [`StoreError::CarUnavailable`] if the car is already taken.
	async fn reserve_car(&self, booking: NewBooking) -> Result<Booking, StoreError>;
}
