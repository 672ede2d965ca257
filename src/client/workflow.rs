use chrono::{DateTime, Utc};
use log::{info, warn};
use thiserror::Error;

use super::{ApiClient, ClientError};
use crate::{
	rental::{
		booking::{parse_end, parse_start},
		Booking, BookingWindow, Car, DateError,
	},
	users::Session,
};

#[derive(Error, Debug)]
pub enum BookingError {
	#[error("{0}")]
	InvalidDates(#[from] DateError),

	#[error("End date must be in the future")]
	EndDateInPast,

	#[error("Car not found")]
	CarNotFound,

	#[error("This car is not available for booking")]
	CarUnavailable,

	#[error("Failed to create booking: {0}")]
	Client(ClientError),
}

impl BookingError {
	/// True when the form was rejected locally and nothing was sent.
	pub fn is_validation(&self) -> bool {
		matches!(self, BookingError::InvalidDates(_) | BookingError::EndDateInPast)
	}
}

impl From<ClientError> for BookingError {
	fn from(err: ClientError) -> Self {
		match err {
			ClientError::NotFound(_) => BookingError::CarNotFound,
			ClientError::Conflict(_) => BookingError::CarUnavailable,
			other => BookingError::Client(other),
		}
	}
}

/// Raw values of the booking form's two date inputs.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
	pub start_date: String,
	pub end_date: String,
}

impl BookingForm {
	pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
		Self {
			start_date: start_date.into(),
			end_date: end_date.into(),
		}
	}

	pub fn validate(&self, now: DateTime<Utc>) -> Result<BookingWindow, BookingError> {
		let start = parse_start(&self.start_date)?;
		let end = parse_end(&self.end_date)?;
		if end <= now {
			return Err(BookingError::EndDateInPast);
		}
		Ok(BookingWindow::new(start, end)?)
	}
}

#[derive(Debug, Clone)]
pub struct BookingConfirmation {
	pub booking: Booking,
	/// The car as the server holds it after the booking, i.e. unavailable.
	pub car: Car,
}

pub struct BookingWorkflow {
	api: ApiClient,
}

impl BookingWorkflow {
	pub fn new(api: ApiClient) -> Self {
		Self { api }
	}

	pub async fn submit(&self, session: &Session, car_id: &str, form: &BookingForm) -> Result<BookingConfirmation, BookingError> {
		self.submit_at(session, car_id, form, Utc::now()).await
	}

	/// Validates the form against `now`, checks the car is still available and
	/// books it. The availability check here only saves a doomed request; the
	/// server claims the car atomically and answers 409 if another booking won.
	pub async fn submit_at(
		&self,
		session: &Session,
		car_id: &str,
		form: &BookingForm,
		now: DateTime<Utc>,
	) -> Result<BookingConfirmation, BookingError> {
		let window = form.validate(now)?;
		let api = self.api.with_session(session);

		let car = api.fetch_car(car_id).await?;
		if !car.availability {
			warn!("car {} is already booked", car_id);
			return Err(BookingError::CarUnavailable);
		}

		let booking = api.create_booking(&session.user_id, car_id, window).await?;
		info!("booked car {} as {}", car_id, booking.id);

		// The booking stands from here on; a failed refresh must not report it as failed.
		let car = match api.fetch_car(car_id).await {
			Ok(car) => car,
			Err(e) => {
				warn!("booking {} created but refreshing car {} failed: {}", booking.id, car_id, e);
				Car {
					availability: false,
					..car
				}
			}
		};
		Ok(BookingConfirmation { booking, car })
	}
}
