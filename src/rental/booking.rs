use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use postgres_from_row::FromRow;
use thiserror::Error;

#[derive(serde::Deserialize, serde::Serialize, FromRow, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
	pub id: String,
	pub user_id: String,
	pub car_id: String,
	pub start_date: DateTime<Utc>,
	pub end_date: DateTime<Utc>,
}

/// Body of `POST /api/bookings`. Dates arrive as strings and are parsed by
/// [`BookingRequest::into_new_booking`].
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
	#[serde(default)]
	pub user_id: String,
	#[serde(default)]
	pub car_id: String,
	#[serde(default)]
	pub start_date: String,
	#[serde(default)]
	pub end_date: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingRequestError {
	#[error("User ID is required")]
	MissingUserId,
	#[error("Car ID is required")]
	MissingCarId,
	#[error(transparent)]
	Dates(#[from] DateError),
}

impl BookingRequest {
	pub fn into_new_booking(self) -> Result<NewBooking, BookingRequestError> {
		if self.user_id.trim().is_empty() {
			return Err(BookingRequestError::MissingUserId);
		}
		if self.car_id.trim().is_empty() {
			return Err(BookingRequestError::MissingCarId);
		}
		let window = BookingWindow::parse(&self.start_date, &self.end_date)?;

		Ok(NewBooking {
			user_id: self.user_id,
			car_id: self.car_id,
			window,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
	pub user_id: String,
	pub car_id: String,
	pub window: BookingWindow,
}

impl NewBooking {
	pub fn into_booking(self, id: String) -> Booking {
		Booking {
			id,
			user_id: self.user_id,
			car_id: self.car_id,
			start_date: self.window.start,
			end_date: self.window.end,
		}
	}
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateError {
	#[error("Start date is required")]
	MissingStart,
	#[error("End date is required")]
	MissingEnd,
	#[error("Invalid start date")]
	InvalidStart,
	#[error("Invalid end date")]
	InvalidEnd,
	#[error("End date must not be before start date")]
	EndBeforeStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
	pub start: DateTime<Utc>,
	pub end: DateTime<Utc>,
}

impl BookingWindow {
	pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DateError> {
		if end < start {
			return Err(DateError::EndBeforeStart);
		}
		Ok(Self { start, end })
	}

	pub fn parse(start: &str, end: &str) -> Result<Self, DateError> {
		Self::new(parse_start(start)?, parse_end(end)?)
	}
}

pub fn parse_start(value: &str) -> Result<DateTime<Utc>, DateError> {
	if value.trim().is_empty() {
		return Err(DateError::MissingStart);
	}
	parse_date(value).ok_or(DateError::InvalidStart)
}

pub fn parse_end(value: &str) -> Result<DateTime<Utc>, DateError> {
	if value.trim().is_empty() {
		return Err(DateError::MissingEnd);
	}
	parse_date(value).ok_or(DateError::InvalidEnd)
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD`, which is taken as
/// midnight UTC the way browser date inputs are submitted. Sub-second parts
/// are cut to microseconds, the precision of a `TIMESTAMPTZ` column.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
	let value = value.trim();
	if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
		return Some(timestamp.with_timezone(&Utc).trunc_subsecs(6));
	}
	NaiveDate::parse_from_str(value, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|midnight| midnight.and_utc())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_parse_date_only_is_midnight_utc() {
		let parsed = parse_date("2024-05-01").unwrap();
		assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
	}

	#[test]
	fn test_parse_truncates_to_microseconds() {
		let parsed = parse_date("2030-01-01T08:00:00.123456789Z").unwrap();
		assert_eq!(parsed, Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap() + chrono::Duration::microseconds(123_456));
		assert_eq!(parsed.to_rfc3339(), "2030-01-01T08:00:00.123456+00:00");
	}

	#[test]
	fn test_parse_rfc3339_normalises_offset() {
		let parsed = parse_date("2024-05-01T12:00:00+02:00").unwrap();
		assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
	}

	#[test]
	fn test_window_errors() {
		assert_eq!(BookingWindow::parse("", "2024-05-02"), Err(DateError::MissingStart));
		assert_eq!(BookingWindow::parse("2024-05-01", " "), Err(DateError::MissingEnd));
		assert_eq!(BookingWindow::parse("tomorrow", "2024-05-02"), Err(DateError::InvalidStart));
		assert_eq!(BookingWindow::parse("2024-05-01", "2024-13-40"), Err(DateError::InvalidEnd));
		assert_eq!(BookingWindow::parse("2024-05-03", "2024-05-02"), Err(DateError::EndBeforeStart));
		assert!(BookingWindow::parse("2024-05-01", "2024-05-01").is_ok());
	}

	#[test]
	fn test_request_requires_ids() {
		let request = BookingRequest {
			user_id: String::new(),
			car_id: "car".to_owned(),
			start_date: "2024-05-01".to_owned(),
			end_date: "2024-05-02".to_owned(),
		};
		assert_eq!(request.clone().into_new_booking(), Err(BookingRequestError::MissingUserId));

		let request = BookingRequest {
			user_id: "user".to_owned(),
			car_id: String::new(),
			..request
		};
		assert_eq!(request.into_new_booking(), Err(BookingRequestError::MissingCarId));
	}

	#[test]
	fn test_booking_serializes_camel_case() {
		let booking = BookingRequest {
			user_id: "u1".to_owned(),
			car_id: "c1".to_owned(),
			start_date: "2024-05-01".to_owned(),
			end_date: "2024-05-04".to_owned(),
		}
		.into_new_booking()
		.unwrap()
		.into_booking("b1".to_owned());

		let json = serde_json::to_value(&booking).unwrap();
		assert_eq!(json["userId"], "u1");
		assert_eq!(json["carId"], "c1");
		assert_eq!(json["startDate"], "2024-05-01T00:00:00Z");
	}
}
