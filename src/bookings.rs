use axum::{
	extract::{rejection::JsonRejection, Query, State},
	Json,
};
use hyper::StatusCode;
use log::{info, warn};

use crate::{
	error::ApiError,
	rental::{Booking, BookingRequest, Data},
	store::StoreError,
	SharedStore,
};

#[derive(serde::Deserialize, Debug)]
pub struct BookingsQuery {
	#[serde(rename = "userId")]
	user_id: Option<String>,
}

pub async fn get_bookings(
	store: State<SharedStore>,
	Query(query): Query<BookingsQuery>,
) -> Result<Json<Data<Vec<Booking>>>, ApiError> {
	let Some(user_id) = query.user_id.filter(|id| !id.trim().is_empty()) else {
		return Err(ApiError::BadRequest("User ID is required".to_owned()));
	};

	let bookings = store.list_bookings(&user_id).await?;
	Ok(Json(Data { data: bookings }))
}

/// Creates the booking and marks the car unavailable in one store operation.
pub async fn create_booking(
	store: State<SharedStore>,
	request: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Booking>>), ApiError> {
	let Json(request) = request?;
	let booking = request.into_new_booking().map_err(|e| ApiError::BadRequest(e.to_string()))?;
	let (user_id, car_id) = (booking.user_id.clone(), booking.car_id.clone());

	let booking = match store.reserve_car(booking).await {
		Ok(booking) => booking,
		Err(StoreError::CarUnavailable) => {
			warn!("user {} tried to book unavailable car {}", user_id, car_id);
			return Err(StoreError::CarUnavailable.into());
		}
		Err(e) => return Err(e.into()),
	};

	info!("booking {} created: car {} for user {}", booking.id, booking.car_id, booking.user_id);
	Ok((StatusCode::CREATED, Json(Data { data: booking })))
}
