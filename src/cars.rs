use axum::{
	extract::{rejection::JsonRejection, Path, State},
	Json,
};
use hyper::StatusCode;
use log::{info, warn};

use crate::{
	error::ApiError,
	rental::{AvailabilityUpdate, Car, Data, NewCar},
	SharedStore,
};

pub async fn get_cars(store: State<SharedStore>) -> Result<Json<Data<Vec<Car>>>, ApiError> {
	let cars = store.list_cars().await?;
	Ok(Json(Data { data: cars }))
}

pub async fn get_car(store: State<SharedStore>, Path(car_id): Path<String>) -> Result<Json<Data<Car>>, ApiError> {
	let car = store.get_car(&car_id).await.inspect_err(|e| warn!("car {} lookup failed: {}", car_id, e))?;
	Ok(Json(Data { data: car }))
}

pub async fn add_car(
	store: State<SharedStore>,
	car: Result<Json<NewCar>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Car>>), ApiError> {
	let Json(car) = car?;
	car.validate().map_err(ApiError::BadRequest)?;

	let car = store.insert_car(car).await?;
	info!("added car {} ({} {})", car.id, car.name, car.model);
	Ok((StatusCode::CREATED, Json(Data { data: car })))
}

pub async fn update_availability(
	store: State<SharedStore>,
	Path(car_id): Path<String>,
	update: Result<Json<AvailabilityUpdate>, JsonRejection>,
) -> Result<Json<Data<Car>>, ApiError> {
	let Json(update) = update?;
	let car = store.set_availability(&car_id, update.availability).await?;
	info!("car {} availability set to {}", car.id, car.availability);
	Ok(Json(Data { data: car }))
}
