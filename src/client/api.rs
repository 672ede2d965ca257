use log::debug;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
	error::ErrorBody,
	rental::{AvailabilityUpdate, Booking, BookingRequest, BookingWindow, Car, Data, NewCar},
	users::Session,
};

#[derive(Error, Debug)]
pub enum ClientError {
	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Bad request: {0}")]
	BadRequest(String),

	#[error("Server returned {status}: {message}")]
	Status { status: u16, message: String },

	#[error("Network error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("Unexpected response body: {0}")]
	Decode(#[source] reqwest::Error),
}

/// Client for the `/api` endpoints. Every call is a single request with no
/// retry; failures surface as [`ClientError`].
#[derive(Clone, Debug)]
pub struct ApiClient {
	http: reqwest::Client,
	base_url: String,
	id_token: Option<String>,
}

impl ApiClient {
	/// `base_url` is the server root, e.g. `http://localhost:5000`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url: base_url.into().trim_end_matches('/').to_owned(),
			id_token: None,
		}
	}

	/// A copy of this client that sends the session's id token as a bearer token.
	pub fn with_session(&self, session: &Session) -> Self {
		Self {
			id_token: Some(session.id_token.clone()),
			..self.clone()
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}/api{}", self.base_url, path)
	}

	async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
		let request = match &self.id_token {
			Some(token) => request.bearer_auth(token),
			None => request,
		};

		let response = request.send().await?;
		let status = response.status();
		debug!("{} {}", status, response.url());

		if status.is_success() {
			let Data { data } = response.json::<Data<T>>().await.map_err(ClientError::Decode)?;
			return Ok(data);
		}

		let message = match response.json::<ErrorBody>().await {
			Ok(body) => body.error,
			Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
		};
		Err(match status {
			StatusCode::NOT_FOUND => ClientError::NotFound(message),
			StatusCode::CONFLICT => ClientError::Conflict(message),
			StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
			_ => ClientError::Status {
				status: status.as_u16(),
				message,
			},
		})
	}

	pub async fn fetch_cars(&self) -> Result<Vec<Car>, ClientError> {
		self.send(self.http.get(self.url("/cars"))).await
	}

	pub async fn fetch_car(&self, car_id: &str) -> Result<Car, ClientError> {
		self.send(self.http.get(self.url(&format!("/cars/{}", car_id)))).await
	}

	pub async fn add_car(&self, car: &NewCar) -> Result<Car, ClientError> {
		self.send(self.http.post(self.url("/cars")).json(car)).await
	}

	pub async fn update_car_availability(&self, car_id: &str, availability: bool) -> Result<Car, ClientError> {
		let url = self.url(&format!("/cars/{}/availability", car_id));
		self.send(self.http.put(url).json(&AvailabilityUpdate { availability })).await
	}

	pub async fn fetch_bookings(&self, user_id: &str) -> Result<Vec<Booking>, ClientError> {
		self.send(self.http.get(self.url("/bookings")).query(&[("userId", user_id)])).await
	}

	pub async fn create_booking(&self, user_id: &str, car_id: &str, window: BookingWindow) -> Result<Booking, ClientError> {
		let request = BookingRequest {
			user_id: user_id.to_owned(),
			car_id: car_id.to_owned(),
			start_date: window.start.to_rfc3339(),
			end_date: window.end.to_rfc3339(),
		};
		self.send(self.http.post(self.url("/bookings")).json(&request)).await
	}
}
