use axum::{
	extract::rejection::JsonRejection,
	response::{IntoResponse, Response},
	Json,
};
use hyper::StatusCode;
use log::error;
use thiserror::Error;

use crate::store::StoreError;

/// Error payload, `{ "error": "..." }`.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
	pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
	#[error("{0}")]
	BadRequest(String),

	#[error("{0}")]
	NotFound(&'static str),

	#[error("{0}")]
	Conflict(&'static str),

	#[error("Internal error: {0}")]
	Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::Conflict(_) => StatusCode::CONFLICT,
			ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<StoreError> for ApiError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::CarNotFound => ApiError::NotFound("Car not found"),
			StoreError::CarUnavailable => ApiError::Conflict("Car is not available"),
			StoreError::Database(e) => ApiError::Internal(Box::new(e)),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::BadRequest(rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = match &self {
			ApiError::Internal(e) => {
				error!("Request failed: {}", e);
				"Internal server error".to_owned()
			}
			_ => self.to_string(),
		};

		(status, Json(ErrorBody { error: message })).into_response()
	}
}
