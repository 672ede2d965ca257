//! Car rental service: a catalog of cars, bookings against them, and the
//! client side that drives the booking flow.
//!
//! # Server
//!
//! | Method | Path                          | Body                                  |
//! |--------|-------------------------------|---------------------------------------|
//! | GET    | `/api/cars`                   |                                       |
//! | GET    | `/api/cars/:id`               |                                       |
//! | POST   | `/api/cars`                   | `{name, model, price, description}`   |
//! | PUT    | `/api/cars/:id/availability`  | `{availability}`                      |
//! | GET    | `/api/bookings?userId=...`    |                                       |
//! | POST   | `/api/bookings`               | `{userId, carId, startDate, endDate}` |
//!
//! Responses are `{ "data": ... }` on success and `{ "error": "..." }` otherwise.
//!
//! A booking claims its car: the store flips `availability` to false in the
//! same operation that inserts the booking, so a second booking for the same
//! car gets `409 Conflict` instead of silently double-booking.
//!
//! # Client
//!
//! [`client::ApiClient`] wraps the endpoints above, [`users::IdentityClient`]
//! signs users in against the identity provider and yields a
//! [`users::Session`], and [`client::workflow::BookingWorkflow`] runs the
//! validate, check, book sequence behind the booking form.
//!
//! # Setup
//!
//! ```sh
//! STORE=memory RUST_LOG=debug cargo run
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
	http::{
		header::{AUTHORIZATION, CONTENT_TYPE},
		HeaderValue, Method,
	},
	routing::{get, put},
	Router,
};
use log::{error, info};
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod bookings;
pub mod cars;
pub mod client;
pub mod config;
pub mod db_client;
pub mod error;
pub mod id_engine;
pub mod rental;
pub mod store;
pub mod users;

use bookings::{create_booking, get_bookings};
use cars::{add_car, get_car, get_cars, update_availability};
use config::{Config, StoreKind};
use db_client::DbClient;
use store::{MemoryStore, Store};

pub type SharedStore = Arc<dyn Store>;

pub fn router(store: SharedStore) -> Router {
	Router::new()
		.route("/api/cars", get(get_cars).post(add_car))
		.route("/api/cars/:id", get(get_car))
		.route("/api/cars/:id/availability", put(update_availability))
		.route("/api/bookings", get(get_bookings).post(create_booking))
		.with_state(store)
}

pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
	let origins = allowed_origins
		.iter()
		.map(|origin| HeaderValue::from_str(origin).with_context(|| format!("invalid origin {origin:?}")))
		.collect::<anyhow::Result<Vec<_>>>()?;

	Ok(CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
		.allow_headers([CONTENT_TYPE, AUTHORIZATION])
		.allow_credentials(true)
		.max_age(Duration::from_secs(60 * 60)))
}

pub async fn open_store(config: &Config) -> anyhow::Result<SharedStore> {
	match config.store {
		StoreKind::Postgres => {
			let db = DbClient::connect(&config.db).await.context("failed to connect to postgres")?;
			db.init_schema().await.context("failed to create tables")?;
			Ok(Arc::new(db))
		}
		StoreKind::Memory => {
			info!("Using in-memory store, data is lost on shutdown");
			Ok(Arc::new(MemoryStore::new()))
		}
	}
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
	info!("Opening {:?} store...", config.store);
	let store = open_store(&config).await?;

	let app = router(store).layer(cors_layer(&config.allowed_origins)?);

	let address = format!("0.0.0.0:{}", config.port);
	let listener = TcpListener::bind(&address).await.with_context(|| format!("failed to bind {address}"))?;
	info!("Server running on {address}");

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	info!("Server shut down");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		match ctrl_c().await {
			Ok(()) => info!("Received Ctrl+C, shutting down"),
			Err(e) => {
				error!("Failed to install Ctrl+C handler: {}", e);
				std::future::pending::<()>().await
			}
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal(SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
				info!("Received terminate signal, shutting down");
			}
			Err(e) => {
				error!("Failed to install signal handler: {}", e);
				std::future::pending::<()>().await
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
