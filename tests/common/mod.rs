#![allow(dead_code)]

use std::sync::Arc;

use car_rental::{
	client::ApiClient,
	rental::{Car, NewCar},
	router,
	store::MemoryStore,
	users::Session,
};
use chrono::{Duration, Utc};
use tokio::net::TcpListener;

/// Serves the API over a fresh in-memory store and returns its base url.
pub async fn spawn_app() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("failed to bind");
	let address = listener.local_addr().expect("no local address");
	let app = router(Arc::new(MemoryStore::new()));

	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("server stopped");
	});

	format!("http://{}", address)
}

pub fn session(user_id: &str) -> Session {
	Session {
		user_id: user_id.to_owned(),
		email: format!("{}@example.com", user_id),
		id_token: format!("token-{}", user_id),
		refresh_token: None,
	}
}

pub fn sedan(name: &str) -> NewCar {
	NewCar {
		name: name.to_owned(),
		model: "2023".to_owned(),
		price: 55.5,
		description: "Automatic, five seats".to_owned(),
	}
}

pub async fn add_car(api: &ApiClient, name: &str) -> Car {
	api.add_car(&sedan(name)).await.expect("failed to add car")
}

/// `YYYY-MM-DD`, `days` from today.
pub fn date_in(days: i64) -> String {
	(Utc::now() + Duration::days(days)).format("%Y-%m-%d").to_string()
}
