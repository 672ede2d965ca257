use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use log::{error, info};
use postgres_from_row::FromRow;
use tokio_postgres::{Client, NoTls};

use crate::{
	config::DbConfig,
	id_engine::new_id,
	rental::{Booking, Car, NewBooking, NewCar},
	store::{Store, StoreError},
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cars (
	id TEXT PRIMARY KEY,
	name TEXT NOT NULL,
	model TEXT NOT NULL,
	price DOUBLE PRECISION NOT NULL,
	description TEXT NOT NULL DEFAULT '',
	availability BOOLEAN NOT NULL DEFAULT TRUE
);
CREATE TABLE IF NOT EXISTS bookings (
	id TEXT PRIMARY KEY,
	user_id TEXT NOT NULL,
	car_id TEXT NOT NULL REFERENCES cars (id),
	start_date TIMESTAMPTZ NOT NULL,
	end_date TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS bookings_user_id_idx ON bookings (user_id);
";

const CAR_COLUMNS: &str = "id, name, model, price, description, availability";
const BOOKING_COLUMNS: &str = "id, user_id, car_id, start_date, end_date";

#[derive(Clone)]
pub struct DbClient(pub Arc<Client>);

impl Deref for DbClient {
	type Target = Client;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DbClient {
	pub async fn connect(config: &DbConfig) -> Result<Self, tokio_postgres::Error> {
		let mut pg = tokio_postgres::Config::new();
		pg.host(&config.host).port(config.port).user(&config.user).password(&config.password).dbname(&config.name);

		let (client, monitor) = pg.connect(NoTls).await?;
		tokio::spawn(async move {
			if let Err(e) = monitor.await {
				error!("Connection error: {}", e);
			}
		});
		info!("Connected to postgres at {}:{}/{}", config.host, config.port, config.name);

		Ok(DbClient(Arc::new(client)))
	}

	pub async fn init_schema(&self) -> Result<(), tokio_postgres::Error> {
		self.batch_execute(SCHEMA).await
	}
}

#[async_trait]
impl Store for DbClient {
	async fn list_cars(&self) -> Result<Vec<Car>, StoreError> {
		let q = format!("SELECT {CAR_COLUMNS} FROM cars ORDER BY name, id");
		let rows = self.query(q.as_str(), &[]).await?;
		let cars = rows.iter().map(Car::try_from_row).collect::<Result<Vec<_>, _>>()?;
		Ok(cars)
	}

	async fn get_car(&self, id: &str) -> Result<Car, StoreError> {
		let q = format!("SELECT {CAR_COLUMNS} FROM cars WHERE id=$1");
		let Some(row) = self.query_opt(q.as_str(), &[&id]).await? else {
			return Err(StoreError::CarNotFound);
		};
		Ok(Car::try_from_row(&row)?)
	}

	async fn insert_car(&self, car: NewCar) -> Result<Car, StoreError> {
		let car = car.into_car(new_id());
		let statement = "INSERT INTO cars (id,name,model,price,description,availability) VALUES ($1,$2,$3,$4,$5,$6)";
		self.execute(statement, &[&car.id, &car.name, &car.model, &car.price, &car.description, &car.availability])
			.await?;
		Ok(car)
	}

	async fn set_availability(&self, id: &str, availability: bool) -> Result<Car, StoreError> {
		let q = format!("UPDATE cars SET availability=$2 WHERE id=$1 RETURNING {CAR_COLUMNS}");
		let Some(row) = self.query_opt(q.as_str(), &[&id, &availability]).await? else {
			return Err(StoreError::CarNotFound);
		};
		Ok(Car::try_from_row(&row)?)
	}

	async fn list_bookings(&self, user_id: &str) -> Result<Vec<Booking>, StoreError> {
		let q = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id=$1 ORDER BY start_date");
		let rows = self.query(q.as_str(), &[&user_id]).await?;
		let bookings = rows.iter().map(Booking::try_from_row).collect::<Result<Vec<_>, _>>()?;
		Ok(bookings)
	}

	async fn reserve_car(&self, booking: NewBooking) -> Result<Booking, StoreError> {
		let booking = booking.into_booking(new_id());
		// The UPDATE only matches an available car, so the INSERT runs at most once per car.
		let q = format!(
			"WITH claimed AS (
				UPDATE cars SET availability=FALSE WHERE id=$1 AND availability RETURNING id
			)
			INSERT INTO bookings ({BOOKING_COLUMNS})
			SELECT $2, $3, claimed.id, $4, $5 FROM claimed
			RETURNING {BOOKING_COLUMNS}"
		);
		let claimed = self
			.query_opt(
				q.as_str(),
				&[&booking.car_id, &booking.id, &booking.user_id, &booking.start_date, &booking.end_date],
			)
			.await?;
		if let Some(row) = claimed {
			return Ok(Booking::try_from_row(&row)?);
		}

		match self.query_opt("SELECT availability FROM cars WHERE id=$1", &[&booking.car_id]).await? {
			Some(_) => Err(StoreError::CarUnavailable),
			None => Err(StoreError::CarNotFound),
		}
	}
}
