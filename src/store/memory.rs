use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Store, StoreError};
use crate::{
	id_engine::new_id,
	rental::{Booking, Car, NewBooking, NewCar},
};

#[derive(Default)]
struct Collections {
	cars: Vec<Car>,
	bookings: Vec<Booking>,
}

/// In-process store. One lock covers both collections so that a reservation
/// sees and updates them together.
#[derive(Default)]
pub struct MemoryStore {
	collections: RwLock<Collections>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl Store for MemoryStore {
	async fn list_cars(&self) -> Result<Vec<Car>, StoreError> {
		Ok(self.collections.read().cars.clone())
	}

	async fn get_car(&self, id: &str) -> Result<Car, StoreError> {
		let collections = self.collections.read();
		collections.cars.iter().find(|car| car.id == id).cloned().ok_or(StoreError::CarNotFound)
	}

	async fn insert_car(&self, car: NewCar) -> Result<Car, StoreError> {
		let car = car.into_car(new_id());
		self.collections.write().cars.push(car.clone());
		Ok(car)
	}

	async fn set_availability(&self, id: &str, availability: bool) -> Result<Car, StoreError> {
		let mut collections = self.collections.write();
		let car = collections.cars.iter_mut().find(|car| car.id == id).ok_or(StoreError::CarNotFound)?;
		car.availability = availability;
		Ok(car.clone())
	}

	async fn list_bookings(&self, user_id: &str) -> Result<Vec<Booking>, StoreError> {
		let mut bookings: Vec<Booking> =
			self.collections.read().bookings.iter().filter(|booking| booking.user_id == user_id).cloned().collect();
		bookings.sort_by_key(|booking| booking.start_date);
		Ok(bookings)
	}

	async fn reserve_car(&self, booking: NewBooking) -> Result<Booking, StoreError> {
		let mut collections = self.collections.write();
		let car = collections.cars.iter_mut().find(|car| car.id == booking.car_id).ok_or(StoreError::CarNotFound)?;
		if !car.availability {
			return Err(StoreError::CarUnavailable);
		}
		car.availability = false;

		let booking = booking.into_booking(new_id());
		collections.bookings.push(booking.clone());
		Ok(booking)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rental::BookingWindow;

	fn new_car(name: &str) -> NewCar {
		NewCar {
			name: name.to_owned(),
			model: "2021".to_owned(),
			price: 30.0,
			description: String::new(),
		}
	}

	fn new_booking(user_id: &str, car_id: &str, start: &str) -> NewBooking {
		NewBooking {
			user_id: user_id.to_owned(),
			car_id: car_id.to_owned(),
			window: BookingWindow::parse(start, "2030-12-31").unwrap(),
		}
	}

	#[tokio::test]
	async fn test_insert_and_get_car() {
		let store = MemoryStore::new();
		let car = store.insert_car(new_car("Yaris")).await.unwrap();

		let fetched = store.get_car(&car.id).await.unwrap();
		assert_eq!(fetched, car);
		assert!(fetched.availability);
		assert_eq!(store.list_cars().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_unknown_car_is_not_found() {
		let store = MemoryStore::new();
		assert!(matches!(store.get_car("missing").await, Err(StoreError::CarNotFound)));
		assert!(matches!(store.set_availability("missing", false).await, Err(StoreError::CarNotFound)));
		assert!(matches!(
			store.reserve_car(new_booking("u", "missing", "2030-01-01")).await,
			Err(StoreError::CarNotFound)
		));
	}

	#[tokio::test]
	async fn test_reserve_flips_availability_once() {
		let store = MemoryStore::new();
		let car = store.insert_car(new_car("Golf")).await.unwrap();

		let booking = store.reserve_car(new_booking("alice", &car.id, "2030-01-01")).await.unwrap();
		assert_eq!(booking.car_id, car.id);
		assert!(!store.get_car(&car.id).await.unwrap().availability);

		let second = store.reserve_car(new_booking("bob", &car.id, "2030-02-01")).await;
		assert!(matches!(second, Err(StoreError::CarUnavailable)));
		assert!(store.list_bookings("bob").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_bookings_are_filtered_and_ordered() {
		let store = MemoryStore::new();
		let first = store.insert_car(new_car("A")).await.unwrap();
		let second = store.insert_car(new_car("B")).await.unwrap();
		let third = store.insert_car(new_car("C")).await.unwrap();

		store.reserve_car(new_booking("alice", &first.id, "2030-03-01")).await.unwrap();
		store.reserve_car(new_booking("bob", &second.id, "2030-01-01")).await.unwrap();
		store.reserve_car(new_booking("alice", &third.id, "2030-02-01")).await.unwrap();

		let bookings = store.list_bookings("alice").await.unwrap();
		assert_eq!(bookings.len(), 2);
		assert!(bookings.iter().all(|booking| booking.user_id == "alice"));
		assert_eq!(bookings[0].car_id, third.id);
	}
}
