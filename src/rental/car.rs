use postgres_from_row::FromRow;

#[derive(serde::Deserialize, serde::Serialize, FromRow, Debug, Clone, PartialEq)]
pub struct Car {
	pub id: String,
	pub name: String,
	pub model: String,
	pub price: f64,
	#[serde(default)]
	pub description: String,
	pub availability: bool,
}

/// Body of `POST /api/cars`.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct NewCar {
	pub name: String,
	pub model: String,
	pub price: f64,
	#[serde(default)]
	pub description: String,
}

impl NewCar {
	pub fn validate(&self) -> Result<(), String> {
		if self.name.trim().is_empty() {
			return Err("Car name is required".to_owned());
		}
		if self.model.trim().is_empty() {
			return Err("Car model is required".to_owned());
		}
		if !self.price.is_finite() || self.price < 0.0 {
			return Err(format!("Invalid price: {}", self.price));
		}
		Ok(())
	}

	/// New cars always start out available.
	pub fn into_car(self, id: String) -> Car {
		Car {
			id,
			name: self.name,
			model: self.model,
			price: self.price,
			description: self.description,
			availability: true,
		}
	}
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy)]
pub struct AvailabilityUpdate {
	pub availability: bool,
}
