use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, bail, Context};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
	Postgres,
	Memory,
}

impl FromStr for StoreKind {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"postgres" | "pg" => Ok(StoreKind::Postgres),
			"memory" | "mem" => Ok(StoreKind::Memory),
			other => bail!("unknown store backend {other:?}, expected postgres or memory"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
	pub host: String,
	pub port: u16,
	pub user: String,
	pub password: String,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub port: u16,
	pub store: StoreKind,
	pub db: DbConfig,
	pub allowed_origins: Vec<String>,
}

impl Config {
	pub fn from_env() -> anyhow::Result<Self> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds the config from any key lookup; `from_env` passes the process environment.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
		let allowed_origins: Vec<String> = try_load::<String>(&lookup, "ALLOWED_ORIGINS", "http://localhost:3000")?
			.split(',')
			.map(str::trim)
			.filter(|origin| !origin.is_empty())
			.map(str::to_owned)
			.collect();

		Ok(Self {
			port: try_load(&lookup, "PORT", "5000")?,
			store: try_load(&lookup, "STORE", "postgres")?,
			db: DbConfig {
				host: try_load(&lookup, "DB_HOST", "localhost")?,
				port: try_load(&lookup, "DB_PORT", "5432")?,
				user: try_load(&lookup, "DB_USER", "postgres")?,
				password: try_load(&lookup, "DB_PASSWORD", "postgres")?,
				name: try_load(&lookup, "DB_NAME", "car_rental")?,
			},
			allowed_origins,
		})
	}
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
	T::Err: Display,
{
	let value = lookup(key).unwrap_or_else(|| {
		if !key.contains("PASSWORD") {
			info!("{key} not set, using default: {default}");
		}
		default.to_owned()
	});

	value.parse().map_err(|e| anyhow!("{e}")).with_context(|| format!("invalid {key} value"))
}
