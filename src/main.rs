use car_rental::{config::Config, start_server};
use env_logger::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

	let config = Config::from_env()?;
	start_server(config).await
}
