use anyhow::Result;
use tracing_subscriber::EnvFilter;

use weathervane::api::AppState;
use weathervane::config::Config;
use weathervane::{store, web};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!("OPENWEATHER_API_KEY not set. /weather will respond with 500 until it is.");
    }

    let store = store::open(config.store_path.as_deref());
    web::run(AppState::new(config, store)).await
}
