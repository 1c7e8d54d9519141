use crate::app_config::AppConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app_config;
mod bounding_box_deserializer;
mod domain;
mod http;
mod server;
mod store;
mod submitted_timestamp_deserializer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = Arc::new(AppConfig::load()?);
    info!("✅  Loaded configuration");
    if let Some(bounds) = config.bounding_box() {
        info!("✅  Accepting locations within {}", bounds);
    }

    let store = store::open(config.store());
    info!("✅  Initialized {:?} store", config.store().backend());

    server::serve(config, store).await?;

    info!("👋 {} stopped", env!("CARGO_PKG_NAME"));
    Ok(())
}
