//! Exposure engine HTTP server binary.
//!
//! Loads the engine configuration and a dataset directory, then serves the
//! report API.
//!
//! # Usage
//!
//! ```bash
//! CONFIG_DIR=./config/default DATA_DIR=./data/sample cargo run --bin exposure-server
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG_DIR`: Configuration directory (default: ./config/default)
//! - `DATA_DIR`: Dataset directory (default: ./data/sample)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use exposure_engine::api::{AppState, create_router};
use exposure_engine::config::ConfigLoader;
use exposure_engine::data::DatasetLoader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "./config/default".to_string());
    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./data/sample".to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        engine = %config.metadata().name,
        version = %config.metadata().version,
        "Starting exposure engine server"
    );

    // The server never starts on a partial dataset.
    let tables = DatasetLoader::load(&data_dir).await?;
    let state = AppState::new(config, tables);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
