use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_insta_graph::api::{self, AppState};
use mini_insta_graph::config::{Config, StorageBackend};
use mini_insta_graph::db::init_database;
use mini_insta_graph::store::{MemoryStore, PgStore, SocialStore};
use mini_insta_graph::SocialGraph;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,mini_insta_graph=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Initialized configuration");

    let store: Arc<dyn SocialStore> = match config.storage {
        StorageBackend::Postgres => {
            let db = init_database(&config.database).await?;
            info!("Connected to database");
            Arc::new(PgStore::new(db.into_pool()))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(SocialGraph::new(store), config);

    // Serve until the API stops or a shutdown signal arrives
    tokio::select! {
        result = api::start_api_server(state) => {
            if let Err(e) = result {
                error!("API server error: {}", e);
                return Err(e);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        }
    }

    info!("mini-insta-graph shutdown complete");
    Ok(())
}
