// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

mod handlers;
mod routes;

use crate::config::Config;
use crate::graph::SocialGraph;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub use routes::router;

/// Shared state handed to every handler. Configuration travels here
/// explicitly rather than through a process-wide global.
#[derive(Clone)]
pub struct AppState {
    pub graph: SocialGraph,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(graph: SocialGraph, config: Config) -> Self {
        Self {
            graph,
            config: Arc::new(config),
        }
    }
}

/// Start the API server
pub async fn start_api_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse::<SocketAddr>()
        .context("Invalid server bind address")?;

    let app = router(state);

    info!("Starting API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
