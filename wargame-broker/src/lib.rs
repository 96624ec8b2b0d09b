//! AI Wargame Broker - HTTP relay for moves between two game instances
//!
//! This crate provides:
//! - The relay server (latest-move slot behind `GET`/`POST /api/move`)
//! - A blocking client used by the game loop to submit and await moves

mod client;
mod error;
mod routes;
mod state;
mod wire;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use client::BrokerClient;
pub use error::BrokerError;
pub use state::{BrokerState, Relay};
pub use wire::{Envelope, WireMove};

/// Port the broker listens on by default
pub const DEFAULT_PORT: u16 = 8001;

/// Broker configuration
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    pub port: u16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<BrokerState>) -> Router {
    Router::new()
        .route("/api/status", get(routes::status::status_handler))
        .route(
            "/api/move",
            get(routes::moves::get_move).post(routes::moves::post_move),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<BrokerState>) -> anyhow::Result<()> {
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

/// Start the broker
pub async fn run_broker(config: BrokerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Wargame broker listening on http://0.0.0.0:{}", config.port);

    serve(listener, Arc::new(BrokerState::new())).await
}
