//! Move relay endpoints

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::state::BrokerState;
use crate::wire::{Envelope, WireMove};

/// Latest submitted move, or null before the first one
pub async fn get_move(State(state): State<Arc<BrokerState>>) -> Json<Envelope<WireMove>> {
    Json(Envelope::ok(state.latest().await))
}

/// Store a move and echo it back
pub async fn post_move(
    State(state): State<Arc<BrokerState>>,
    Json(mv): Json<WireMove>,
) -> Json<Envelope<WireMove>> {
    if state.submit(mv).await {
        tracing::info!(turn = mv.turn, from = %mv.from, to = %mv.to, "move relayed");
        Json(Envelope::ok(Some(mv)))
    } else {
        tracing::warn!(turn = mv.turn, "stale move rejected");
        Json(Envelope::rejected())
    }
}
