//! Status endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::BrokerState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub latest_turn: Option<u32>,
    pub accepted: u64,
}

pub async fn status_handler(State(state): State<Arc<BrokerState>>) -> Json<StatusResponse> {
    let relay = state.relay.read().await;
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        latest_turn: relay.latest.map(|mv| mv.turn),
        accepted: relay.accepted,
    })
}
