//! Broker state
//!
//! Holds the most recent move submitted by either player.

use tokio::sync::RwLock;

use crate::wire::WireMove;

/// Latest-move slot plus a running count of accepted submissions
#[derive(Debug, Default)]
pub struct Relay {
    pub latest: Option<WireMove>,
    pub accepted: u64,
}

/// Broker-wide shared state
#[derive(Debug, Default)]
pub struct BrokerState {
    pub relay: RwLock<Relay>,
}

impl BrokerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a submission unless it is older than the stored move.
    /// Resubmitting the current turn replaces it.
    pub async fn submit(&self, mv: WireMove) -> bool {
        let mut relay = self.relay.write().await;
        if relay.latest.is_some_and(|prev| mv.turn < prev.turn) {
            return false;
        }
        relay.latest = Some(mv);
        relay.accepted += 1;
        true
    }

    pub async fn latest(&self) -> Option<WireMove> {
        self.relay.read().await.latest
    }
}
