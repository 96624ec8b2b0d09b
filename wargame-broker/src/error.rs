//! Broker communication errors

use thiserror::Error;

use crate::wire::WireMove;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("broker rejected the move for turn {0}")]
    Rejected(u32),

    #[error("broker echoed {echoed:?} instead of {sent:?}")]
    Mismatch {
        sent: WireMove,
        echoed: Option<WireMove>,
    },
}
