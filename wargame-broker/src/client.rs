//! Blocking broker client used by the game loop

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use wargame_core::Move;

use crate::error::BrokerError;
use crate::wire::{Envelope, WireMove};

/// Delay between polls that found no new move
const POLL_DELAY: Duration = Duration::from_millis(100);
/// First delay after a communication failure
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
/// Longest delay between retries
const MAX_BACKOFF: Duration = Duration::from_secs(10);
/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Doubling delay, capped
#[derive(Clone, Debug)]
struct Backoff {
    current: Duration,
    initial: Duration,
    max: Duration,
}

impl Backoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial,
            initial,
            max,
        }
    }

    /// Delay to wait now; doubles the next one
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Client for a move relay broker
#[derive(Clone, Debug)]
pub struct BrokerClient {
    endpoint: String,
    http: Client,
    poll_delay: Duration,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl BrokerClient {
    /// `base_url` is the broker root, e.g. `http://localhost:8001`
    pub fn new(base_url: &str) -> Result<Self, BrokerError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            endpoint: format!("{}/api/move", base_url.trim_end_matches('/')),
            http,
            poll_delay: POLL_DELAY,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        })
    }

    pub fn with_delays(mut self, poll_delay: Duration, initial_backoff: Duration, max_backoff: Duration) -> Self {
        self.poll_delay = poll_delay;
        self.initial_backoff = initial_backoff;
        self.max_backoff = max_backoff;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit a move; confirmed only when the broker echoes exactly what was sent
    pub fn post_move(&self, mv: Move, turn: u32) -> Result<(), BrokerError> {
        let sent = WireMove::new(mv, turn);
        let reply: Envelope<WireMove> = self
            .http
            .post(&self.endpoint)
            .json(&sent)
            .send()?
            .error_for_status()?
            .json()?;

        if !reply.success {
            return Err(BrokerError::Rejected(turn));
        }
        if reply.data != Some(sent) {
            return Err(BrokerError::Mismatch {
                sent,
                echoed: reply.data,
            });
        }
        tracing::info!(%mv, turn, "move sent to broker");
        Ok(())
    }

    /// Fetch the latest move if it is the one for `expected_turn`
    pub fn poll_move(&self, expected_turn: u32) -> Result<Option<Move>, BrokerError> {
        let reply: Envelope<WireMove> = self
            .http
            .get(&self.endpoint)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(match reply.data {
            Some(wire) if reply.success && wire.turn == expected_turn => Some(wire.to_move()),
            _ => None,
        })
    }

    /// Block until the move for `expected_turn` arrives
    pub fn wait_for_move(&self, expected_turn: u32) -> Move {
        let mut backoff = Backoff::new(self.initial_backoff, self.max_backoff);
        loop {
            match self.attempt(expected_turn, &mut backoff) {
                Ok(mv) => return mv,
                Err(delay) => thread::sleep(delay),
            }
        }
    }

    /// Like `wait_for_move`, giving up after `max_attempts` polls
    pub fn try_wait_for_move(&self, expected_turn: u32, max_attempts: u32) -> Option<Move> {
        let mut backoff = Backoff::new(self.initial_backoff, self.max_backoff);
        for attempt in 1..=max_attempts {
            match self.attempt(expected_turn, &mut backoff) {
                Ok(mv) => return Some(mv),
                Err(delay) if attempt < max_attempts => thread::sleep(delay),
                Err(_) => {}
            }
        }
        None
    }

    /// One poll. On a miss or failure, returns how long to wait before the next.
    fn attempt(&self, expected_turn: u32, backoff: &mut Backoff) -> Result<Move, Duration> {
        match self.poll_move(expected_turn) {
            Ok(Some(mv)) => {
                tracing::info!(%mv, turn = expected_turn, "move received from broker");
                Ok(mv)
            }
            Ok(None) => {
                backoff.reset();
                Err(self.poll_delay)
            }
            Err(e) => {
                let delay = backoff.next_delay();
                tracing::warn!(error = %e, retry_in = ?delay, "broker poll failed");
                Err(delay)
            }
        }
    }
}
