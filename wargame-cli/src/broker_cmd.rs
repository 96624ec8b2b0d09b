//! Broker command - run the move relay server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_broker(), start_broker()
//! - Level 3: (delegated to wargame-broker crate)

use anyhow::{ensure, Result};
use clap::Args;

use wargame_broker::{run_broker, BrokerConfig, DEFAULT_PORT};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BrokerArgs {
    /// Port number to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run broker command
pub fn run(args: BrokerArgs) -> Result<()> {
    let config = configure_broker(&args)?;

    tracing::info!("Starting move broker on port {}", config.port);

    start_broker(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn configure_broker(args: &BrokerArgs) -> Result<BrokerConfig> {
    ensure!(args.port != 0, "broker port must be non-zero");
    Ok(BrokerConfig { port: args.port })
}

/// Start the broker (blocking)
fn start_broker(config: BrokerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_broker(config).await })
}

// ============================================================================
// TESTS
// ============================================================================
