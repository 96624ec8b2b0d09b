//! AI Wargame CLI - Command-line interface
//!
//! Commands:
//! - play: Play a game (human, computer or broker on either side)
//! - broker: Start the move relay broker

mod broker_cmd;
mod input;
mod play_cmd;
mod trace;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wargame")]
#[command(about = "AI wargame with a minimax/alpha-beta computer player", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play(play_cmd::PlayArgs),
    /// Start the move relay broker
    Broker(broker_cmd::BrokerArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, the board and reports to stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args),
        Commands::Broker(args) => broker_cmd::run(args),
    }
}
