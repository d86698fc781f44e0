//! tob-feed binary
//!
//! Entry point for the top-of-book aggregator. Loads configuration,
//! initializes tracing, and runs the [`tob_feed::supervisor::Supervisor`].

use std::path::PathBuf;

use clap::Parser;

use tob_core::config::AppConfig;
use tob_feed::supervisor::Supervisor;

/// Multi-exchange top-of-book aggregator
#[derive(Parser, Debug)]
#[command(name = "tob-feed", about = "Multi-exchange top-of-book aggregator")]
struct Args {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config)?;

    tob_core::logging::init_tracing(config.logging.json);

    tracing::info!(
        fanout_port = config.fanout.port,
        reconnect_delay_ms = config.reconnect.delay_ms,
        max_attempts = config.reconnect.max_attempts,
        "starting tob-feed"
    );

    Supervisor::new(config).run().await
}
