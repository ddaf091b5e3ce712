//! Session Replay
//!
//! Replays a recorded sequence of transport callbacks against a session
//! actor and prints the resulting tiles, roster and meeting history as
//! JSON. Every observer notification is logged through `tracing`.
//!
//! Configuration comes from the `SESSION_*` environment variables,
//! overridden by the script's `env` map.

#![warn(clippy::pedantic)]

use std::path::PathBuf;

use clap::Parser;
use session_client::errors::ClientError;
use session_client::replay::{run_script, ReplayScript, DEFAULT_LOG_FILTER};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replay recorded session callbacks
#[derive(Parser)]
#[command(name = "session-replay")]
#[command(about = "Replay recorded transport callbacks against the session engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the JSON replay script
    script: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the final state as compact JSON instead of pretty JSON
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    info!(script = %cli.script.display(), "Starting session replay");

    let contents = std::fs::read_to_string(&cli.script).map_err(|e| {
        ClientError::Replay(format!("cannot read {}: {e}", cli.script.display()))
    })?;
    let script = ReplayScript::from_json(&contents)?;

    let summary = match run_script(script, std::env::vars().collect()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Replay failed");
            return Err(e.into());
        }
    };

    let output = if cli.compact {
        serde_json::to_string(&summary)?
    } else {
        serde_json::to_string_pretty(&summary)?
    };
    println!("{output}");

    Ok(())
}
