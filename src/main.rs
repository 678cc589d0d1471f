//! Noughts - unified CLI
//!
//! Serves the browser game or runs it in the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use noughts::{AppState, FirstOpenOracle, GameConfig, MoveOracle, build_oracle};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,noughts=debug";
const TUI_LOG_FILE: &str = "noughts_tui.log";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let Cli { config: config_path, command } = Cli::parse();

    match command {
        Command::Serve { port, host } => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .init();
            let config = load_config(&config_path)?;
            run_server(config, host, port).await
        }
        Command::Play => {
            // The terminal belongs to the board, so logs go to a file.
            let log_file = std::fs::File::create(TUI_LOG_FILE)
                .with_context(|| format!("Failed to create {TUI_LOG_FILE}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Arc::new(log_file))
                .with_ansi(false)
                .init();
            let config = load_config(&config_path)?;
            let oracle = oracle_or_fallback(&config);
            noughts::tui::run_tui(config, oracle).await
        }
    }
}

fn load_config(path: &Path) -> Result<GameConfig> {
    GameConfig::load_or_default(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Builds the configured oracle, or the first-open oracle if it cannot be built.
fn oracle_or_fallback(config: &GameConfig) -> Arc<dyn MoveOracle> {
    match build_oracle(config) {
        Ok(oracle) => oracle,
        Err(e) => {
            warn!(error = %e, "Configured oracle unavailable, falling back to first-open");
            Arc::new(FirstOpenOracle)
        }
    }
}

/// Runs the HTTP game server.
async fn run_server(config: GameConfig, host: String, port: u16) -> Result<()> {
    info!(?config, "Starting noughts server");

    let oracle = oracle_or_fallback(&config);
    let sessions = config.session_manager();
    let state = AppState::new(sessions, oracle, config.timing());

    noughts::serve(&host, port, state).await
}
