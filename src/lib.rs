//! Noughts - tic-tac-toe against a language-model opponent.
//!
//! The human always moves first. After each human move the
//! [`Coordinator`] hands the board to a [`MoveOracle`], which usually
//! asks an LLM for a move. The oracle's answer is untrusted: an
//! unavailable square, a parse failure or a transport error all fall
//! back to the first empty square and raise a [`Notice`].
//!
//! # Architecture
//!
//! - **Coordinator**: turn state machine around a single board
//! - **Oracle**: LLM-backed move source plus an offline fallback
//! - **Server**: browser front end and JSON API (axum)
//! - **TUI**: terminal front end (ratatui)
//!
//! # Example
//!
//! ```no_run
//! use noughts::{FirstOpenOracle, GameConfig, SessionManager, play_opponent_turn};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GameConfig::default();
//! let sessions = SessionManager::new(*config.human_mark());
//! let game = sessions.get_or_create("local");
//!
//! game.lock().await.human_move(4)?;
//! play_opponent_turn(&game, &FirstOpenOracle, config.timing()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod coordinator;
mod llm_client;
mod oracle;
mod server;
mod session;
pub mod tui;
mod view;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig, OracleKind};

// Crate-level exports - Turn coordination
pub use coordinator::{
    Coordinator, MoveError, MoveSource, Notice, OpponentResolution, OpponentTurn, Phase,
    SharedGame, Turn, TurnTiming, play_opponent_turn,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Move oracles
pub use oracle::{
    FirstOpenOracle, LlmOracle, MoveOracle, OracleError, OracleMove, OracleRequest,
    SYSTEM_PROMPT, build_oracle, parse_reply,
};

// Crate-level exports - Server
pub use server::{AppState, MoveRequest, router, serve};

// Crate-level exports - Session management
pub use session::SessionManager;

// Crate-level exports - Views
pub use view::{GameView, status_message};

// Crate-level exports - Game types
pub use noughts_tictactoe::{Board, Line, Mark, Outcome, Position, Square, evaluate};
