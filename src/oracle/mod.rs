//! Move oracles: where the opponent's moves come from.
//!
//! An oracle is handed a snapshot of the board and the mark assignment
//! and answers with a claimed square and a short rationale. Nothing an
//! oracle returns is trusted; the coordinator validates every claim.

mod first_open;
mod llm;
mod prompt;

pub use first_open::FirstOpenOracle;
pub use llm::{LlmOracle, parse_reply};
pub use prompt::SYSTEM_PROMPT;

use crate::config::{ConfigError, GameConfig, OracleKind};
use crate::llm_client::{LlmClient, LlmError};
use derive_new::new;
use noughts_tictactoe::{Board, Mark};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// What an oracle is asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    /// Board snapshot; serializes as nine `null | "X" | "O"` slots.
    pub board: Board,
    /// The human's mark.
    #[serde(rename = "playerMark")]
    pub human_mark: Mark,
    /// The mark the oracle plays.
    #[serde(rename = "aiMark")]
    pub opponent_mark: Mark,
}

/// What an oracle claims.
///
/// `index` is kept signed and unchecked so an out-of-range answer reaches
/// the coordinator as an invalid move instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct OracleMove {
    /// Claimed board index, expected in 0-8.
    #[serde(rename = "move")]
    pub index: i64,
    /// Why the oracle chose it.
    #[serde(default)]
    pub explanation: String,
}

/// Why an oracle could not produce a move.
#[derive(Debug, Clone, derive_more::Display, derive_more::From)]
pub enum OracleError {
    /// The language model call failed.
    #[display("{}", _0)]
    #[from]
    Llm(LlmError),
    /// The reply did not contain a usable move object.
    #[display("Could not parse oracle reply: {}", _0)]
    Parse(String),
    /// The oracle did not answer in time.
    #[display("Oracle did not answer within {:?}", _0)]
    Timeout(Duration),
    /// There was nothing left to choose from.
    #[display("No empty squares left")]
    NoEmptySquare,
}

impl std::error::Error for OracleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OracleError::Llm(e) => Some(e),
            _ => None,
        }
    }
}

/// A source of opponent moves.
#[async_trait::async_trait]
pub trait MoveOracle: Send + Sync {
    /// Chooses a move for `request.opponent_mark`.
    async fn choose_move(&self, request: &OracleRequest) -> Result<OracleMove, OracleError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Builds the oracle selected by `config`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the LLM oracle is selected and its API key
/// is not available.
#[instrument(skip(config), fields(oracle = ?config.oracle()))]
pub fn build_oracle(config: &GameConfig) -> Result<Arc<dyn MoveOracle>, ConfigError> {
    match config.oracle() {
        OracleKind::Llm => {
            let llm_config = config.create_llm_config()?;
            info!(
                provider = ?llm_config.provider(),
                model = %llm_config.model(),
                "Using language model oracle"
            );
            Ok(Arc::new(LlmOracle::new(LlmClient::new(llm_config))))
        }
        OracleKind::FirstOpen => {
            info!("Using first-open oracle");
            Ok(Arc::new(FirstOpenOracle))
        }
    }
}
