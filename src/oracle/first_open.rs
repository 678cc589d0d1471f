//! Offline oracle that takes the first empty square.

use super::{MoveOracle, OracleError, OracleMove, OracleRequest};
use tracing::debug;

/// Picks the first empty square in board order.
///
/// Used when no language model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOpenOracle;

#[async_trait::async_trait]
impl MoveOracle for FirstOpenOracle {
    async fn choose_move(&self, request: &OracleRequest) -> Result<OracleMove, OracleError> {
        let pos = request.board.first_empty().ok_or(OracleError::NoEmptySquare)?;
        debug!(position = %pos, "First open square");
        Ok(OracleMove::new(
            pos.to_index() as i64,
            format!("{} was the first open square.", pos),
        ))
    }

    fn name(&self) -> &str {
        "first_open"
    }
}
