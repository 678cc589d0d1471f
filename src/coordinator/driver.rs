//! Async driver for opponent turns.

use super::{Coordinator, MoveError, OpponentResolution, Phase};
use crate::oracle::{MoveOracle, OracleError};
use derive_getters::Getters;
use derive_new::new;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// A game shared between a front end and its opponent task.
pub type SharedGame = Arc<Mutex<Coordinator>>;

/// Timing of an opponent turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct TurnTiming {
    /// Pause before the oracle is asked.
    delay: Duration,
    /// Upper bound on the oracle call, if any.
    timeout: Option<Duration>,
}

impl TurnTiming {
    /// No delay and no timeout.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, None)
    }
}

/// Plays one opponent turn on `game`.
///
/// Waits `timing.delay`, asks `oracle`, and resolves the answer. The lock
/// is held only for the two synchronous transitions, so front ends can
/// render (and have human input rejected) while the oracle is thinking.
///
/// Returns `Ok(None)` when there is nothing to do: the game is not
/// waiting on the opponent, or it was restarted while the turn was in
/// flight and the answer was discarded.
///
/// # Errors
///
/// Propagates coordinator rejections other than the ones above.
#[instrument(skip_all, fields(oracle = oracle.name()))]
pub async fn play_opponent_turn(
    game: &SharedGame,
    oracle: &dyn MoveOracle,
    timing: TurnTiming,
) -> Result<Option<OpponentResolution>, MoveError> {
    let generation = *game.lock().await.generation();

    if !timing.delay.is_zero() {
        tokio::time::sleep(timing.delay).await;
    }

    let turn = {
        let mut coordinator = game.lock().await;
        let current = *coordinator.generation() == generation;
        if !current || *coordinator.phase() != Phase::OpponentPending {
            debug!(phase = ?coordinator.phase(), "No opponent turn to play");
            return Ok(None);
        }
        coordinator.begin_opponent_turn()?
    };

    let answer = match timing.timeout {
        Some(limit) => tokio::time::timeout(limit, oracle.choose_move(turn.request()))
            .await
            .unwrap_or(Err(OracleError::Timeout(limit))),
        None => oracle.choose_move(turn.request()).await,
    };

    let mut coordinator = game.lock().await;
    match coordinator.resolve_opponent_turn(&turn, answer) {
        Ok(resolution) => {
            info!(
                position = %resolution.position(),
                fallback = resolution.source().is_fallback(),
                outcome = %resolution.outcome(),
                "Opponent moved"
            );
            Ok(Some(resolution))
        }
        Err(MoveError::StaleTurn(stale)) => {
            info!(stale, "Game restarted while the opponent was thinking; answer discarded");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
