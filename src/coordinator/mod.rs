//! Turn coordination between the human and the oracle.
//!
//! The [`Coordinator`] owns the board and walks a small state machine:
//!
//! ```text
//! HumanTurn --human_move--> OpponentPending --begin_opponent_turn--> OpponentResolving
//!     ^                                                                   |
//!     +------------------------resolve_opponent_turn---------------------+
//!
//! any placement that ends the game --> Terminal --restart--> HumanTurn
//! ```
//!
//! All transitions are synchronous. The only suspension point, the
//! oracle call, happens between `begin_opponent_turn` and
//! `resolve_opponent_turn` without the game lock held; see
//! [`play_opponent_turn`].

mod driver;

pub use driver::{SharedGame, TurnTiming, play_opponent_turn};

use crate::oracle::{OracleError, OracleMove, OracleRequest};
use derive_getters::Getters;
use derive_new::new;
use noughts_tictactoe::{Board, Mark, Outcome, PlaceError, Position, evaluate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Explanation shown when the oracle claimed an unavailable square.
pub const INVALID_MOVE_EXPLANATION: &str =
    "The AI made an invalid move, so I picked a valid one instead.";

/// Explanation shown when the oracle call failed.
pub const ORACLE_ERROR_EXPLANATION: &str =
    "The AI encountered an error, so I picked a valid move instead.";

/// Where the coordinator is in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Waiting for the human to place a mark.
    HumanTurn,
    /// The human has moved; the opponent has not been asked yet.
    OpponentPending,
    /// The oracle has been asked and not yet answered.
    OpponentResolving,
    /// The game is over until restarted.
    Terminal,
}

/// Who places the next mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Turn {
    /// The person at the keyboard.
    Human,
    /// The oracle.
    Opponent,
}

impl Turn {
    /// Returns the other party.
    pub fn other(self) -> Self {
        match self {
            Turn::Human => Turn::Opponent,
            Turn::Opponent => Turn::Human,
        }
    }
}

/// A transient, non-fatal message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Notice {
    /// Short heading.
    #[new(into)]
    pub title: String,
    /// Body text.
    #[new(into)]
    pub message: String,
}

/// Error returned when an operation is not allowed in the current state.
///
/// A rejected operation never changes the game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The index is not on the board.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(usize),

    /// The square at the position is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(Position),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The opponent is choosing a move.
    #[display("The opponent is thinking")]
    OpponentThinking,

    /// The operation does not fit the current phase.
    #[display("Not allowed while {:?}", _0)]
    UnexpectedPhase(Phase),

    /// The game was restarted after the opponent turn began.
    #[display("Opponent turn {} belongs to a previous game", _0)]
    StaleTurn(u64),
}

impl std::error::Error for MoveError {}

impl From<PlaceError> for MoveError {
    fn from(err: PlaceError) -> Self {
        match err {
            PlaceError::SquareOccupied(pos) => MoveError::SquareOccupied(pos),
        }
    }
}

/// A started opponent turn: the request to send and the game it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct OpponentTurn {
    generation: u64,
    request: OracleRequest,
}

/// How the opponent's square was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveSource {
    /// The oracle's claim was valid.
    Oracle,
    /// The oracle claimed an unavailable square.
    InvalidClaim(i64),
    /// The oracle call failed.
    OracleFailed(String),
}

impl MoveSource {
    /// Whether the fallback square was used.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, MoveSource::Oracle)
    }
}

/// Result of resolving an opponent turn.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct OpponentResolution {
    position: Position,
    source: MoveSource,
    outcome: Outcome,
}

/// Turn state machine around a single board.
#[derive(Debug, Clone, Getters)]
pub struct Coordinator {
    board: Board,
    human_mark: Mark,
    turn: Turn,
    phase: Phase,
    explanation: Option<String>,
    notice: Option<Notice>,
    generation: u64,
}

impl Coordinator {
    /// Creates a game with an empty board and the human to move.
    #[instrument]
    pub fn new(human_mark: Mark) -> Self {
        Self {
            board: Board::new(),
            human_mark,
            turn: Turn::Human,
            phase: Phase::HumanTurn,
            explanation: None,
            notice: None,
            generation: 0,
        }
    }

    /// The mark the oracle plays.
    pub fn opponent_mark(&self) -> Mark {
        self.human_mark.opponent()
    }

    /// The outcome, derived from the current board.
    pub fn outcome(&self) -> Outcome {
        evaluate(&self.board)
    }

    /// Whether the opponent has been asked, or is about to be.
    pub fn opponent_thinking(&self) -> bool {
        matches!(self.phase, Phase::OpponentPending | Phase::OpponentResolving)
    }

    /// Places the human's mark at `index` (0-8).
    ///
    /// # Errors
    ///
    /// Rejects the move without changing anything when it is not the
    /// human's turn, the game is over, the index is off the board, or the
    /// square is taken.
    #[instrument(skip(self), fields(generation = self.generation, phase = ?self.phase))]
    pub fn human_move(&mut self, index: usize) -> Result<Outcome, MoveError> {
        match self.phase {
            Phase::HumanTurn => {}
            Phase::Terminal => return Err(MoveError::GameOver),
            Phase::OpponentPending | Phase::OpponentResolving => {
                return Err(MoveError::OpponentThinking);
            }
        }

        let pos = Position::from_index(index).ok_or(MoveError::OutOfBounds(index))?;
        self.board.place(pos, self.human_mark)?;
        self.notice = None;
        debug!(position = %pos, mark = %self.human_mark, "Human placed mark");

        Ok(self.after_placement())
    }

    /// Moves from `OpponentPending` to `OpponentResolving` and returns
    /// what to ask the oracle.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::UnexpectedPhase`] outside `OpponentPending`,
    /// which also rules out a second outstanding oracle call.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn begin_opponent_turn(&mut self) -> Result<OpponentTurn, MoveError> {
        if self.phase != Phase::OpponentPending {
            return Err(MoveError::UnexpectedPhase(self.phase));
        }

        self.phase = Phase::OpponentResolving;
        self.explanation = None;
        debug!("Opponent turn started");

        Ok(OpponentTurn {
            generation: self.generation,
            request: OracleRequest::new(self.board, self.human_mark, self.opponent_mark()),
        })
    }

    /// Applies the oracle's answer for `turn`.
    ///
    /// A valid claim is placed as-is. An out-of-range or occupied claim,
    /// or a failed call, places the opponent's mark on the first empty
    /// square, annotates the explanation and raises a [`Notice`].
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::StaleTurn`] if the game was restarted since
    /// `turn` began and [`MoveError::UnexpectedPhase`] outside
    /// `OpponentResolving`. Neither changes the game.
    #[instrument(skip(self, turn, answer), fields(generation = turn.generation))]
    pub fn resolve_opponent_turn(
        &mut self,
        turn: &OpponentTurn,
        answer: Result<OracleMove, OracleError>,
    ) -> Result<OpponentResolution, MoveError> {
        if turn.generation != self.generation {
            return Err(MoveError::StaleTurn(turn.generation));
        }
        if self.phase != Phase::OpponentResolving {
            return Err(MoveError::UnexpectedPhase(self.phase));
        }
        let fallback = self.fallback_position()?;

        let (position, source) = match answer {
            Ok(claim) => match self.validate_claim(claim.index) {
                Some(pos) => {
                    info!(position = %pos, "Oracle move accepted");
                    self.explanation = Some(claim.explanation);
                    (pos, MoveSource::Oracle)
                }
                None => {
                    warn!(claimed = claim.index, "Oracle claimed an unavailable square");
                    self.explanation = Some(INVALID_MOVE_EXPLANATION.to_string());
                    self.notice = Some(Notice::new(
                        "Invalid AI move",
                        format!(
                            "The AI chose square {}, which is not available. \
                             A valid move was played instead.",
                            claim.index
                        ),
                    ));
                    (fallback, MoveSource::InvalidClaim(claim.index))
                }
            },
            Err(err) => {
                warn!(error = %err, "Oracle failed");
                self.explanation = Some(ORACLE_ERROR_EXPLANATION.to_string());
                self.notice = Some(Notice::new(
                    "AI Error",
                    "The AI failed to make a move. You can try again or restart.",
                ));
                (fallback, MoveSource::OracleFailed(err.to_string()))
            }
        };

        self.board.place(position, self.opponent_mark())?;
        let outcome = self.after_placement();

        Ok(OpponentResolution {
            position,
            source,
            outcome,
        })
    }

    /// Resets to the canonical empty game with the human to move.
    ///
    /// Any opponent turn in flight becomes stale.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn restart(&mut self) {
        self.board = Board::new();
        self.turn = Turn::Human;
        self.phase = Phase::HumanTurn;
        self.explanation = None;
        self.notice = None;
        self.generation += 1;
        info!(generation = self.generation, "Game restarted");
    }

    fn validate_claim(&self, index: i64) -> Option<Position> {
        usize::try_from(index)
            .ok()
            .and_then(Position::from_index)
            .filter(|pos| self.board.is_empty(*pos))
    }

    fn fallback_position(&self) -> Result<Position, MoveError> {
        // Resolving implies an in-progress board, so a square is always free.
        self.board.first_empty().ok_or(MoveError::GameOver)
    }

    /// Flips the turn and settles the phase from the re-derived outcome.
    fn after_placement(&mut self) -> Outcome {
        self.turn = self.turn.other();
        let outcome = self.outcome();

        self.phase = if !outcome.is_in_progress() {
            info!(%outcome, "Game over");
            Phase::Terminal
        } else {
            match self.turn {
                Turn::Human => Phase::HumanTurn,
                Turn::Opponent => Phase::OpponentPending,
            }
        };
        outcome
    }
}
