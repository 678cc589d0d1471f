//! Front-end view of a game.

use crate::coordinator::{Coordinator, Notice, Phase, Turn};
use noughts_tictactoe::{Board, Mark, Outcome};
use serde::{Deserialize, Serialize};

/// Everything a front end needs to draw a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Nine `null | "X" | "O"` slots.
    pub board: Board,
    /// The human's mark.
    pub human_mark: Mark,
    /// The opponent's mark.
    pub opponent_mark: Mark,
    /// Coordinator phase.
    pub phase: Phase,
    /// Who places the next mark.
    pub turn: Turn,
    /// The winning mark, if any.
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub draw: bool,
    /// Indices of the completed line, if any.
    pub winning_line: Option<[usize; 3]>,
    /// The opponent's last explanation.
    pub explanation: Option<String>,
    /// Transient notice, if one is pending.
    pub notice: Option<Notice>,
    /// One-line status for the header.
    pub status: String,
}

impl From<&Coordinator> for GameView {
    fn from(game: &Coordinator) -> Self {
        let outcome = game.outcome();
        Self {
            board: *game.board(),
            human_mark: *game.human_mark(),
            opponent_mark: game.opponent_mark(),
            phase: *game.phase(),
            turn: *game.turn(),
            winner: outcome.winner(),
            draw: outcome.is_draw(),
            winning_line: outcome.line().map(|line| line.indices()),
            explanation: game.explanation().clone(),
            notice: game.notice().clone(),
            status: status_message(game).to_string(),
        }
    }
}

/// Header text for the current state of `game`.
pub fn status_message(game: &Coordinator) -> &'static str {
    match game.outcome() {
        Outcome::Draw => "It's a Draw!",
        Outcome::Won { mark, .. } if mark == *game.human_mark() => "Congratulations, You Win!",
        Outcome::Won { .. } => "The AI Wins!",
        Outcome::InProgress if game.opponent_thinking() => "AI is thinking...",
        Outcome::InProgress => "Your Turn",
    }
}
