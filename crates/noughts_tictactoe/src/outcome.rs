//! Game outcomes and winning lines.

use super::position::Position;
use super::types::Mark;
use serde::{Deserialize, Serialize};

/// Three positions in a row, column or diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line([Position; 3]);

impl Line {
    /// Creates a line from three positions.
    pub const fn new(a: Position, b: Position, c: Position) -> Self {
        Self([a, b, c])
    }

    /// The positions making up the line.
    pub fn positions(&self) -> [Position; 3] {
        self.0
    }

    /// The board indices making up the line.
    pub fn indices(&self) -> [usize; 3] {
        self.0.map(Position::to_index)
    }
}

/// State of a game as derived from its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// There are empty squares and nobody has three in a row.
    InProgress,
    /// `mark` completed `line`.
    Won {
        /// The winning mark.
        mark: Mark,
        /// The completed line.
        line: Line,
    },
    /// Every square is filled and nobody won.
    Draw,
}

impl Outcome {
    /// Returns true while the game can still accept moves.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Outcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Won { mark, .. } => Some(*mark),
            _ => None,
        }
    }

    /// Returns the winning line if there is one.
    pub fn line(&self) -> Option<Line> {
        match self {
            Outcome::Won { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "In progress"),
            Outcome::Won { mark, .. } => write!(f, "Player {} wins", mark),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
