//! Win detection logic for tic-tac-toe.

use super::super::{Board, Line, Mark, Position, Square};
use tracing::instrument;

/// The eight winning lines, checked in this order.
pub const LINES: [Line; 8] = [
    // Rows
    Line::new(Position::TopLeft, Position::TopCenter, Position::TopRight),
    Line::new(Position::MiddleLeft, Position::Center, Position::MiddleRight),
    Line::new(Position::BottomLeft, Position::BottomCenter, Position::BottomRight),
    // Columns
    Line::new(Position::TopLeft, Position::MiddleLeft, Position::BottomLeft),
    Line::new(Position::TopCenter, Position::Center, Position::BottomCenter),
    Line::new(Position::TopRight, Position::MiddleRight, Position::BottomRight),
    // Diagonals
    Line::new(Position::TopLeft, Position::Center, Position::BottomRight),
    Line::new(Position::TopRight, Position::Center, Position::BottomLeft),
];

/// Checks if there is a winner on the board.
///
/// Returns the mark and the first completed line, `None` otherwise.
#[instrument(level = "trace", skip(board))]
pub fn check_winner(board: &Board) -> Option<(Mark, Line)> {
    LINES.iter().find_map(|line| {
        let [a, b, c] = line.positions();
        let first = board.get(a);
        match first {
            Square::Occupied(mark) if board.get(b) == first && board.get(c) == first => {
                Some((mark, *line))
            }
            _ => None,
        }
    })
}
