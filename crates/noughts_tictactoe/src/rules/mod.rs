//! Game rules for tic-tac-toe.
//!
//! Pure functions that derive the state of a game from a board. The
//! outcome is never stored alongside the board; callers re-derive it
//! with [`evaluate`] after every placement.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, check_winner};

use super::{Board, Outcome};
use tracing::instrument;

/// Derives the outcome of a board.
///
/// The first completed line in [`LINES`] order wins; otherwise a full
/// board is a draw and anything else is still in progress.
#[instrument(level = "trace", skip(board))]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some((mark, line)) = check_winner(board) {
        return Outcome::Won { mark, line };
    }
    if is_full(board) {
        return Outcome::Draw;
    }
    Outcome::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mark, Square};

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = Board::from_marks([X, O, X, X, O, O, O, X, X]);
        assert_eq!(evaluate(&board), Outcome::Draw);
    }

    #[test]
    fn test_top_row_reports_line() {
        let board = Board::from_marks([X, X, X, E, O, O, E, E, E]);
        let outcome = evaluate(&board);
        assert_eq!(outcome.winner(), Some(Mark::X));
        assert_eq!(outcome.line().map(|l| l.indices()), Some([0, 1, 2]));
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        let board = Board::from_marks([X, O, X, O, X, O, O, X, X]);
        assert_eq!(evaluate(&board).winner(), Some(Mark::X));
    }

    #[test]
    fn test_empty_board_in_progress() {
        assert_eq!(evaluate(&Board::new()), Outcome::InProgress);
    }

    /// Walks all 3^9 fillings of the board and checks the outcome
    /// against an independent count of completed lines.
    #[test]
    fn test_every_board_has_exactly_one_consistent_outcome() {
        for code in 0..3usize.pow(9) {
            let mut marks = [None; 9];
            let mut rest = code;
            for cell in marks.iter_mut() {
                *cell = match rest % 3 {
                    0 => None,
                    1 => Some(Mark::X),
                    _ => Some(Mark::O),
                };
                rest /= 3;
            }
            let board = Board::from_marks(marks);
            let any_line = LINES.iter().any(|line| {
                let [a, b, c] = line.positions();
                let sq = board.get(a);
                sq != Square::Empty && sq == board.get(b) && sq == board.get(c)
            });
            let full = marks.iter().all(Option::is_some);

            match evaluate(&board) {
                Outcome::Won { mark, line } => {
                    assert!(any_line);
                    for pos in line.positions() {
                        assert_eq!(board.get(pos), Square::Occupied(mark));
                    }
                }
                Outcome::Draw => assert!(full && !any_line),
                Outcome::InProgress => assert!(!full && !any_line),
            }
        }
    }
}
