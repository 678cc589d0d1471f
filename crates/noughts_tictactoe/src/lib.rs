//! Pure tic-tac-toe game logic.
//!
//! This crate holds the board, the nine named positions and the rules
//! that derive an [`Outcome`] from a board. It does no I/O and knows
//! nothing about who is playing; turn coordination lives in the
//! `noughts` crate.
//!
//! # Example
//!
//! ```
//! use noughts_tictactoe::{Board, Mark, Outcome, evaluate};
//!
//! let board = Board::from_marks([
//!     Some(Mark::X), Some(Mark::X), Some(Mark::X),
//!     None,          Some(Mark::O), Some(Mark::O),
//!     None,          None,          None,
//! ]);
//!
//! match evaluate(&board) {
//!     Outcome::Won { mark, line } => {
//!         assert_eq!(mark, Mark::X);
//!         assert_eq!(line.indices(), [0, 1, 2]);
//!     }
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod outcome;
mod position;
pub mod rules;
mod types;

pub use outcome::{Line, Outcome};
pub use position::Position;
pub use rules::{check_winner, evaluate, is_full};
pub use types::{Board, Mark, PlaceError, Square};
