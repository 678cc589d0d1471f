//! Prompt text for the language-model opponent.

use super::OracleRequest;
use noughts_tictactoe::Square;
use std::fmt::Write;

/// System prompt for the opponent.
pub const SYSTEM_PROMPT: &str = "You are an expert Tic-Tac-Toe player. \
    Given the current board, your mark and your opponent's mark, choose the best move. \
    Always think a step ahead. \
    You MUST respond with a single JSON object and nothing else: \
    {\"move\": <index 0-8>, \"explanation\": \"<one short sentence>\"}.";

/// Builds the user message describing the position.
///
/// Cells are listed one per line as `<index>: <X|O|empty>`.
pub fn user_message(request: &OracleRequest) -> String {
    let mut message = String::from("Current board:\n");
    for (index, square) in request.board.squares().iter().enumerate() {
        let cell = match square {
            Square::Empty => "empty".to_string(),
            Square::Occupied(mark) => mark.to_string(),
        };
        // Writing to a String cannot fail.
        let _ = writeln!(message, "{}: {}", index, cell);
    }

    let _ = write!(
        message,
        "\nYour mark: {}\nOpponent's mark: {}\n\n\
         Pick the index (0-8) of an empty cell and briefly explain your reasoning. \
         Take an immediate win if there is one. Otherwise block the opponent's immediate win. \
         Otherwise make the strongest strategic move available. \
         Prioritize winning over blocking, and blocking over everything else.\n\
         Respond using JSON only.",
        request.opponent_mark, request.human_mark
    );
    message
}
