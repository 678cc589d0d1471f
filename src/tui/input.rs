//! Keyboard handling.

use crossterm::event::KeyCode;
use noughts_tictactoe::Position;

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the cursor with an arrow key.
    Cursor(KeyCode),
    /// Place the human's mark on the cursor square.
    PlaceAtCursor,
    /// Place the human's mark on a numbered square.
    Place(Position),
    /// Start a new game.
    Restart,
    /// Leave the TUI.
    Quit,
    /// Key has no binding.
    Ignore,
}

/// Maps a key to an action.
pub fn action_for(key: KeyCode) -> Action {
    match key {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => Action::Cursor(key),
        KeyCode::Enter | KeyCode::Char(' ') => Action::PlaceAtCursor,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char(c) => {
            Position::from_key(&c.to_string()).map_or(Action::Ignore, Action::Place)
        }
        _ => Action::Ignore,
    }
}

/// Moves the cursor one square, stopping at the board edge.
pub fn move_cursor(cursor: Position, key: KeyCode) -> Position {
    let index = cursor.to_index();
    let (row, col) = (index / 3, index % 3);
    let (row, col) = match key {
        KeyCode::Up => (row.saturating_sub(1), col),
        KeyCode::Down => ((row + 1).min(2), col),
        KeyCode::Left => (row, col.saturating_sub(1)),
        KeyCode::Right => (row, (col + 1).min(2)),
        _ => (row, col),
    };
    Position::from_index(row * 3 + col).unwrap_or(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_moves_within_board() {
        assert_eq!(move_cursor(Position::Center, KeyCode::Up), Position::TopCenter);
        assert_eq!(move_cursor(Position::Center, KeyCode::Down), Position::BottomCenter);
        assert_eq!(move_cursor(Position::Center, KeyCode::Left), Position::MiddleLeft);
        assert_eq!(move_cursor(Position::Center, KeyCode::Right), Position::MiddleRight);
    }

    #[test]
    fn test_cursor_stops_at_edges() {
        assert_eq!(move_cursor(Position::TopLeft, KeyCode::Up), Position::TopLeft);
        assert_eq!(move_cursor(Position::TopLeft, KeyCode::Left), Position::TopLeft);
        assert_eq!(move_cursor(Position::BottomRight, KeyCode::Down), Position::BottomRight);
        assert_eq!(move_cursor(Position::TopRight, KeyCode::Right), Position::TopRight);
    }

    #[test]
    fn test_number_keys_place() {
        assert_eq!(action_for(KeyCode::Char('1')), Action::Place(Position::TopLeft));
        assert_eq!(action_for(KeyCode::Char('9')), Action::Place(Position::BottomRight));
        assert_eq!(action_for(KeyCode::Char('0')), Action::Ignore);
        assert_eq!(action_for(KeyCode::Char('x')), Action::Ignore);
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(action_for(KeyCode::Enter), Action::PlaceAtCursor);
        assert_eq!(action_for(KeyCode::Char('r')), Action::Restart);
        assert_eq!(action_for(KeyCode::Char('q')), Action::Quit);
        assert_eq!(action_for(KeyCode::Left), Action::Cursor(KeyCode::Left));
    }
}
