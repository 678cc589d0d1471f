//! Application state and logic.

use super::input::{Action, move_cursor};
use crate::coordinator::{Coordinator, Phase, SharedGame, TurnTiming, play_opponent_turn};
use crate::oracle::MoveOracle;
use crate::view::GameView;
use noughts_tictactoe::{Mark, Position};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Main application state.
pub struct App {
    game: SharedGame,
    oracle: Arc<dyn MoveOracle>,
    timing: TurnTiming,
    cursor: Position,
    message: Option<String>,
    opponent_task: Option<JoinHandle<()>>,
    should_quit: bool,
}

impl App {
    /// Creates a new application with a fresh game.
    pub fn new(human_mark: Mark, oracle: Arc<dyn MoveOracle>, timing: TurnTiming) -> Self {
        Self {
            game: Arc::new(Mutex::new(Coordinator::new(human_mark))),
            oracle,
            timing,
            cursor: Position::Center,
            message: None,
            opponent_task: None,
            should_quit: false,
        }
    }

    /// Square under the cursor.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Last local message, such as a rejected move.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Snapshot of the game for rendering.
    pub async fn view(&self) -> GameView {
        GameView::from(&*self.game.lock().await)
    }

    /// Applies a key action.
    pub async fn handle(&mut self, action: Action) {
        match action {
            Action::Cursor(key) => self.cursor = move_cursor(self.cursor, key),
            Action::PlaceAtCursor => self.place(self.cursor).await,
            Action::Place(pos) => {
                self.cursor = pos;
                self.place(pos).await;
            }
            Action::Restart => {
                debug!("Restarting game");
                self.game.lock().await.restart();
                self.message = None;
            }
            Action::Quit => self.should_quit = true,
            Action::Ignore => {}
        }
    }

    /// Waits for the in-flight opponent turn, if one was started.
    #[cfg(test)]
    async fn settle(&mut self) {
        if let Some(task) = self.opponent_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Opponent task panicked");
            }
        }
    }

    async fn place(&mut self, pos: Position) {
        let phase = {
            let mut game = self.game.lock().await;
            match game.human_move(pos.to_index()) {
                Ok(outcome) => {
                    info!(position = %pos, %outcome, "Human moved");
                    self.message = None;
                    *game.phase()
                }
                Err(e) => {
                    debug!(error = %e, "Move rejected");
                    self.message = Some(e.to_string());
                    return;
                }
            }
        };

        if phase == Phase::OpponentPending {
            let game = Arc::clone(&self.game);
            let oracle = Arc::clone(&self.oracle);
            let timing = self.timing;
            self.opponent_task = Some(tokio::spawn(async move {
                if let Err(e) = play_opponent_turn(&game, oracle.as_ref(), timing).await {
                    warn!(error = %e, "Opponent turn failed");
                }
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::FirstOpenOracle;
    use crossterm::event::KeyCode;

    fn app() -> App {
        App::new(Mark::X, Arc::new(FirstOpenOracle), TurnTiming::immediate())
    }

    #[tokio::test]
    async fn test_place_triggers_opponent() {
        let mut app = app();
        app.handle(Action::Place(Position::Center)).await;
        app.settle().await;

        let view = app.view().await;
        assert_eq!(view.board.get(Position::Center).mark(), Some(Mark::X));
        assert_eq!(view.board.get(Position::TopLeft).mark(), Some(Mark::O));
        assert_eq!(view.phase, Phase::HumanTurn);
    }

    #[tokio::test]
    async fn test_occupied_square_sets_message() {
        let mut app = app();
        app.handle(Action::Place(Position::Center)).await;
        app.settle().await;
        app.handle(Action::Place(Position::TopLeft)).await;

        assert!(app.message().is_some());
        assert_eq!(app.view().await.board.filled(), 2);
    }

    #[tokio::test]
    async fn test_cursor_place_and_restart() {
        let mut app = app();
        app.handle(Action::Cursor(KeyCode::Right)).await;
        assert_eq!(app.cursor(), Position::MiddleRight);
        app.handle(Action::PlaceAtCursor).await;
        app.settle().await;
        assert_eq!(app.view().await.board.get(Position::MiddleRight).mark(), Some(Mark::X));

        app.handle(Action::Restart).await;
        let view = app.view().await;
        assert_eq!(view.board.filled(), 0);
        assert_eq!(view.phase, Phase::HumanTurn);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app();
        assert!(!app.should_quit());
        app.handle(Action::Quit).await;
        assert!(app.should_quit());
    }
}
