//! Terminal UI: play against the oracle in the local terminal.

mod app;
mod input;
mod ui;

use anyhow::Result;
use app::App;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::config::GameConfig;
use crate::oracle::MoveOracle;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the terminal game until the user quits.
///
/// Logging must already point somewhere other than stdout.
#[instrument(skip_all, fields(oracle = oracle.name()))]
pub async fn run_tui(config: GameConfig, oracle: Arc<dyn MoveOracle>) -> Result<()> {
    info!("Starting terminal game");

    let (_guard, mut terminal) = guarded(enable_raw_mode, restore_terminal, || {
        execute!(io::stdout(), EnterAlternateScreen)?;
        Terminal::new(CrosstermBackend::new(io::stdout()))
    })?;

    let mut app = App::new(*config.human_mark(), oracle, config.timing());
    let res = run_loop(&mut terminal, &mut app).await;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// Calls `restore` when dropped.
struct TerminalGuard<R: FnMut()> {
    restore: R,
}

impl<R: FnMut()> Drop for TerminalGuard<R> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// Runs `enable`, then `setup` under a guard that calls `restore`.
///
/// Once `enable` has succeeded, `restore` runs exactly once: when `setup`
/// fails, or when the returned guard is dropped.
fn guarded<T, R: FnMut()>(
    enable: impl FnOnce() -> io::Result<()>,
    restore: R,
    setup: impl FnOnce() -> io::Result<T>,
) -> io::Result<(TerminalGuard<R>, T)> {
    enable()?;
    let guard = TerminalGuard { restore };
    let value = setup()?;
    Ok((guard, value))
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "Failed to leave raw mode");
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
        warn!(error = %e, "Failed to leave alternate screen");
    }
}

async fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        let view = app.view().await;
        terminal.draw(|frame| ui::draw(frame, &view, app.cursor(), app.message()))?;

        // Poll briefly so opponent moves show up without a key press.
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle(input::action_for(key.code)).await;
                }
            }
        }
    }
    info!("User quit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_failed_setup_restores_terminal() {
        let restored = Cell::new(0);
        let result = guarded(
            || Ok(()),
            || restored.set(restored.get() + 1),
            || Err::<(), _>(io::Error::other("no alternate screen")),
        );
        assert!(result.is_err());
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn test_failed_enable_skips_restore() {
        let restored = Cell::new(0);
        let result = guarded(
            || Err(io::Error::other("not a tty")),
            || restored.set(restored.get() + 1),
            || Ok(()),
        );
        assert!(result.is_err());
        assert_eq!(restored.get(), 0);
    }

    #[test]
    fn test_guard_restores_once_on_drop() {
        let restored = Cell::new(0);
        let (guard, value) = guarded(
            || Ok(()),
            || restored.set(restored.get() + 1),
            || Ok(7),
        )
        .unwrap();
        assert_eq!(value, 7);
        assert_eq!(restored.get(), 0);

        drop(guard);
        assert_eq!(restored.get(), 1);
    }
}
