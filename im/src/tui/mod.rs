//! Terminal host for IncidentMap
//!
//! Shows the card list and the map side by side:
//! - Click a card or a marker to select it
//! - j/k to step through records, Esc to clear
//! - +/- or the mouse wheel over the map to zoom

mod app;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::{Action, App};
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;
pub use state::{CARD_HEIGHT, MapViewport, TuiState};

use std::io::{self, Stdout};
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::config::Config;
use crate::domain::RecordStore;
use crate::engine::SyncEngine;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Run the TUI over a loaded store, optionally selecting a record at startup
pub async fn run_with_engine(store: Arc<RecordStore>, config: &Config, initial: Option<i64>) -> Result<()> {
    debug!(records = store.len(), ?initial, "run_with_engine: called");
    let terminal = init()?;

    // Use a guard to ensure terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let engine = SyncEngine::new(store, config);
    let mut runner = TuiRunner::new(terminal, engine, config.tui.tick_rate());
    runner.run(initial).await
}
