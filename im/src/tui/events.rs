//! TUI event handling
//!
//! Crossterm is polled on a plain thread and events are forwarded over a
//! tokio channel so the runner can `select!` on them.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Terminal events
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Click or wheel
    Mouse(MouseEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick (drives list scrolling)
    Tick,
}

/// Only clicks and wheel turns matter; moves and drags would flood the channel
fn wanted_mouse(kind: MouseEventKind) -> bool {
    matches!(
        kind,
        MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
    )
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        debug!(?tick_rate, "EventHandler::new: called");
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            debug!("EventHandler::new: event polling thread started");
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let Ok(evt) = event::read() else {
                        continue;
                    };
                    let event = match evt {
                        event::Event::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                        event::Event::Mouse(mouse) if wanted_mouse(mouse.kind) => Event::Mouse(mouse),
                        event::Event::Resize(w, h) => {
                            debug!(w, h, "EventHandler: resize event received");
                            Event::Resize(w, h)
                        }
                        _ => continue,
                    };
                    trace!(?event, "EventHandler: forwarding event");
                    if tx.send(event).is_err() {
                        debug!("EventHandler: channel closed, exiting loop");
                        break;
                    }
                } else if tx.send(Event::Tick).is_err() {
                    debug!("EventHandler: channel closed on tick, exiting loop");
                    break;
                }
            }
            debug!("EventHandler: event polling thread exiting");
        });

        Self { rx }
    }

    /// Get the next event (async)
    pub async fn next(&mut self) -> Result<Event> {
        self.rx.recv().await.ok_or_else(|| eyre::eyre!("Event channel closed"))
    }
}
