//! TUI Runner - main loop that owns the terminal and the engine
//!
//! The TuiRunner is responsible for:
//! - Mounting the engine into the terminal host
//! - Dispatching input to the App and selection actions to the engine
//! - Waking up for parked camera moves
//! - Rendering on every event

use std::time::{Duration, Instant};

use eyre::Result;
use tracing::{debug, info};

use super::Tui;
use super::app::{Action, App};
use super::events::{Event, EventHandler};
use super::views;
use crate::camera::CameraPoll;
use crate::engine::SyncEngine;

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    engine: SyncEngine,
    event_handler: EventHandler,
}

impl TuiRunner {
    pub fn new(terminal: Tui, engine: SyncEngine, tick_rate: Duration) -> Self {
        debug!(?tick_rate, "TuiRunner::new: called");
        Self {
            app: App::new(),
            terminal,
            engine,
            event_handler: EventHandler::new(tick_rate),
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self, initial: Option<i64>) -> Result<()> {
        debug!(?initial, "TuiRunner::run: called");
        self.engine.mount(self.app.state_mut());

        // Applied before the first frame, so the map is not ready yet and
        // the camera move gets parked until it is
        if let Some(identifier) = initial {
            self.apply(Action::ActivateCard(identifier));
        }

        debug!("TuiRunner::run: entering main loop");
        loop {
            self.terminal.draw(|frame| views::render(self.app.state_mut(), frame))?;

            let deadline = self.engine.next_camera_deadline();
            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Tick => self.app.state_mut().advance_scroll(),
                        Event::Key(key) => {
                            if let Some(action) = self.app.handle_key(key) {
                                self.apply(action);
                            }
                        }
                        Event::Mouse(mouse) => {
                            if let Some(action) = self.app.handle_mouse(mouse) {
                                self.apply(action);
                            }
                        }
                        Event::Resize(width, height) => {
                            debug!(width, height, "TuiRunner::run: terminal resized");
                        }
                    }
                }
                _ = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    self.poll_camera();
                }
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    /// Hand a selection action to the engine
    fn apply(&mut self, action: Action) {
        debug!(?action, "TuiRunner::apply: called");
        let now = Instant::now();
        let state = self.app.state_mut();
        let outcome = match action {
            Action::ActivateCard(identifier) => self.engine.on_card_activated(identifier, now, state),
            Action::ActivateMarker(identifier) => self.engine.on_marker_activated(identifier, now, state),
            Action::Deselect => self.engine.deselect(now, state),
        };
        state.note_outcome(outcome);
    }

    fn poll_camera(&mut self) {
        match self.engine.poll_camera(Instant::now(), self.app.state_mut()) {
            CameraPoll::Moved(id) => info!(%id, "Deferred map focus applied"),
            CameraPoll::GaveUp(id) => self.app.state_mut().status = Some(format!("Map never became ready for {id}")),
            CameraPoll::Idle | CameraPoll::Waiting => {}
        }
    }
}
