//! Selection controller
//!
//! Single writer of the selection state. Raw activations from the list and
//! the map both come through `handle_select`, which applies, in order:
//!
//! 1. validity: the identifier must resolve in the record store
//! 2. debounce: one global window measured from the last accepted event
//! 3. idempotence: re-selecting the current record changes nothing
//!
//! Dropped events never move the debounce clock, so a burst of activations
//! inside the window cannot keep extending it.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use super::state::{SelectionChange, SelectionState, Source};
use crate::domain::RecordStore;

/// Default debounce window between accepted selections
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Why an event did not change the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoOpReason {
    /// Identifier malformed or not in the store
    Invalid,
    /// Arrived inside the debounce window
    Debounced,
    /// Already the current selection
    Unchanged,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid"),
            Self::Debounced => write!(f, "debounced"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Result of feeding one event to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SelectOutcome {
    Changed(SelectionChange),
    NoOp { reason: NoOpReason },
}

impl SelectOutcome {
    fn no_op(reason: NoOpReason) -> Self {
        Self::NoOp { reason }
    }

    pub fn change(self) -> Option<SelectionChange> {
        match self {
            Self::Changed(change) => Some(change),
            Self::NoOp { .. } => None,
        }
    }

    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// Decides the next selection state from raw input events
#[derive(Debug, Clone)]
pub struct SelectionController {
    state: SelectionState,
    debounce: Duration,
    last_accepted: Option<Instant>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SelectionController {
    pub fn new(debounce: Duration) -> Self {
        debug!(?debounce, "SelectionController::new: called");
        Self {
            state: SelectionState::none(),
            debounce,
            last_accepted: None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Handle a card or marker activation
    pub fn handle_select(&mut self, store: &RecordStore, source: Source, raw: i64, now: Instant) -> SelectOutcome {
        debug!(%source, raw, "SelectionController::handle_select: called");

        let Some(id) = store.resolve(raw) else {
            debug!(%source, raw, len = store.len(), "SelectionController::handle_select: rejected invalid id");
            return SelectOutcome::no_op(NoOpReason::Invalid);
        };

        if let Some(last) = self.last_accepted
            && now.saturating_duration_since(last) < self.debounce
        {
            debug!(%source, %id, "SelectionController::handle_select: debounced");
            return SelectOutcome::no_op(NoOpReason::Debounced);
        }

        if self.state.is_selected(id) {
            debug!(%source, %id, "SelectionController::handle_select: already selected");
            return SelectOutcome::no_op(NoOpReason::Unchanged);
        }

        let change = SelectionChange {
            previous: self.state,
            current: SelectionState::of(id),
        };
        self.state = change.current;
        self.last_accepted = Some(now);
        debug!(%source, %id, previous = ?change.previous.selected(), "SelectionController::handle_select: accepted");
        SelectOutcome::Changed(change)
    }

    /// Clear the selection. Not debounced and leaves the debounce clock alone.
    pub fn deselect(&mut self) -> SelectOutcome {
        debug!(selected = ?self.state.selected(), "SelectionController::deselect: called");
        if self.state.is_none() {
            return SelectOutcome::no_op(NoOpReason::Unchanged);
        }

        let change = SelectionChange {
            previous: self.state,
            current: SelectionState::none(),
        };
        self.state = change.current;
        SelectOutcome::Changed(change)
    }
}
