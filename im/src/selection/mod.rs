//! Selection state and the controller that owns it

mod controller;
mod state;

pub use controller::{DEFAULT_DEBOUNCE, NoOpReason, SelectOutcome, SelectionController};
pub use state::{SelectionChange, SelectionState, Source};
