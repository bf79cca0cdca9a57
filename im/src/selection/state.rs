//! Selection state values
//!
//! `SelectionState` is `Copy` so every consumer of a change receives the
//! same value, never a reference into state that could move underneath it.

use std::fmt;

use serde::Serialize;

use crate::domain::RecordId;

/// Which view an activation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    List,
    Map,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// The currently selected record, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SelectionState {
    selected: Option<RecordId>,
}

impl SelectionState {
    pub fn none() -> Self {
        Self { selected: None }
    }

    pub(crate) fn of(id: RecordId) -> Self {
        Self { selected: Some(id) }
    }

    pub fn selected(self) -> Option<RecordId> {
        self.selected
    }

    pub fn is_selected(self, id: RecordId) -> bool {
        self.selected == Some(id)
    }

    pub fn is_none(self) -> bool {
        self.selected.is_none()
    }
}

/// An accepted transition between two selection states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionChange {
    pub previous: SelectionState,
    pub current: SelectionState,
}

impl SelectionChange {
    /// Records whose selection status differs between previous and current
    pub fn affected(self) -> impl Iterator<Item = RecordId> {
        let previous = self.previous.selected();
        let current = self.current.selected();
        previous
            .into_iter()
            .chain(current.filter(|id| Some(*id) != previous))
    }
}
