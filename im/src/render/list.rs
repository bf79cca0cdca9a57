//! List renderer
//!
//! Cards are always emitted in store order. Selection only changes the
//! `highlighted` flag, never ordering or visibility.

use serde::Serialize;
use tracing::debug;

use crate::domain::{DisplayField, Record, RecordId, RecordStore};
use crate::selection::SelectionState;

/// What the host needs to paint one card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardViewModel {
    pub id: RecordId,
    pub title: String,
    pub fields: Vec<DisplayField>,
    pub highlighted: bool,
}

impl CardViewModel {
    fn from_record(record: &Record, selection: SelectionState) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            fields: record.fields.clone(),
            highlighted: selection.is_selected(record.id),
        }
    }
}

/// Pure card render: one view-model per record, in store order
pub fn render_cards(store: &RecordStore, selection: SelectionState) -> Vec<CardViewModel> {
    store
        .iter()
        .map(|record| CardViewModel::from_record(record, selection))
        .collect()
}

/// Output of one list update
#[derive(Debug, Clone, PartialEq)]
pub struct ListUpdate {
    pub cards: Vec<CardViewModel>,
    /// Set only when a card has just become highlighted
    pub scroll_to: Option<RecordId>,
}

/// Card renderer that remembers the last highlighted card
///
/// The memory exists only to tell the host when to scroll: the scroll
/// command fires on the transition into highlighted, not on every render.
#[derive(Debug, Clone, Default)]
pub struct ListRenderer {
    last_highlighted: Option<RecordId>,
}

impl ListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, store: &RecordStore, selection: SelectionState) -> ListUpdate {
        debug!(selected = ?selection.selected(), "ListRenderer::update: called");
        let cards = render_cards(store, selection);
        let highlighted = selection.selected();
        let scroll_to = highlighted.filter(|id| self.last_highlighted != Some(*id));
        self.last_highlighted = highlighted;
        ListUpdate { cards, scroll_to }
    }
}
