//! Presentation host interface
//!
//! The engine never paints anything. It hands view-models and imperative
//! commands to a `Host`, which owns the actual widgets.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::domain::RecordId;
use crate::render::{CardViewModel, MarkerViewModel};

/// Rendering hooks the engine drives
pub trait Host {
    /// Replace the card list
    fn render_cards(&mut self, cards: &[CardViewModel]);

    /// Upsert markers by id; markers not mentioned keep their previous state
    fn render_markers(&mut self, markers: &[MarkerViewModel]);

    /// Bring a card into the visible part of the list
    fn scroll_card_into_view(&mut self, id: RecordId);

    /// Recenter and zoom the map
    fn set_map_viewport(&mut self, lat: f64, lon: f64, zoom: u8);

    /// Whether the map surface can accept viewport commands yet
    fn viewport_ready(&self) -> bool {
        true
    }
}

/// One call made on a `RecordingHost`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "kebab-case")]
pub enum HostCall {
    RenderCards { count: usize, highlighted: Option<RecordId> },
    RenderMarkers { ids: Vec<RecordId> },
    ScrollCardIntoView { id: RecordId },
    SetMapViewport { lat: f64, lon: f64, zoom: u8 },
}

/// Headless host that records every call and keeps the merged view state
#[derive(Debug, Clone)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    cards: Vec<CardViewModel>,
    markers: BTreeMap<RecordId, MarkerViewModel>,
    ready: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            cards: Vec::new(),
            markers: BTreeMap::new(),
            ready: true,
        }
    }

    /// A host whose viewport is not ready until `set_ready(true)`
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::new()
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn cards(&self) -> &[CardViewModel] {
        &self.cards
    }

    /// Current marker state, in id order
    pub fn markers(&self) -> Vec<MarkerViewModel> {
        self.markers.values().cloned().collect()
    }

    pub fn marker(&self, id: RecordId) -> Option<&MarkerViewModel> {
        self.markers.get(&id)
    }

    pub fn viewport_calls(&self) -> Vec<(f64, f64, u8)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::SetMapViewport { lat, lon, zoom } => Some((*lat, *lon, *zoom)),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn render_cards(&mut self, cards: &[CardViewModel]) {
        trace!(count = cards.len(), "RecordingHost::render_cards: called");
        self.calls.push(HostCall::RenderCards {
            count: cards.len(),
            highlighted: cards.iter().find(|c| c.highlighted).map(|c| c.id),
        });
        self.cards = cards.to_vec();
    }

    fn render_markers(&mut self, markers: &[MarkerViewModel]) {
        trace!(count = markers.len(), "RecordingHost::render_markers: called");
        self.calls.push(HostCall::RenderMarkers {
            ids: markers.iter().map(|m| m.id).collect(),
        });
        for marker in markers {
            self.markers.insert(marker.id, marker.clone());
        }
    }

    fn scroll_card_into_view(&mut self, id: RecordId) {
        trace!(%id, "RecordingHost::scroll_card_into_view: called");
        self.calls.push(HostCall::ScrollCardIntoView { id });
    }

    fn set_map_viewport(&mut self, lat: f64, lon: f64, zoom: u8) {
        trace!(lat, lon, zoom, "RecordingHost::set_map_viewport: called");
        self.calls.push(HostCall::SetMapViewport { lat, lon, zoom });
    }

    fn viewport_ready(&self) -> bool {
        self.ready
    }
}
