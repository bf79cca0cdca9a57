//! Map renderer
//!
//! Markers are keyed by record id. After the first full render, a
//! selection change only re-emits the markers whose selection status
//! flipped, so the cost of a change does not grow with the store.

use serde::Serialize;
use tracing::debug;

use crate::domain::{Coordinate, Record, RecordId, RecordStore};
use crate::selection::{SelectionChange, SelectionState};

/// Marker fill color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Blue,
    Red,
}

/// What the host needs to paint one marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerViewModel {
    pub id: RecordId,
    pub coordinate: Coordinate,
    pub radius: f64,
    pub color: MarkerColor,
    pub highlighted: bool,
    pub label: String,
}

/// Capacity to radius mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    pub min_radius: f64,
    pub max_radius: f64,
    /// Multiplier applied to the selected marker
    pub emphasis: f64,
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self {
            min_radius: 5.0,
            max_radius: 20.0,
            emphasis: 1.5,
        }
    }
}

impl RadiusScale {
    pub fn new(min_radius: f64, max_radius: f64, emphasis: f64) -> Self {
        Self {
            min_radius,
            max_radius,
            emphasis,
        }
    }

    /// Linear interpolation on `capacity / max_capacity`, clamped to [min, max]
    ///
    /// Absent, non-positive or non-finite capacity, or a zero maximum, map to the minimum.
    pub fn scale(&self, capacity: Option<f64>, max_capacity: f64) -> f64 {
        let Some(capacity) = capacity.filter(|c| c.is_finite() && *c > 0.0) else {
            return self.min_radius;
        };
        if !max_capacity.is_finite() || max_capacity <= 0.0 {
            return self.min_radius;
        }
        let ratio = (capacity / max_capacity).clamp(0.0, 1.0);
        self.min_radius + (self.max_radius - self.min_radius) * ratio
    }

    pub fn emphasized(&self, radius: f64) -> f64 {
        radius * self.emphasis
    }
}

fn marker(record: &Record, base_radius: f64, scale: &RadiusScale, highlighted: bool) -> MarkerViewModel {
    let (radius, color) = if highlighted {
        (scale.emphasized(base_radius), MarkerColor::Red)
    } else {
        (base_radius, MarkerColor::Blue)
    };
    MarkerViewModel {
        id: record.id,
        coordinate: record.coordinate,
        radius,
        color,
        highlighted,
        label: record.title.clone(),
    }
}

/// Pure marker render: one view-model per record, in store order
pub fn render_markers(store: &RecordStore, selection: SelectionState, scale: &RadiusScale) -> Vec<MarkerViewModel> {
    let max_capacity = store.max_capacity();
    store
        .iter()
        .map(|record| {
            let base = scale.scale(record.capacity, max_capacity);
            marker(record, base, scale, selection.is_selected(record.id))
        })
        .collect()
}

/// Marker renderer with unselected radii computed once per store
#[derive(Debug, Clone)]
pub struct MapRenderer {
    scale: RadiusScale,
    base_radii: Vec<f64>,
}

impl MapRenderer {
    pub fn new(store: &RecordStore, scale: RadiusScale) -> Self {
        debug!(count = store.len(), ?scale, "MapRenderer::new: called");
        let max_capacity = store.max_capacity();
        let base_radii = store.iter().map(|r| scale.scale(r.capacity, max_capacity)).collect();
        Self { scale, base_radii }
    }

    pub fn scale(&self) -> &RadiusScale {
        &self.scale
    }

    /// View-model for a single record under the given selection
    pub fn marker(&self, store: &RecordStore, id: RecordId, selection: SelectionState) -> Option<MarkerViewModel> {
        let record = store.get(id)?;
        let base = *self.base_radii.get(id.index())?;
        Some(marker(record, base, &self.scale, selection.is_selected(id)))
    }

    /// Every marker, for the initial mount
    pub fn render(&self, store: &RecordStore, selection: SelectionState) -> Vec<MarkerViewModel> {
        debug!(selected = ?selection.selected(), "MapRenderer::render: called");
        store
            .iter()
            .filter_map(|record| self.marker(store, record.id, selection))
            .collect()
    }

    /// Only the markers whose styling changed
    pub fn patch(&self, store: &RecordStore, change: SelectionChange) -> Vec<MarkerViewModel> {
        debug!(?change, "MapRenderer::patch: called");
        change
            .affected()
            .filter_map(|id| self.marker(store, id, change.current))
            .collect()
    }
}
