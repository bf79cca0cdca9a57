//! TUI application state
//!
//! Pure data structures for the terminal host. No rendering logic here.
//! `TuiState` is the `Host` the engine paints into: it keeps the latest
//! card list, the keyed marker set and the map viewport.

use ratatui::layout::{Position, Rect};
use tracing::{debug, trace};

use crate::domain::{Coordinate, RecordId};
use crate::host::Host;
use crate::render::{CardViewModel, MarkerViewModel};
use crate::selection::SelectOutcome;

/// Rows taken by one card, borders included
pub const CARD_HEIGHT: u16 = 5;

/// Braille dots per marker radius unit
const MARKER_DOTS_PER_UNIT: f64 = 0.25;

/// Map camera position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: Coordinate::new(0.0, 0.0),
            zoom: Self::MIN_ZOOM,
        }
    }
}

impl MapViewport {
    pub const MIN_ZOOM: u8 = 1;
    pub const MAX_ZOOM: u8 = 14;

    /// Degrees of longitude visible at this zoom (whole world at zoom 1)
    pub fn lon_span(&self) -> f64 {
        360.0 / 2f64.powi(i32::from(self.zoom.max(Self::MIN_ZOOM)) - 1)
    }

    /// Canvas bounds for an area, keeping braille dots square
    pub fn bounds(&self, area: Rect) -> ([f64; 2], [f64; 2]) {
        let lon_span = self.lon_span();
        let dots_wide = f64::from(area.width.max(1)) * 2.0;
        let dots_high = f64::from(area.height.max(1)) * 4.0;
        let lat_span = (lon_span * dots_high / dots_wide).min(180.0);
        (
            [self.center.lon - lon_span / 2.0, self.center.lon + lon_span / 2.0],
            [self.center.lat - lat_span / 2.0, self.center.lat + lat_span / 2.0],
        )
    }

    pub fn zoom_by(&mut self, delta: i8) {
        let zoom = i16::from(self.zoom) + i16::from(delta);
        self.zoom = zoom.clamp(i16::from(Self::MIN_ZOOM), i16::from(Self::MAX_ZOOM)) as u8;
        debug!(zoom = self.zoom, "MapViewport::zoom_by: zoom changed");
    }

    /// Geographic position under a terminal cell
    pub fn to_geo(&self, area: Rect, column: u16, row: u16) -> Option<Coordinate> {
        if !area.contains(Position::new(column, row)) {
            return None;
        }
        let ([x0, x1], [y0, y1]) = self.bounds(area);
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        Some(Coordinate::new(y1 - fy * (y1 - y0), x0 + fx * (x1 - x0)))
    }

    /// Degrees covered by one braille dot
    pub fn degrees_per_dot(&self, area: Rect) -> f64 {
        self.lon_span() / (f64::from(area.width.max(1)) * 2.0)
    }

    /// Marker radius converted to canvas units
    pub fn marker_radius(&self, area: Rect, radius: f64) -> f64 {
        (radius * MARKER_DOTS_PER_UNIT).max(1.0) * self.degrees_per_dot(area)
    }
}

/// State of the terminal host
#[derive(Debug, Default)]
pub struct TuiState {
    /// Latest card list from the engine
    pub cards: Vec<CardViewModel>,
    /// Markers indexed by record id
    pub markers: Vec<Option<MarkerViewModel>>,
    /// Index of the first visible card
    pub list_scroll: usize,
    /// Card index the list is gliding toward
    pub scroll_target: Option<usize>,
    /// Scroll requested before the list had been laid out
    pending_scroll: Option<RecordId>,
    pub viewport: MapViewport,
    /// Inner list area from the last draw
    pub list_area: Option<Rect>,
    /// Inner map area from the last draw; `None` until the first frame
    pub map_area: Option<Rect>,
    /// Transient message shown in the footer
    pub status: Option<String>,
    pub should_quit: bool,
}

impl TuiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&CardViewModel> {
        self.cards.iter().find(|c| c.highlighted)
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerViewModel> {
        self.markers.iter().flatten()
    }

    /// Cards that fit in the list area
    pub fn visible_cards(&self) -> usize {
        self.list_area
            .map(|area| usize::from(area.height / CARD_HEIGHT).max(1))
            .unwrap_or(1)
    }

    pub fn max_scroll(&self) -> usize {
        self.cards.len().saturating_sub(self.visible_cards())
    }

    /// Scroll offset that puts a card in the middle of the list
    fn centered_scroll(&self, index: usize) -> usize {
        index.saturating_sub(self.visible_cards() / 2).min(self.max_scroll())
    }

    /// Record the list area from a draw and resolve any early scroll request
    pub fn set_list_area(&mut self, area: Rect) {
        self.list_area = Some(area);
        if let Some(id) = self.pending_scroll.take() {
            debug!(%id, "TuiState::set_list_area: resolving pending scroll");
            self.scroll_target = Some(self.centered_scroll(id.index()));
        }
        self.list_scroll = self.list_scroll.min(self.max_scroll());
    }

    pub fn set_map_area(&mut self, area: Rect) {
        if self.map_area.is_none() {
            debug!(?area, "TuiState::set_map_area: map surface ready");
        }
        self.map_area = Some(area);
    }

    /// Move one card toward the scroll target; called on every tick
    pub fn advance_scroll(&mut self) {
        let Some(target) = self.scroll_target else {
            return;
        };
        trace!(self.list_scroll, target, "TuiState::advance_scroll: called");
        if self.list_scroll < target {
            self.list_scroll += 1;
        } else if self.list_scroll > target {
            self.list_scroll -= 1;
        }
        if self.list_scroll == target {
            self.scroll_target = None;
        }
    }

    /// Manual scroll; cancels any glide in progress
    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_target = None;
        self.list_scroll = self.list_scroll.saturating_add_signed(delta).min(self.max_scroll());
    }

    /// Card under a terminal cell
    pub fn card_at(&self, column: u16, row: u16) -> Option<RecordId> {
        let area = self.list_area?;
        if !area.contains(Position::new(column, row)) {
            return None;
        }
        let index = self.list_scroll + usize::from((row - area.y) / CARD_HEIGHT);
        self.cards.get(index).map(|c| c.id)
    }

    /// Nearest marker under a terminal cell
    pub fn marker_at(&self, column: u16, row: u16) -> Option<RecordId> {
        let area = self.map_area?;
        let click = self.viewport.to_geo(area, column, row)?;
        // At least one cell of slack so small markers stay clickable
        let cell = self.viewport.degrees_per_dot(area) * 4.0;

        let mut best: Option<(RecordId, f64)> = None;
        for marker in self.markers() {
            let dx = marker.coordinate.lon - click.lon;
            let dy = marker.coordinate.lat - click.lat;
            let dist = (dx * dx + dy * dy).sqrt();
            let threshold = self.viewport.marker_radius(area, marker.radius).max(cell);
            if dist <= threshold && best.is_none_or(|(_, d)| dist < d) {
                best = Some((marker.id, dist));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Footer feedback for an activation
    pub fn note_outcome(&mut self, outcome: SelectOutcome) {
        self.status = match outcome {
            SelectOutcome::Changed(_) => None,
            SelectOutcome::NoOp { reason } => Some(format!("Selection ignored ({reason})")),
        };
    }
}

impl Host for TuiState {
    fn render_cards(&mut self, cards: &[CardViewModel]) {
        trace!(count = cards.len(), "TuiState::render_cards: called");
        self.cards = cards.to_vec();
        self.list_scroll = self.list_scroll.min(self.max_scroll());
    }

    fn render_markers(&mut self, markers: &[MarkerViewModel]) {
        trace!(count = markers.len(), "TuiState::render_markers: called");
        for marker in markers {
            let index = marker.id.index();
            if index >= self.markers.len() {
                self.markers.resize(index + 1, None);
            }
            self.markers[index] = Some(marker.clone());
        }
    }

    fn scroll_card_into_view(&mut self, id: RecordId) {
        debug!(%id, "TuiState::scroll_card_into_view: called");
        if self.list_area.is_none() {
            self.pending_scroll = Some(id);
            return;
        }
        self.scroll_target = Some(self.centered_scroll(id.index()));
    }

    fn set_map_viewport(&mut self, lat: f64, lon: f64, zoom: u8) {
        debug!(lat, lon, zoom, "TuiState::set_map_viewport: called");
        self.viewport = MapViewport {
            center: Coordinate::new(lat, lon),
            zoom: zoom.clamp(MapViewport::MIN_ZOOM, MapViewport::MAX_ZOOM),
        };
    }

    fn viewport_ready(&self) -> bool {
        self.map_area.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayField;
    use crate::render::MarkerColor;

    fn card(index: usize, highlighted: bool) -> CardViewModel {
        CardViewModel {
            id: RecordId::new(index),
            title: format!("Site {index}"),
            fields: vec![DisplayField::text("Cause", "Unknown")],
            highlighted,
        }
    }

    fn marker(index: usize, lat: f64, lon: f64) -> MarkerViewModel {
        MarkerViewModel {
            id: RecordId::new(index),
            coordinate: Coordinate::new(lat, lon),
            radius: 5.0,
            color: MarkerColor::Blue,
            highlighted: false,
            label: format!("Site {index}"),
        }
    }

    fn state_with_cards(n: usize) -> TuiState {
        let mut state = TuiState::new();
        let cards: Vec<_> = (0..n).map(|i| card(i, false)).collect();
        state.render_cards(&cards);
        state
    }

    #[test]
    fn test_viewport_spans() {
        let mut viewport = MapViewport::default();
        assert_eq!(viewport.lon_span(), 360.0);
        viewport.zoom = 8;
        assert_eq!(viewport.lon_span(), 2.8125);
    }

    #[test]
    fn test_viewport_zoom_clamped() {
        let mut viewport = MapViewport::default();
        viewport.zoom_by(-3);
        assert_eq!(viewport.zoom, MapViewport::MIN_ZOOM);
        viewport.zoom_by(100);
        assert_eq!(viewport.zoom, MapViewport::MAX_ZOOM);
    }

    #[test]
    fn test_viewport_to_geo_center() {
        let viewport = MapViewport {
            center: Coordinate::new(10.0, 20.0),
            zoom: 4,
        };
        let area = Rect::new(0, 0, 41, 21);
        let geo = viewport.to_geo(area, 20, 10).unwrap();
        assert!((geo.lat - 10.0).abs() < 1e-9);
        assert!((geo.lon - 20.0).abs() < 1e-9);
        assert!(viewport.to_geo(area, 50, 10).is_none());
    }

    #[test]
    fn test_viewport_ready_after_first_draw() {
        let mut state = TuiState::new();
        assert!(!state.viewport_ready());
        state.set_map_area(Rect::new(30, 1, 80, 30));
        assert!(state.viewport_ready());
    }

    #[test]
    fn test_render_markers_upserts_by_id() {
        let mut state = TuiState::new();
        state.render_markers(&[marker(0, 0.0, 0.0), marker(1, 5.0, 5.0), marker(2, 9.0, 9.0)]);

        let mut updated = marker(1, 5.0, 5.0);
        updated.highlighted = true;
        updated.radius = 7.5;
        state.render_markers(&[updated]);

        assert_eq!(state.markers().count(), 3);
        assert!(state.markers[1].as_ref().unwrap().highlighted);
        assert!(!state.markers[0].as_ref().unwrap().highlighted);
    }

    #[test]
    fn test_scroll_into_view_glides_to_center() {
        let mut state = state_with_cards(20);
        state.set_list_area(Rect::new(0, 0, 30, CARD_HEIGHT * 4));

        state.scroll_card_into_view(RecordId::new(10));
        assert_eq!(state.scroll_target, Some(8));

        for _ in 0..8 {
            state.advance_scroll();
        }
        assert_eq!(state.list_scroll, 8);
        assert_eq!(state.scroll_target, None);
    }

    #[test]
    fn test_scroll_before_layout_is_deferred() {
        let mut state = state_with_cards(20);
        state.scroll_card_into_view(RecordId::new(19));
        assert_eq!(state.scroll_target, None);

        state.set_list_area(Rect::new(0, 0, 30, CARD_HEIGHT * 4));
        assert_eq!(state.scroll_target, Some(16));
    }

    #[test]
    fn test_card_at() {
        let mut state = state_with_cards(10);
        state.set_list_area(Rect::new(1, 1, 30, CARD_HEIGHT * 3));
        state.scroll_by(2);

        assert_eq!(state.card_at(5, 1), Some(RecordId::new(2)));
        assert_eq!(state.card_at(5, 1 + CARD_HEIGHT), Some(RecordId::new(3)));
        assert_eq!(state.card_at(40, 1), None);
    }

    #[test]
    fn test_marker_at_picks_nearest() {
        let mut state = TuiState::new();
        let area = Rect::new(0, 0, 80, 40);
        state.set_map_area(area);
        state.render_markers(&[marker(0, 0.0, 0.0), marker(1, 40.0, 100.0)]);

        let center = (area.width / 2, area.height / 2);
        assert_eq!(state.marker_at(center.0, center.1), Some(RecordId::new(0)));
        assert_eq!(state.marker_at(0, 0), None);
    }

    #[test]
    fn test_note_outcome() {
        let mut state = TuiState::new();
        state.note_outcome(SelectOutcome::NoOp {
            reason: crate::selection::NoOpReason::Debounced,
        });
        assert_eq!(state.status.as_deref(), Some("Selection ignored (debounced)"));
    }
}
