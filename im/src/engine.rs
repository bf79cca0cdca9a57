//! Selection synchronization engine
//!
//! The single entry point for activations from either view. Every accepted
//! change is fanned out to the list renderer, the map renderer and the
//! camera in one synchronous call, all seeing the same `SelectionChange`
//! value. Rejected events produce no host calls at all.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::camera::{CameraController, CameraPoll};
use crate::config::Config;
use crate::domain::RecordStore;
use crate::host::Host;
use crate::render::{ListRenderer, MapRenderer};
use crate::selection::{SelectOutcome, SelectionChange, SelectionController, SelectionState, Source};

/// Owns the selection state and everything derived from it
#[derive(Debug)]
pub struct SyncEngine {
    store: Arc<RecordStore>,
    controller: SelectionController,
    list: ListRenderer,
    map: MapRenderer,
    camera: CameraController,
}

impl SyncEngine {
    pub fn new(store: Arc<RecordStore>, config: &Config) -> Self {
        debug!(records = store.len(), "SyncEngine::new: called");
        let map = MapRenderer::new(&store, config.markers.scale());
        Self {
            controller: SelectionController::new(config.selection.debounce()),
            list: ListRenderer::new(),
            map,
            camera: CameraController::new(
                config.camera.focus_zoom,
                config.camera.retry_interval(),
                config.camera.max_retries,
            ),
            store,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn selection(&self) -> SelectionState {
        self.controller.state()
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Full initial render of both views
    pub fn mount<H: Host>(&mut self, host: &mut H) {
        info!(records = self.store.len(), "Mounting views");
        let selection = self.controller.state();
        let update = self.list.update(&self.store, selection);
        host.render_cards(&update.cards);
        host.render_markers(&self.map.render(&self.store, selection));
        if let Some(id) = update.scroll_to {
            host.scroll_card_into_view(id);
        }
    }

    /// A card was clicked or activated in the list
    pub fn on_card_activated<H: Host>(&mut self, identifier: i64, now: Instant, host: &mut H) -> SelectOutcome {
        self.select(Source::List, identifier, now, host)
    }

    /// A marker was clicked on the map
    pub fn on_marker_activated<H: Host>(&mut self, identifier: i64, now: Instant, host: &mut H) -> SelectOutcome {
        self.select(Source::Map, identifier, now, host)
    }

    /// Clear the selection
    pub fn deselect<H: Host>(&mut self, now: Instant, host: &mut H) -> SelectOutcome {
        debug!("SyncEngine::deselect: called");
        let outcome = self.controller.deselect();
        if let Some(change) = outcome.change() {
            self.publish(change, now, host);
        }
        outcome
    }

    /// Drive a pending camera retry; call at or after `next_camera_deadline`
    pub fn poll_camera<H: Host>(&mut self, now: Instant, host: &mut H) -> CameraPoll {
        self.camera.poll(now, host)
    }

    pub fn next_camera_deadline(&self) -> Option<Instant> {
        self.camera.next_deadline()
    }

    fn select<H: Host>(&mut self, source: Source, identifier: i64, now: Instant, host: &mut H) -> SelectOutcome {
        debug!(%source, identifier, "SyncEngine::select: called");
        let outcome = self.controller.handle_select(&self.store, source, identifier, now);
        match outcome {
            SelectOutcome::Changed(change) => self.publish(change, now, host),
            SelectOutcome::NoOp { reason } => {
                debug!(%source, identifier, %reason, "SyncEngine::select: ignored");
            }
        }
        outcome
    }

    fn publish<H: Host>(&mut self, change: SelectionChange, now: Instant, host: &mut H) {
        debug!(?change, "SyncEngine::publish: called");
        let update = self.list.update(&self.store, change.current);
        host.render_cards(&update.cards);
        host.render_markers(&self.map.patch(&self.store, change));
        if let Some(id) = update.scroll_to {
            host.scroll_card_into_view(id);
        }
        self.camera.on_selection(change, &self.store, now, host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::{Coordinate, Record, RecordId};
    use crate::host::{HostCall, RecordingHost};
    use crate::render::{MarkerColor, render_cards, render_markers};
    use crate::selection::NoOpReason;

    fn scenario_store() -> Arc<RecordStore> {
        Arc::new(
            RecordStore::new(vec![
                Record::new(RecordId::new(0), "Moss Landing, CA", Coordinate::new(36.5786, -121.6954)).with_capacity(100.0),
                Record::new(RecordId::new(1), "Surprise, AZ", Coordinate::new(33.6391, -112.4128)).with_capacity(50.0),
                Record::new(RecordId::new(2), "Escondido, CA", Coordinate::new(33.1192, -117.0864)).with_capacity(0.0),
            ])
            .unwrap(),
        )
    }

    fn mounted(store: Arc<RecordStore>) -> (SyncEngine, RecordingHost) {
        let mut engine = SyncEngine::new(store, &Config::default());
        let mut host = RecordingHost::new();
        engine.mount(&mut host);
        host.take_calls();
        (engine, host)
    }

    fn ms(base: Instant, offset: u64) -> Instant {
        base + Duration::from_millis(offset)
    }

    #[test]
    fn test_mount_renders_everything_unselected() {
        let mut engine = SyncEngine::new(scenario_store(), &Config::default());
        let mut host = RecordingHost::new();
        engine.mount(&mut host);

        assert_eq!(host.cards().len(), 3);
        assert!(host.cards().iter().all(|c| !c.highlighted));
        let radii: Vec<f64> = host.markers().iter().map(|m| m.radius).collect();
        assert_eq!(radii, vec![20.0, 12.5, 5.0]);
        assert!(host.viewport_calls().is_empty());
    }

    #[test]
    fn test_select_scenario() {
        let (mut engine, mut host) = mounted(scenario_store());

        let outcome = engine.on_card_activated(1, Instant::now(), &mut host);
        assert!(outcome.is_changed());

        let radii: Vec<f64> = host.markers().iter().map(|m| m.radius).collect();
        assert_eq!(radii, vec![20.0, 18.75, 5.0]);
        assert_eq!(host.marker(RecordId::new(1)).unwrap().color, MarkerColor::Red);
        assert_eq!(host.viewport_calls(), vec![(33.6391, -112.4128, 8)]);
        assert_eq!(
            host.calls(),
            &[
                HostCall::RenderCards {
                    count: 3,
                    highlighted: Some(RecordId::new(1))
                },
                HostCall::RenderMarkers {
                    ids: vec![RecordId::new(1)]
                },
                HostCall::ScrollCardIntoView { id: RecordId::new(1) },
                HostCall::SetMapViewport {
                    lat: 33.6391,
                    lon: -112.4128,
                    zoom: 8
                },
            ]
        );
    }

    #[test]
    fn test_marker_activation_matches_card_activation() {
        let (mut by_card, mut card_host) = mounted(scenario_store());
        let (mut by_marker, mut marker_host) = mounted(scenario_store());
        let t0 = Instant::now();

        by_card.on_card_activated(2, t0, &mut card_host);
        by_marker.on_marker_activated(2, t0, &mut marker_host);

        assert_eq!(by_card.selection(), by_marker.selection());
        assert_eq!(card_host.cards(), marker_host.cards());
        assert_eq!(card_host.markers(), marker_host.markers());
        assert_eq!(card_host.calls(), marker_host.calls());
    }

    #[test]
    fn test_invalid_id_makes_no_host_calls() {
        let store = Arc::new(
            RecordStore::new(
                (0..5)
                    .map(|i| Record::new(RecordId::new(i), format!("Site {i}"), Coordinate::new(1.0, 1.0)))
                    .collect(),
            )
            .unwrap(),
        );
        let (mut engine, mut host) = mounted(store);

        let outcome = engine.on_marker_activated(99, Instant::now(), &mut host);
        assert_eq!(
            outcome,
            SelectOutcome::NoOp {
                reason: NoOpReason::Invalid
            }
        );
        assert!(engine.selection().is_none());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_reselect_is_idempotent() {
        let (mut engine, mut host) = mounted(scenario_store());
        let t0 = Instant::now();

        engine.on_card_activated(0, t0, &mut host);
        let cards_first = render_cards(engine.store(), engine.selection());
        let markers_first = render_markers(engine.store(), engine.selection(), &Default::default());
        host.take_calls();

        let outcome = engine.on_marker_activated(0, ms(t0, 1000), &mut host);
        assert!(!outcome.is_changed());
        assert!(host.calls().is_empty());
        assert_eq!(render_cards(engine.store(), engine.selection()), cards_first);
        assert_eq!(
            render_markers(engine.store(), engine.selection(), &Default::default()),
            markers_first
        );
    }

    #[test]
    fn test_duplicate_activation_from_both_views_is_debounced() {
        let (mut engine, mut host) = mounted(scenario_store());
        let t0 = Instant::now();

        engine.on_marker_activated(0, t0, &mut host);
        let outcome = engine.on_card_activated(2, ms(t0, 150), &mut host);

        assert_eq!(
            outcome,
            SelectOutcome::NoOp {
                reason: NoOpReason::Debounced
            }
        );
        assert_eq!(engine.selection().selected(), Some(RecordId::new(0)));
        assert_eq!(host.viewport_calls().len(), 1);
    }

    #[test]
    fn test_switch_selection_patches_two_markers() {
        let (mut engine, mut host) = mounted(scenario_store());
        let t0 = Instant::now();

        engine.on_card_activated(0, t0, &mut host);
        host.take_calls();
        engine.on_card_activated(2, ms(t0, 400), &mut host);

        assert!(host.calls().contains(&HostCall::RenderMarkers {
            ids: vec![RecordId::new(0), RecordId::new(2)]
        }));
        assert_eq!(host.markers().iter().filter(|m| m.highlighted).count(), 1);
        assert_eq!(host.marker(RecordId::new(0)).unwrap().radius, 20.0);
        assert_eq!(host.marker(RecordId::new(2)).unwrap().radius, 7.5);
    }

    #[test]
    fn test_deselect_then_reselect_round_trip() {
        let (mut engine, mut host) = mounted(scenario_store());
        let t0 = Instant::now();

        engine.on_card_activated(1, t0, &mut host);
        let cards = host.cards().to_vec();
        let markers = host.markers();

        engine.deselect(ms(t0, 400), &mut host);
        assert!(host.cards().iter().all(|c| !c.highlighted));
        assert!(host.markers().iter().all(|m| !m.highlighted));
        assert_eq!(host.viewport_calls().len(), 1);

        engine.on_card_activated(1, ms(t0, 800), &mut host);
        assert_eq!(host.cards(), cards.as_slice());
        assert_eq!(host.markers(), markers);
    }

    #[test]
    fn test_startup_race_resolved_by_camera_retry() {
        let mut engine = SyncEngine::new(scenario_store(), &Config::default());
        let mut host = RecordingHost::not_ready();
        let t0 = Instant::now();

        engine.mount(&mut host);
        engine.on_card_activated(2, t0, &mut host);
        assert!(host.viewport_calls().is_empty());
        assert_eq!(engine.next_camera_deadline(), Some(ms(t0, 100)));

        host.set_ready(true);
        assert_eq!(engine.poll_camera(ms(t0, 100), &mut host), CameraPoll::Moved(RecordId::new(2)));
        assert_eq!(host.viewport_calls(), vec![(33.1192, -117.0864, 8)]);
        assert_eq!(engine.next_camera_deadline(), None);
    }

    #[test]
    fn test_empty_store() {
        let (mut engine, mut host) = mounted(Arc::new(RecordStore::empty()));
        assert!(!engine.on_card_activated(0, Instant::now(), &mut host).is_changed());
        assert!(host.calls().is_empty());
        assert!(host.cards().is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_views_agree_on_single_highlight(
            events in proptest::collection::vec((-2i64..5, 0u64..600, 0u8..3), 1..40)
        ) {
            let (mut engine, mut host) = mounted(scenario_store());
            let mut now = Instant::now();

            for (identifier, gap, kind) in events {
                now = ms(now, gap);
                match kind {
                    0 => engine.on_card_activated(identifier, now, &mut host),
                    1 => engine.on_marker_activated(identifier, now, &mut host),
                    _ => engine.deselect(now, &mut host),
                };

                let cards: Vec<RecordId> = host.cards().iter().filter(|c| c.highlighted).map(|c| c.id).collect();
                let markers: Vec<RecordId> = host.markers().iter().filter(|m| m.highlighted).map(|m| m.id).collect();
                let expected: Vec<RecordId> = engine.selection().selected().into_iter().collect();
                proptest::prop_assert_eq!(&cards, &expected);
                proptest::prop_assert_eq!(&markers, &expected);
            }
        }
    }
}
