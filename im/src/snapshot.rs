//! Headless engine runs
//!
//! Feeds a scripted sequence of activations through the engine against a
//! `RecordingHost` and captures what the host ended up showing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::domain::{RecordId, RecordStore};
use crate::engine::SyncEngine;
use crate::host::{HostCall, RecordingHost};
use crate::render::{CardViewModel, MarkerViewModel};
use crate::selection::{SelectOutcome, Source};

/// One scripted activation and what the engine did with it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotEvent {
    pub source: Source,
    pub identifier: i64,
    #[serde(flatten)]
    pub outcome: SelectOutcome,
}

/// Final host state after a scripted run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub events: Vec<SnapshotEvent>,
    pub selected: Option<RecordId>,
    pub cards: Vec<CardViewModel>,
    pub markers: Vec<MarkerViewModel>,
    pub calls: Vec<HostCall>,
}

/// Run the activations in order, spacing them just past the debounce window
pub fn run_snapshot(store: Arc<RecordStore>, config: &Config, identifiers: &[i64], source: Source) -> Snapshot {
    debug!(?identifiers, %source, "run_snapshot: called");
    let mut engine = SyncEngine::new(store, config);
    let mut host = RecordingHost::new();
    engine.mount(&mut host);

    let spacing = config.selection.debounce() + Duration::from_millis(1);
    let start = Instant::now();
    let events = identifiers
        .iter()
        .enumerate()
        .map(|(step, &identifier)| {
            let now = start + spacing * step as u32;
            let outcome = match source {
                Source::List => engine.on_card_activated(identifier, now, &mut host),
                Source::Map => engine.on_marker_activated(identifier, now, &mut host),
            };
            SnapshotEvent {
                source,
                identifier,
                outcome,
            }
        })
        .collect();

    Snapshot {
        events,
        selected: engine.selection().selected(),
        cards: host.cards().to_vec(),
        markers: host.markers(),
        calls: host.calls().to_vec(),
    }
}
