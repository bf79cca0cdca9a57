//! IncidentMap - linked incident list and map
//!
//! Renders a dataset of geolocated incident records as two views that share
//! one selection: a scrollable card list and a map with one marker per
//! record. Activating a card or a marker highlights both, scrolls the card
//! into view and focuses the map on the record.
//!
//! # Core Concepts
//!
//! - **One writer**: only the [`selection::SelectionController`] changes the selection
//! - **One fan-out**: the [`engine::SyncEngine`] hands every accepted change to
//!   both renderers and the camera in the same call
//! - **Pure renderers**: view-models are functions of (store, selection)
//! - **Cancellable camera retries**: a newer selection replaces a parked move
//!
//! # Modules
//!
//! - [`domain`] - Records and the immutable record store
//! - [`loader`] - Dataset loading and field classification
//! - [`selection`] - Selection state and controller
//! - [`render`] - List and map view-models
//! - [`camera`] - Viewport commands with bounded retry
//! - [`engine`] - The synchronization engine
//! - [`host`] - Host interface and a recording host
//! - [`snapshot`] - Headless scripted runs
//! - [`tui`] - Terminal host
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod camera;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod host;
pub mod loader;
pub mod render;
pub mod selection;
pub mod snapshot;
pub mod tui;

// Re-export commonly used types
pub use camera::{CameraController, CameraPoll, RetryTask};
pub use config::Config;
pub use domain::{Coordinate, DisplayField, FieldKind, Record, RecordId, RecordStore, StoreError};
pub use engine::SyncEngine;
pub use host::{Host, HostCall, RecordingHost};
pub use loader::{DatasetRow, LoadError, build_store, load_dataset, load_or_fallback};
pub use render::{CardViewModel, MapRenderer, MarkerColor, MarkerViewModel, RadiusScale};
pub use selection::{NoOpReason, SelectOutcome, SelectionChange, SelectionController, SelectionState, Source};
pub use snapshot::{Snapshot, run_snapshot};
