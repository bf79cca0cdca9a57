//! Camera controller
//!
//! Turns selection changes into viewport commands. When the map surface is
//! not ready yet (first frame not drawn), the move is parked in a retry task
//! that the host event loop polls at `next_deadline()`. A newer selection
//! replaces the parked task, so a stale retry can never move the camera
//! after a later selection already did.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::domain::{Coordinate, RecordId, RecordStore};
use crate::host::Host;
use crate::selection::SelectionChange;

/// Zoom level used when focusing a record
pub const DEFAULT_FOCUS_ZOOM: u8 = 8;

/// Delay between readiness checks
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Retries after the initial attempt before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 50;

/// A parked camera move waiting for the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct RetryTask {
    pub generation: u64,
    pub target: RecordId,
    pub coordinate: Coordinate,
    pub retries: u32,
    pub deadline: Instant,
}

/// Result of polling the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPoll {
    /// Nothing pending or deadline not reached
    Idle,
    /// Viewport still not ready, rescheduled
    Waiting,
    /// Pending move issued
    Moved(RecordId),
    /// Retries exhausted, move dropped
    GaveUp(RecordId),
}

/// Issues recenter/zoom commands in response to selection changes
#[derive(Debug, Clone)]
pub struct CameraController {
    focus_zoom: u8,
    retry_interval: Duration,
    max_retries: u32,
    generation: u64,
    pending: Option<RetryTask>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_ZOOM, DEFAULT_RETRY_INTERVAL, DEFAULT_MAX_RETRIES)
    }
}

impl CameraController {
    pub fn new(focus_zoom: u8, retry_interval: Duration, max_retries: u32) -> Self {
        debug!(focus_zoom, ?retry_interval, max_retries, "CameraController::new: called");
        Self {
            focus_zoom,
            retry_interval,
            max_retries,
            generation: 0,
            pending: None,
        }
    }

    pub fn focus_zoom(&self) -> u8 {
        self.focus_zoom
    }

    /// Generation of the most recent move request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> Option<&RetryTask> {
        self.pending.as_ref()
    }

    /// When the host loop should call `poll` next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|task| task.deadline)
    }

    /// React to an accepted selection change
    pub fn on_selection<H: Host>(&mut self, change: SelectionChange, store: &RecordStore, now: Instant, host: &mut H) {
        debug!(?change, "CameraController::on_selection: called");

        if let Some(stale) = self.pending.take() {
            debug!(
                generation = stale.generation,
                target = %stale.target,
                "CameraController::on_selection: superseding pending move"
            );
        }

        let Some(target) = change.current.selected() else {
            debug!("CameraController::on_selection: deselected, camera stays put");
            return;
        };
        let Some(record) = store.get(target) else {
            return;
        };

        self.generation += 1;
        if host.viewport_ready() {
            self.issue(target, record.coordinate, host);
            return;
        }

        debug!(
            generation = self.generation,
            %target,
            "CameraController::on_selection: viewport not ready, scheduling retry"
        );
        self.pending = Some(RetryTask {
            generation: self.generation,
            target,
            coordinate: record.coordinate,
            retries: 0,
            deadline: now + self.retry_interval,
        });
    }

    /// Drive the pending retry task, if its deadline has passed
    pub fn poll<H: Host>(&mut self, now: Instant, host: &mut H) -> CameraPoll {
        let Some(task) = self.pending.as_mut() else {
            return CameraPoll::Idle;
        };
        if now < task.deadline {
            return CameraPoll::Idle;
        }

        task.retries += 1;
        let (target, coordinate, retries) = (task.target, task.coordinate, task.retries);
        debug!(generation = task.generation, %target, retries, "CameraController::poll: retrying");

        if host.viewport_ready() {
            self.pending = None;
            self.issue(target, coordinate, host);
            return CameraPoll::Moved(target);
        }

        if retries >= self.max_retries {
            warn!(
                %target,
                retries,
                "Viewport never became ready, dropping camera move"
            );
            self.pending = None;
            return CameraPoll::GaveUp(target);
        }

        task.deadline = now + self.retry_interval;
        CameraPoll::Waiting
    }

    fn issue<H: Host>(&self, target: RecordId, coordinate: Coordinate, host: &mut H) {
        info!(%target, %coordinate, zoom = self.focus_zoom, "Focusing map on record");
        host.set_map_viewport(coordinate.lat, coordinate.lon, self.focus_zoom);
    }
}
