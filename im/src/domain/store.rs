//! Immutable record store
//!
//! Built once at startup and shared read-only. Construction checks the
//! identifier and coordinate invariants so nothing downstream re-checks them.

use thiserror::Error;
use tracing::debug;

use super::record::{Record, RecordId};

/// Errors raised when records violate the store invariants
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Record at position {position} has identifier {id}")]
    IdMismatch { position: usize, id: RecordId },

    #[error("Record {id} has invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { id: RecordId, lat: f64, lon: f64 },
}

/// Ordered, identifier-indexed collection of records
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    max_capacity: f64,
}

impl RecordStore {
    /// Build a store, checking that ids are `0..N-1` in order with valid coordinates
    pub fn new(records: Vec<Record>) -> Result<Self, StoreError> {
        debug!(count = records.len(), "RecordStore::new: called");
        for (position, record) in records.iter().enumerate() {
            if record.id.index() != position {
                return Err(StoreError::IdMismatch { position, id: record.id });
            }
            if !record.coordinate.is_valid() {
                return Err(StoreError::InvalidCoordinate {
                    id: record.id,
                    lat: record.coordinate.lat,
                    lon: record.coordinate.lon,
                });
            }
        }

        let max_capacity = records
            .iter()
            .filter_map(Record::sizing_capacity)
            .fold(0.0_f64, f64::max);

        debug!(max_capacity, "RecordStore::new: store built");
        Ok(Self { records, max_capacity })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index())
    }

    pub fn contains(&self, id: RecordId) -> bool {
        id.index() < self.records.len()
    }

    /// Map a raw host identifier to a record id, rejecting malformed or out-of-range values
    pub fn resolve(&self, raw: i64) -> Option<RecordId> {
        RecordId::try_from(raw).ok().filter(|id| self.contains(*id))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Largest positive capacity in the store, or 0 if none
    pub fn max_capacity(&self) -> f64 {
        self.max_capacity
    }
}
