//! Domain types for incident records

mod record;
mod store;

pub use record::{Coordinate, DisplayField, FieldKind, Record, RecordId};
pub use store::{RecordStore, StoreError};
