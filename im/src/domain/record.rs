//! Incident record types
//!
//! Records are produced once by the dataset loader and never mutated.
//! Display fields are tagged with their kind up front so renderers never
//! have to look at raw column names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable record identifier, equal to the record's position in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(usize);

impl RecordId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for RecordId {
    type Error = i64;

    /// Raw identifiers from the host are signed; negative values are malformed
    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        usize::try_from(raw).map(Self).map_err(|_| raw)
    }
}

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside [-90, 90] x [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// How a display field should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Date,
    Link,
    NumericEmphasis,
}

/// A labelled value shown on a record's card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayField {
    pub label: String,
    pub value: String,
    pub kind: FieldKind,
}

impl DisplayField {
    pub fn new(label: impl Into<String>, value: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind,
        }
    }

    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, FieldKind::Text)
    }

    pub fn date(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, FieldKind::Date)
    }

    pub fn link(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, FieldKind::Link)
    }

    pub fn numeric(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, FieldKind::NumericEmphasis)
    }
}

/// One incident entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Location name, used as card heading and map label
    pub title: String,
    pub coordinate: Coordinate,
    pub fields: Vec<DisplayField>,
    /// Only used for marker sizing
    pub capacity: Option<f64>,
}

impl Record {
    pub fn new(id: RecordId, title: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id,
            title: title.into(),
            coordinate,
            fields: Vec::new(),
            capacity: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<DisplayField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Capacity usable for sizing: present, finite and positive
    pub fn sizing_capacity(&self) -> Option<f64> {
        self.capacity.filter(|c| c.is_finite() && *c > 0.0)
    }
}
