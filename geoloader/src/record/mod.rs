//! Point records and field extraction
//!
//! A [`Record`] is an opaque JSON object delivered by the remote endpoint.
//! The layer only ever looks at three of its fields, named by
//! [`RecordFields`]: the identifier and the two coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::geo::LatLng;

/// Default name of the identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Default name of the latitude field.
pub const DEFAULT_LAT_FIELD: &str = "lat";

/// Default name of the longitude field.
pub const DEFAULT_LNG_FIELD: &str = "lng";

/// Reasons a record cannot be stored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// Element of the response array is not a JSON object.
    #[error("record is not a JSON object: {0}")]
    NotAnObject(String),

    /// Identifier field is missing, null, or not a scalar.
    #[error("record has no usable '{field}' identifier")]
    MissingId { field: String },

    /// Coordinate field is missing or not numeric.
    #[error("record {id} has no numeric '{field}' coordinate")]
    InvalidCoordinate { id: RecordId, field: String },
}

/// Identity of a record, normalised to a string key.
///
/// JSON strings are used verbatim; numbers and booleans use their JSON text,
/// so `1` and `"1"` identify the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Create an identifier from its key text.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Normalise a JSON scalar into an identifier.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// One data item delivered by the endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wrap an existing JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Convert an arbitrary JSON value, rejecting anything but objects.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RecordError::NotAnObject(truncate(&other.to_string()))),
        }
    }

    /// Look up a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Look up a field as a number.
    ///
    /// Numeric strings are accepted, matching how map libraries coerce
    /// coordinate values.
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        let value = match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// All fields of the record.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Field names used to read identity and position from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    /// Identifier field name.
    pub id: String,
    /// Latitude field name.
    pub lat: String,
    /// Longitude field name.
    pub lng: String,
}

impl Default for RecordFields {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_FIELD.to_string(),
            lat: DEFAULT_LAT_FIELD.to_string(),
            lng: DEFAULT_LNG_FIELD.to_string(),
        }
    }
}

impl RecordFields {
    /// Extract the record's identifier.
    pub fn id_of(&self, record: &Record) -> Result<RecordId, RecordError> {
        record
            .get(&self.id)
            .and_then(RecordId::from_value)
            .ok_or_else(|| RecordError::MissingId {
                field: self.id.clone(),
            })
    }

    /// Extract the record's position.
    pub fn position_of(&self, id: &RecordId, record: &Record) -> Result<LatLng, RecordError> {
        let lat = record
            .get_f64(&self.lat)
            .ok_or_else(|| RecordError::InvalidCoordinate {
                id: id.clone(),
                field: self.lat.clone(),
            })?;
        let lng = record
            .get_f64(&self.lng)
            .ok_or_else(|| RecordError::InvalidCoordinate {
                id: id.clone(),
                field: self.lng.clone(),
            })?;
        Ok(LatLng::new(lat, lng))
    }

    /// Extract identifier and position together.
    pub fn identify(&self, record: &Record) -> Result<(RecordId, LatLng), RecordError> {
        let id = self.id_of(record)?;
        let position = self.position_of(&id, record)?;
        Ok((id, position))
    }
}

fn truncate(s: &str) -> String {
    const MAX: usize = 64;
    match s.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
