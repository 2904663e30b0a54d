//! Records - attribute maps as stored in a coverage store.
//!
//! A [`Record`] is schema-less on its own: the owning store decides which
//! attributes are legal. [`FeatureRecord`] and [`ArchiveRecord`] are the
//! fixed projections the archive step reads and writes, named through a
//! [`FieldMap`].
//!
//! ## Example
//!
//! ```ignore
//! use coverage_swap::{FieldValue, Record};
//!
//! let record = Record::new()
//!     .with("UTProvCode", "ACME")
//!     .with("MAXADDOWN", 25.0);
//!
//! assert_eq!(record.get("UTProvCode").as_text(), Some("ACME"));
//! assert!(record.get("Identifier").is_null());
//! ```

mod feature;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use feature::{ArchiveRecord, FeatureRecord, FieldMap};

static NULL: FieldValue = FieldValue::Null;

/// A single attribute value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    /// Opaque shape bytes (WKB by convention). Never inspected.
    Geometry(#[serde(with = "geometry_bytes")] Vec<u8>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is not parsed here; see
    /// [`crate::speed_tier::classify_value`] for the coercing variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Double(value) => Some(*value),
            FieldValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Double(_) => "double",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Geometry(_) => "geometry",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "<null>"),
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Double(value) => write!(f, "{}", value),
            FieldValue::Timestamp(at) => write!(f, "{}", at.to_rfc3339()),
            FieldValue::Geometry(bytes) => write!(f, "<geometry {} bytes>", bytes.len()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One row of a store: attribute name to value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(attribute, value);
        self
    }

    /// Value of `attribute`, or `Null` when the record does not carry it.
    pub fn get(&self, attribute: &str) -> &FieldValue {
        self.fields.get(attribute).unwrap_or(&NULL)
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(attribute.into(), value.into());
    }

    pub fn remove(&mut self, attribute: &str) -> Option<FieldValue> {
        self.fields.remove(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.fields.contains_key(attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of this record restricted to `attributes`. Attributes the record
    /// does not carry come back as explicit `Null`s.
    pub fn project(&self, attributes: &[&str]) -> Record {
        let fields = attributes
            .iter()
            .map(|name| (name.to_string(), self.get(name).clone()))
            .collect();
        Record { fields }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Record { fields }
    }
}

/// Geometry bytes travel as base64 text so text encodings stay readable.
mod geometry_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
