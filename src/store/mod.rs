//! Stores - the collaborator that owns coverage records.
//!
//! The workflow never touches storage directly; it talks to a [`Store`],
//! addressing each logical store (new dataset, primary, secondaries,
//! archive, scratch) by name. Filters are parameterized [`Predicate`]s, so
//! provider names are never spliced into query text.
//!
//! ## Example
//!
//! ```ignore
//! use coverage_swap::{AttributeDef, AttributeType, InMemoryStore, Predicate, Record, Store};
//!
//! let store = InMemoryStore::new();
//! store.create("ubb", vec![AttributeDef::text("UTProvCode", 50)])?;
//! store.insert_all("ubb", vec![Record::new().with("UTProvCode", "ACME")])?;
//!
//! let removed = store.delete_where("ubb", &Predicate::eq("UTProvCode", "ACME"))?;
//! assert_eq!(removed, 1);
//! ```

mod file;
mod in_memory;
mod predicate;
mod scratch;
mod store;
mod table;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use file::{Encoding, FileStore};
pub use in_memory::InMemoryStore;
pub use predicate::Predicate;
pub use scratch::ScratchStore;
pub use store::{RecordIter, Store};

/// Declared type of an attribute. Stores treat it as schema metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Text,
    Integer,
    Double,
    Date,
    Geometry,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::Text => "TEXT",
            AttributeType::Integer => "LONG",
            AttributeType::Double => "DOUBLE",
            AttributeType::Date => "DATE",
            AttributeType::Geometry => "GEOMETRY",
        };
        f.write_str(name)
    }
}

/// One entry of a store schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub kind: AttributeType,
    /// Capacity in characters; text attributes only.
    #[serde(default)]
    pub length: Option<u32>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            name: name.into(),
            kind,
            length: None,
        }
    }

    pub fn text(name: impl Into<String>, length: u32) -> Self {
        Self {
            name: name.into(),
            kind: AttributeType::Text,
            length: Some(length),
        }
    }
}

/// How `bulk_append` treats schema differences between source and target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaCheck {
    /// Source and target must declare the same attribute names.
    Test,
    /// Attributes are matched by name; source attributes the target lacks
    /// are dropped.
    #[default]
    NoTest,
}

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store not found: {0}")]
    NotFound(String),

    #[error("store already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid store name: {0:?}")]
    InvalidName(String),

    #[error("unknown attribute {attribute} on {store}")]
    UnknownAttribute { store: String, attribute: String },

    #[error("schema mismatch on {store}: {detail}")]
    SchemaMismatch { store: String, detail: String },

    /// A lock guarding the store was poisoned or could not be taken.
    #[error("store lock unavailable during {0}")]
    LockPoisoned(&'static str),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(String),

    /// Anything else a backend reports.
    #[error("store backend error: {0}")]
    Backend(String),
}
