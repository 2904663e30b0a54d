//! Run configuration, built in code or loaded from TOML.
//!
//! ```toml
//! new_dataset = "acme_2024q2"
//! primary_store = "ubb"
//! secondary_stores = ["sgid"]
//! archive_store = "ubb_archive"
//! data_round = "2024 Q2"
//! provider_field = "UTProvCode"
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SwapError;
use crate::record::FieldMap;

pub const DEFAULT_PROVIDER_FIELD: &str = "UTProvCode";

fn default_provider_field() -> String {
    DEFAULT_PROVIDER_FIELD.to_string()
}

fn default_archive_enabled() -> bool {
    true
}

/// Everything one swap-and-archive run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Complete replacement dataset for one provider.
    pub new_dataset: String,
    /// Authoritative store, archived before replacement.
    pub primary_store: String,
    /// Further stores replaced after the primary, in this order, never archived.
    #[serde(default)]
    pub secondary_stores: Vec<String>,
    #[serde(default)]
    pub archive_store: Option<String>,
    /// Label stamped on archived rows: when the snapshot was taken.
    #[serde(default)]
    pub data_round: String,
    #[serde(default = "default_provider_field")]
    pub provider_field: String,
    /// Archive the primary store's outgoing rows.
    #[serde(default = "default_archive_enabled")]
    pub archive_enabled: bool,
    #[serde(default)]
    pub fields: FieldMap,
}

impl RunConfig {
    /// A run replacing `primary_store` from `new_dataset`, with archival
    /// enabled but no archive store set yet.
    pub fn new(new_dataset: impl Into<String>, primary_store: impl Into<String>) -> Self {
        Self {
            new_dataset: new_dataset.into(),
            primary_store: primary_store.into(),
            secondary_stores: Vec::new(),
            archive_store: None,
            data_round: String::new(),
            provider_field: default_provider_field(),
            archive_enabled: default_archive_enabled(),
            fields: FieldMap::default(),
        }
    }

    pub fn with_secondary(mut self, store: impl Into<String>) -> Self {
        self.secondary_stores.push(store.into());
        self
    }

    pub fn with_archive(mut self, store: impl Into<String>, data_round: impl Into<String>) -> Self {
        self.archive_store = Some(store.into());
        self.data_round = data_round.into();
        self.archive_enabled = true;
        self
    }

    pub fn without_archive(mut self) -> Self {
        self.archive_enabled = false;
        self
    }

    pub fn with_provider_field(mut self, field: impl Into<String>) -> Self {
        self.provider_field = field.into();
        self
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, SwapError> {
        toml::from_str(text).map_err(|e| SwapError::Configuration(format!("invalid run config: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SwapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SwapError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Attribute names for the run, with the provider attribute taken from
    /// `provider_field`.
    pub fn field_map(&self) -> FieldMap {
        FieldMap {
            provider_code: self.provider_field.clone(),
            ..self.fields.clone()
        }
    }

    /// Every store the run reads or writes, in processing order.
    pub fn referenced_stores(&self) -> Vec<&str> {
        let mut stores = vec![self.new_dataset.as_str(), self.primary_store.as_str()];
        if self.archive_enabled {
            if let Some(archive) = &self.archive_store {
                stores.push(archive);
            }
        }
        stores.extend(self.secondary_stores.iter().map(String::as_str));
        stores
    }

    /// Replacement targets: the primary, then each secondary.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_store.as_str())
            .chain(self.secondary_stores.iter().map(String::as_str))
    }

    /// Internal consistency, independent of any store.
    pub fn validate(&self) -> Result<(), SwapError> {
        let blank = |what: &str| SwapError::Configuration(format!("{} must not be empty", what));
        if self.new_dataset.trim().is_empty() {
            return Err(blank("new_dataset"));
        }
        if self.primary_store.trim().is_empty() {
            return Err(blank("primary_store"));
        }
        if self.provider_field.trim().is_empty() {
            return Err(blank("provider_field"));
        }
        if self.secondary_stores.iter().any(|s| s.trim().is_empty()) {
            return Err(blank("secondary store name"));
        }
        let provider_code = &self.fields.provider_code;
        if provider_code != &self.provider_field && provider_code != DEFAULT_PROVIDER_FIELD {
            return Err(SwapError::Configuration(format!(
                "provider_field {} conflicts with fields.provider_code {}",
                self.provider_field, provider_code
            )));
        }

        let mut targets = BTreeSet::new();
        for target in self.targets() {
            if !targets.insert(target) {
                return Err(SwapError::Configuration(format!(
                    "{} is listed as a target more than once",
                    target
                )));
            }
        }
        if targets.contains(self.new_dataset.as_str()) {
            return Err(SwapError::Configuration(format!(
                "new dataset {} cannot also be a target store",
                self.new_dataset
            )));
        }

        if self.archive_enabled {
            let archive = match self.archive_store.as_deref() {
                Some(archive) if !archive.trim().is_empty() => archive,
                _ => {
                    return Err(SwapError::Configuration(
                        "archival is enabled but no archive store is set".into(),
                    ))
                }
            };
            if archive == self.new_dataset || targets.contains(archive) {
                return Err(SwapError::Configuration(format!(
                    "archive store {} cannot also be the new dataset or a target",
                    archive
                )));
            }
            if self.data_round.trim().is_empty() {
                return Err(blank("data_round"));
            }
        }
        Ok(())
    }
}
