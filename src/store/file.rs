//! FileStore - one file per store under a root directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::table::Table;
use super::{AttributeDef, Predicate, RecordIter, SchemaCheck, Store, StoreError};
use crate::record::Record;

/// On-disk encoding of a store file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Pretty-printed JSON, `<name>.json`.
    #[default]
    Json,
    /// bitcode binary, `<name>.bin`.
    Bitcode,
}

impl Encoding {
    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Bitcode => "bin",
        }
    }

    fn encode(self, table: &Table) -> Result<Vec<u8>, StoreError> {
        match self {
            Encoding::Json => {
                serde_json::to_vec_pretty(table).map_err(|e| StoreError::Serde(e.to_string()))
            }
            Encoding::Bitcode => {
                bitcode::serialize(table).map_err(|e| StoreError::Serde(e.to_string()))
            }
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<Table, StoreError> {
        match self {
            Encoding::Json => {
                serde_json::from_slice(bytes).map_err(|e| StoreError::Serde(e.to_string()))
            }
            Encoding::Bitcode => {
                bitcode::deserialize(bytes).map_err(|e| StoreError::Serde(e.to_string()))
            }
        }
    }
}

/// Directory-backed store. Every operation reads the store file, applies the
/// change in memory and writes it back through a temp file and rename, so a
/// crash mid-write leaves the previous contents intact.
///
/// Operations are serialized within one process; nothing guards against a
/// second process working on the same directory.
pub struct FileStore {
    root: PathBuf,
    encoding: Encoding,
    guard: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a store directory.
    pub fn open(root: impl Into<PathBuf>, encoding: Encoding) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            encoding,
            guard: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", name, self.encoding.extension())))
    }

    fn load(&self, name: &str) -> Result<Table, StoreError> {
        let path = self.path(name)?;
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let bytes = fs::read(&path)?;
        self.encoding.decode(&bytes)
    }

    fn save(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        let path = self.path(name)?;
        let staging = path.with_extension(format!("{}.tmp", self.encoding.extension()));
        fs::write(&staging, self.encoding.encode(table)?)?;
        fs::rename(&staging, &path)?;
        debug!(store = name, rows = table.rows.len(), path = %path.display(), "store file written");
        Ok(())
    }

    fn lock(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.guard
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn modify<T>(
        &self,
        name: &str,
        operation: &'static str,
        change: impl FnOnce(&mut Table) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock(operation)?;
        let mut table = self.load(name)?;
        let result = change(&mut table)?;
        self.save(name, &table)?;
        Ok(result)
    }
}

impl Store for FileStore {
    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let _guard = self.lock("exists")?;
        Ok(self.path(name)?.exists())
    }

    fn list_attributes(&self, name: &str) -> Result<Vec<AttributeDef>, StoreError> {
        let _guard = self.lock("list_attributes")?;
        Ok(self.load(name)?.schema)
    }

    fn add_attribute(&self, name: &str, attribute: AttributeDef) -> Result<(), StoreError> {
        self.modify(name, "add_attribute", |table| table.add_attribute(name, attribute))
    }

    fn create(&self, name: &str, schema: Vec<AttributeDef>) -> Result<(), StoreError> {
        let _guard = self.lock("create")?;
        if self.path(name)?.exists() {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        self.save(name, &Table::new(name, schema)?)
    }

    fn drop_store(&self, name: &str) -> Result<bool, StoreError> {
        let _guard = self.lock("drop_store")?;
        let path = self.path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn scan<'a>(
        &'a self,
        name: &str,
        attributes: Option<&[&str]>,
        predicate: &Predicate,
    ) -> Result<RecordIter<'a>, StoreError> {
        let _guard = self.lock("scan")?;
        let rows = self.load(name)?.select(name, attributes, predicate)?;
        Ok(Box::new(rows.into_iter().map(Ok::<Record, StoreError>)))
    }

    fn update_each(
        &self,
        name: &str,
        update: &mut dyn FnMut(&mut Record),
    ) -> Result<usize, StoreError> {
        self.modify(name, "update_each", |table| table.update_each(name, update))
    }

    fn delete_where(&self, name: &str, predicate: &Predicate) -> Result<usize, StoreError> {
        self.modify(name, "delete_where", |table| table.delete_where(name, predicate))
    }

    fn insert_all(&self, name: &str, records: Vec<Record>) -> Result<usize, StoreError> {
        self.modify(name, "insert_all", |table| table.insert_all(name, records))
    }

    fn bulk_append(
        &self,
        source: &str,
        target: &str,
        check: SchemaCheck,
    ) -> Result<usize, StoreError> {
        let _guard = self.lock("bulk_append")?;
        let source_table = self.load(source)?;
        let mut target_table = self.load(target)?;
        let appended = target_table.append_from(target, source, &source_table, check)?;
        self.save(target, &target_table)?;
        Ok(appended)
    }
}
