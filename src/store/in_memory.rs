//! InMemoryStore - HashMap-backed store for testing and embedding.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::table::Table;
use super::{AttributeDef, Predicate, RecordIter, SchemaCheck, Store, StoreError};
use crate::record::Record;

/// In-memory store keyed by store name.
///
/// Clone-friendly via Arc: clones share the same tables. `scan` returns a
/// snapshot, so the caller may mutate while iterating.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store and fill it in one call.
    pub fn seed(
        &self,
        name: &str,
        schema: Vec<AttributeDef>,
        records: Vec<Record>,
    ) -> Result<usize, StoreError> {
        self.create(name, schema)?;
        self.insert_all(name, records)
    }

    /// Every record of a store, in insertion order.
    pub fn records(&self, name: &str) -> Result<Vec<Record>, StoreError> {
        let tables = self.read("records")?;
        Ok(Self::table(&tables, name)?.rows.clone())
    }

    /// Names of all stores, sorted.
    pub fn store_names(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.read("store_names")?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, HashMap<String, Table>>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, HashMap<String, Table>>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn table<'t>(tables: &'t HashMap<String, Table>, name: &str) -> Result<&'t Table, StoreError> {
        tables
            .get(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn table_mut<'t>(
        tables: &'t mut HashMap<String, Table>,
        name: &str,
    ) -> Result<&'t mut Table, StoreError> {
        tables
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

impl Store for InMemoryStore {
    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.read("exists")?.contains_key(name))
    }

    fn list_attributes(&self, name: &str) -> Result<Vec<AttributeDef>, StoreError> {
        let tables = self.read("list_attributes")?;
        Ok(Self::table(&tables, name)?.schema.clone())
    }

    fn add_attribute(&self, name: &str, attribute: AttributeDef) -> Result<(), StoreError> {
        let mut tables = self.write("add_attribute")?;
        Self::table_mut(&mut tables, name)?.add_attribute(name, attribute)
    }

    fn create(&self, name: &str, schema: Vec<AttributeDef>) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        let mut tables = self.write("create")?;
        if tables.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        tables.insert(name.to_string(), Table::new(name, schema)?);
        Ok(())
    }

    fn drop_store(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.write("drop_store")?.remove(name).is_some())
    }

    fn scan<'a>(
        &'a self,
        name: &str,
        attributes: Option<&[&str]>,
        predicate: &Predicate,
    ) -> Result<RecordIter<'a>, StoreError> {
        let tables = self.read("scan")?;
        let rows = Self::table(&tables, name)?.select(name, attributes, predicate)?;
        Ok(Box::new(rows.into_iter().map(Ok::<Record, StoreError>)))
    }

    fn update_each(
        &self,
        name: &str,
        update: &mut dyn FnMut(&mut Record),
    ) -> Result<usize, StoreError> {
        let mut tables = self.write("update_each")?;
        Self::table_mut(&mut tables, name)?.update_each(name, update)
    }

    fn delete_where(&self, name: &str, predicate: &Predicate) -> Result<usize, StoreError> {
        let mut tables = self.write("delete_where")?;
        Self::table_mut(&mut tables, name)?.delete_where(name, predicate)
    }

    fn insert_all(&self, name: &str, records: Vec<Record>) -> Result<usize, StoreError> {
        let mut tables = self.write("insert_all")?;
        Self::table_mut(&mut tables, name)?.insert_all(name, records)
    }

    fn bulk_append(
        &self,
        source: &str,
        target: &str,
        check: SchemaCheck,
    ) -> Result<usize, StoreError> {
        let mut tables = self.write("bulk_append")?;
        let source_table = Self::table(&tables, source)?.clone();
        Self::table_mut(&mut tables, target)?.append_from(target, source, &source_table, check)
    }
}
