use std::sync::Mutex;

use coverage_swap::store::{
    AttributeDef, InMemoryStore, Predicate, RecordIter, SchemaCheck, Store, StoreError,
};
use coverage_swap::Record;

/// Store operations a [`FaultyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Insert,
    Delete,
    BulkAppend,
}

/// InMemoryStore wrapper that fails one kind of write against one store.
pub struct FaultyStore {
    pub inner: InMemoryStore,
    fault: Mutex<Option<(Fault, String)>>,
}

impl FaultyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            fault: Mutex::new(None),
        }
    }

    pub fn fail(self, fault: Fault, store: &str) -> Self {
        *self.fault.lock().unwrap() = Some((fault, store.to_string()));
        self
    }

    fn check(&self, fault: Fault, store: &str) -> Result<(), StoreError> {
        match &*self.fault.lock().unwrap() {
            Some((armed, target)) if *armed == fault && target == store => Err(
                StoreError::Backend(format!("injected {:?} failure on {}", fault, store)),
            ),
            _ => Ok(()),
        }
    }
}

impl Store for FaultyStore {
    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.exists(name)
    }

    fn list_attributes(&self, name: &str) -> Result<Vec<AttributeDef>, StoreError> {
        self.inner.list_attributes(name)
    }

    fn add_attribute(&self, name: &str, attribute: AttributeDef) -> Result<(), StoreError> {
        self.inner.add_attribute(name, attribute)
    }

    fn create(&self, name: &str, schema: Vec<AttributeDef>) -> Result<(), StoreError> {
        self.inner.create(name, schema)
    }

    fn drop_store(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.drop_store(name)
    }

    fn scan<'a>(
        &'a self,
        name: &str,
        attributes: Option<&[&str]>,
        predicate: &Predicate,
    ) -> Result<RecordIter<'a>, StoreError> {
        self.inner.scan(name, attributes, predicate)
    }

    fn update_each(
        &self,
        name: &str,
        update: &mut dyn FnMut(&mut Record),
    ) -> Result<usize, StoreError> {
        self.inner.update_each(name, update)
    }

    fn delete_where(&self, name: &str, predicate: &Predicate) -> Result<usize, StoreError> {
        self.check(Fault::Delete, name)?;
        self.inner.delete_where(name, predicate)
    }

    fn insert_all(&self, name: &str, records: Vec<Record>) -> Result<usize, StoreError> {
        self.check(Fault::Insert, name)?;
        self.inner.insert_all(name, records)
    }

    fn bulk_append(
        &self,
        source: &str,
        target: &str,
        check: SchemaCheck,
    ) -> Result<usize, StoreError> {
        self.check(Fault::BulkAppend, target)?;
        self.inner.bulk_append(source, target, check)
    }
}
