//! Table - schema plus rows, shared by the bundled backends.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{AttributeDef, Predicate, SchemaCheck, StoreError};
use crate::record::Record;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Table {
    pub(crate) schema: Vec<AttributeDef>,
    pub(crate) rows: Vec<Record>,
}

impl Table {
    pub(crate) fn new(store: &str, schema: Vec<AttributeDef>) -> Result<Self, StoreError> {
        let mut seen = BTreeSet::new();
        for def in &schema {
            if !seen.insert(def.name.as_str()) {
                return Err(StoreError::SchemaMismatch {
                    store: store.to_string(),
                    detail: format!("attribute {} declared twice", def.name),
                });
            }
        }
        Ok(Self {
            schema,
            rows: Vec::new(),
        })
    }

    fn has_attribute(&self, attribute: &str) -> bool {
        self.schema.iter().any(|def| def.name == attribute)
    }

    fn attribute_names(&self) -> BTreeSet<&str> {
        self.schema.iter().map(|def| def.name.as_str()).collect()
    }

    fn require_attribute(&self, store: &str, attribute: &str) -> Result<(), StoreError> {
        if self.has_attribute(attribute) {
            Ok(())
        } else {
            Err(StoreError::UnknownAttribute {
                store: store.to_string(),
                attribute: attribute.to_string(),
            })
        }
    }

    fn require_predicate(&self, store: &str, predicate: &Predicate) -> Result<(), StoreError> {
        match predicate.attribute() {
            Some(attribute) => self.require_attribute(store, attribute),
            None => Ok(()),
        }
    }

    fn check_record(&self, store: &str, record: &Record) -> Result<(), StoreError> {
        match record.attributes().find(|name| !self.has_attribute(name)) {
            Some(name) => Err(StoreError::SchemaMismatch {
                store: store.to_string(),
                detail: format!("record carries undeclared attribute {}", name),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn add_attribute(&mut self, store: &str, attribute: AttributeDef) -> Result<(), StoreError> {
        if self.has_attribute(&attribute.name) {
            return Err(StoreError::SchemaMismatch {
                store: store.to_string(),
                detail: format!("attribute {} already exists", attribute.name),
            });
        }
        self.schema.push(attribute);
        Ok(())
    }

    pub(crate) fn select(
        &self,
        store: &str,
        attributes: Option<&[&str]>,
        predicate: &Predicate,
    ) -> Result<Vec<Record>, StoreError> {
        self.require_predicate(store, predicate)?;
        if let Some(attributes) = attributes {
            for attribute in attributes {
                self.require_attribute(store, attribute)?;
            }
        }

        Ok(self
            .rows
            .iter()
            .filter(|row| predicate.matches(row))
            .map(|row| match attributes {
                Some(attributes) => row.project(attributes),
                None => row.clone(),
            })
            .collect())
    }

    /// All-or-nothing: rows are updated on a copy and swapped in only when
    /// every result fits the schema.
    pub(crate) fn update_each(
        &mut self,
        store: &str,
        update: &mut dyn FnMut(&mut Record),
    ) -> Result<usize, StoreError> {
        let mut rows = self.rows.clone();
        for row in rows.iter_mut() {
            update(row);
            self.check_record(store, row)?;
        }
        let visited = rows.len();
        self.rows = rows;
        Ok(visited)
    }

    pub(crate) fn delete_where(&mut self, store: &str, predicate: &Predicate) -> Result<usize, StoreError> {
        self.require_predicate(store, predicate)?;
        let before = self.rows.len();
        self.rows.retain(|row| !predicate.matches(row));
        Ok(before - self.rows.len())
    }

    pub(crate) fn insert_all(&mut self, store: &str, records: Vec<Record>) -> Result<usize, StoreError> {
        for record in &records {
            self.check_record(store, record)?;
        }
        let inserted = records.len();
        self.rows.extend(records);
        Ok(inserted)
    }

    pub(crate) fn append_from(
        &mut self,
        target: &str,
        source_name: &str,
        source: &Table,
        check: SchemaCheck,
    ) -> Result<usize, StoreError> {
        let target_names = self.attribute_names();
        let source_names = source.attribute_names();

        if check == SchemaCheck::Test && target_names != source_names {
            let missing: Vec<&str> = source_names.difference(&target_names).copied().collect();
            let extra: Vec<&str> = target_names.difference(&source_names).copied().collect();
            return Err(StoreError::SchemaMismatch {
                store: target.to_string(),
                detail: format!(
                    "append from {} needs matching schemas (absent from target: {:?}, absent from source: {:?})",
                    source_name, missing, extra
                ),
            });
        }

        let shared: Vec<&str> = target_names.intersection(&source_names).copied().collect();
        let appended: Vec<Record> = source
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(name, _)| shared.contains(name))
                    .map(|(name, value)| (name, value.clone()))
                    .collect()
            })
            .collect();

        let count = appended.len();
        self.rows.extend(appended);
        Ok(count)
    }
}
