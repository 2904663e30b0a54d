//! Store - abstract record storage addressed by store name.

use super::{AttributeDef, Predicate, SchemaCheck, StoreError};
use crate::record::{FieldValue, Record};

const NO_ATTRIBUTES: &[&str] = &[];

/// Records yielded by [`Store::scan`].
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record, StoreError>> + 'a>;

/// Abstract storage for named record collections.
///
/// Implementations may stream from `scan`, so callers drain the iterator
/// before mutating the same store. Every method is synchronous; nothing is
/// retried.
pub trait Store: Send + Sync {
    /// Whether a store with this name exists.
    fn exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Declared schema of a store, in declaration order.
    fn list_attributes(&self, name: &str) -> Result<Vec<AttributeDef>, StoreError>;

    /// Add an attribute to an existing store. Existing records read it as null.
    fn add_attribute(&self, name: &str, attribute: AttributeDef) -> Result<(), StoreError>;

    /// Create an empty store. Fails if the name is taken.
    fn create(&self, name: &str, schema: Vec<AttributeDef>) -> Result<(), StoreError>;

    /// Delete a store and its records. Returns true if it existed.
    fn drop_store(&self, name: &str) -> Result<bool, StoreError>;

    /// Records matching `predicate`, projected to `attributes` (all when `None`).
    fn scan<'a>(
        &'a self,
        name: &str,
        attributes: Option<&[&str]>,
        predicate: &Predicate,
    ) -> Result<RecordIter<'a>, StoreError>;

    /// Apply `update` to every record in place. Returns the number of records
    /// visited. Attributes written must exist on the schema.
    fn update_each(
        &self,
        name: &str,
        update: &mut dyn FnMut(&mut Record),
    ) -> Result<usize, StoreError>;

    /// Remove every record matching `predicate`. Returns the number removed.
    fn delete_where(&self, name: &str, predicate: &Predicate) -> Result<usize, StoreError>;

    /// Append `records`. Returns the number inserted.
    fn insert_all(&self, name: &str, records: Vec<Record>) -> Result<usize, StoreError>;

    /// Append every record of `source` to `target`. Returns the number appended.
    fn bulk_append(
        &self,
        source: &str,
        target: &str,
        check: SchemaCheck,
    ) -> Result<usize, StoreError>;

    fn has_attribute(&self, name: &str, attribute: &str) -> Result<bool, StoreError> {
        Ok(self
            .list_attributes(name)?
            .iter()
            .any(|def| def.name == attribute))
    }

    /// Entries of `required` the store does not declare, in the given order.
    fn missing_attributes(&self, name: &str, required: &[&str]) -> Result<Vec<String>, StoreError> {
        let schema = self.list_attributes(name)?;
        Ok(required
            .iter()
            .filter(|attr| !schema.iter().any(|def| def.name == **attr))
            .map(|attr| attr.to_string())
            .collect())
    }

    /// Distinct values of one attribute, in first-seen order.
    fn distinct_values(&self, name: &str, attribute: &str) -> Result<Vec<FieldValue>, StoreError> {
        let mut distinct: Vec<FieldValue> = Vec::new();
        for record in self.scan(name, Some(&[attribute][..]), &Predicate::All)? {
            let value = record?.get(attribute).clone();
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        Ok(distinct)
    }

    fn count_where(&self, name: &str, predicate: &Predicate) -> Result<usize, StoreError> {
        let mut count = 0;
        for record in self.scan(name, Some(NO_ATTRIBUTES), predicate)? {
            record?;
            count += 1;
        }
        Ok(count)
    }
}
