//! Replacement of a provider's rows in one target store.
//!
//! Delete, then insert. The two phases are not atomic: if the insert fails
//! the target is left without any rows for the provider until the run is
//! repeated.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::SwapError;
use crate::record::Record;
use crate::store::{Predicate, Store};

/// Row counts observed by one replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub deleted: usize,
    pub inserted: usize,
}

/// Replace every `provider` row of `target` with the full contents of
/// `new_dataset`, attributes (identifier included) copied as they are.
///
/// Before deleting, checks that every attribute of the new dataset exists on
/// the target and reads the whole dataset, so neither a schema mismatch nor
/// an unreadable dataset can leave the target emptied.
pub fn replace_provider<S: Store + ?Sized>(
    store: &S,
    provider: &str,
    provider_field: &str,
    new_dataset: &str,
    target: &str,
) -> Result<Replacement, SwapError> {
    info!(provider, target, new_dataset, "updating target store");

    let target_schema = store.list_attributes(target)?;
    let missing: Vec<String> = store
        .list_attributes(new_dataset)?
        .into_iter()
        .filter(|def| !target_schema.iter().any(|t| t.name == def.name))
        .map(|def| def.name)
        .collect();
    if !missing.is_empty() {
        return Err(SwapError::Validation(format!(
            "{} lacks attributes present in {}: {}",
            target,
            new_dataset,
            missing.join(", ")
        )));
    }

    let incoming: Vec<Record> = store
        .scan(new_dataset, None, &Predicate::All)?
        .collect::<Result<_, _>>()?;
    let foreign = incoming
        .iter()
        .filter(|row| row.get(provider_field).as_text() != Some(provider))
        .count();
    if foreign > 0 {
        warn!(provider, new_dataset, foreign, "new dataset carries rows for another provider");
    }

    let deleted = store.delete_where(target, &Predicate::eq(provider_field, provider))?;
    info!(provider, target, deleted, "records deleted");

    let inserted = store.insert_all(target, incoming)?;
    info!(target, new_dataset, inserted, "records copied");
    if inserted == 0 {
        warn!(provider, target, "new dataset is empty; provider removed from target");
    }

    Ok(Replacement { deleted, inserted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AttributeDef, AttributeType, InMemoryStore};

    fn schema() -> Vec<AttributeDef> {
        vec![
            AttributeDef::text("UTProvCode", 50),
            AttributeDef::new("MAXADDOWN", AttributeType::Double),
            AttributeDef::text("Identifier", 50),
        ]
    }

    fn row(provider: &str, down: f64, id: &str) -> Record {
        Record::new()
            .with("UTProvCode", provider)
            .with("MAXADDOWN", down)
            .with("Identifier", id)
    }

    fn provider_rows(store: &InMemoryStore, name: &str, provider: &str) -> Vec<Record> {
        store
            .records(name)
            .unwrap()
            .into_iter()
            .filter(|r| r.get("UTProvCode").as_text() == Some(provider))
            .collect()
    }

    #[test]
    fn replaces_provider_rows_and_keeps_others() {
        let store = InMemoryStore::new();
        store
            .seed(
                "ubb",
                schema(),
                vec![row("A", 1.0, "a1"), row("B", 2.0, "b1"), row("A", 3.0, "a2")],
            )
            .unwrap();
        let incoming = vec![row("A", 10.0, "n1")];
        store.seed("new", schema(), incoming.clone()).unwrap();

        let result = replace_provider(&store, "A", "UTProvCode", "new", "ubb").unwrap();
        assert_eq!(result, Replacement { deleted: 2, inserted: 1 });
        assert_eq!(provider_rows(&store, "ubb", "A"), incoming);
        assert_eq!(provider_rows(&store, "ubb", "B").len(), 1);
    }

    #[test]
    fn new_provider_deletes_nothing() {
        let store = InMemoryStore::new();
        store.seed("ubb", schema(), vec![row("B", 2.0, "b1")]).unwrap();
        store
            .seed("new", schema(), vec![row("A", 1.0, "n1"), row("A", 2.0, "n2")])
            .unwrap();

        let result = replace_provider(&store, "A", "UTProvCode", "new", "ubb").unwrap();
        assert_eq!(result, Replacement { deleted: 0, inserted: 2 });
    }

    #[test]
    fn empty_dataset_removes_provider() {
        let store = InMemoryStore::new();
        store
            .seed("ubb", schema(), vec![row("A", 1.0, "a1"), row("B", 2.0, "b1")])
            .unwrap();
        store.seed("new", schema(), vec![]).unwrap();

        let result = replace_provider(&store, "A", "UTProvCode", "new", "ubb").unwrap();
        assert_eq!(result, Replacement { deleted: 1, inserted: 0 });
        assert!(provider_rows(&store, "ubb", "A").is_empty());
        assert_eq!(store.records("ubb").unwrap().len(), 1);
    }

    #[test]
    fn schema_mismatch_is_caught_before_delete() {
        let store = InMemoryStore::new();
        let narrow: Vec<AttributeDef> = schema().into_iter().take(2).collect();
        store.seed("ubb", narrow, vec![Record::new().with("UTProvCode", "A")]).unwrap();
        store.seed("new", schema(), vec![row("A", 1.0, "n1")]).unwrap();

        let err = replace_provider(&store, "A", "UTProvCode", "new", "ubb").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(provider_rows(&store, "ubb", "A").len(), 1);
    }

    #[test]
    fn replacing_twice_is_stable() {
        let store = InMemoryStore::new();
        store.seed("ubb", schema(), vec![row("A", 1.0, "a1")]).unwrap();
        store.seed("new", schema(), vec![row("A", 5.0, "n1")]).unwrap();

        replace_provider(&store, "A", "UTProvCode", "new", "ubb").unwrap();
        let second = replace_provider(&store, "A", "UTProvCode", "new", "ubb").unwrap();
        assert_eq!(second, Replacement { deleted: 1, inserted: 1 });
        assert_eq!(store.records("ubb").unwrap().len(), 1);
    }
}
