use tracing::{debug, warn};

use super::{AttributeDef, Store, StoreError};

/// A temporary store that is dropped when the guard goes out of scope.
///
/// Acquisition clears any same-named leftover from an earlier run before
/// creating a fresh, empty store. Release happens on every exit path; a
/// failed release is logged and never replaces the error already in flight.
pub struct ScratchStore<'a, S: Store + ?Sized> {
    store: &'a S,
    name: String,
}

impl<'a, S: Store + ?Sized> ScratchStore<'a, S> {
    pub fn acquire(
        store: &'a S,
        name: impl Into<String>,
        schema: Vec<AttributeDef>,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        if store.drop_store(&name)? {
            warn!(scratch = %name, "removed scratch store left over from a previous run");
        }
        store.create(&name, schema)?;
        debug!(scratch = %name, "scratch store acquired");
        Ok(Self { store, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S: Store + ?Sized> Drop for ScratchStore<'_, S> {
    fn drop(&mut self) {
        match self.store.drop_store(&self.name) {
            Ok(_) => debug!(scratch = %self.name, "scratch store released"),
            Err(e) => warn!(scratch = %self.name, error = %e, "failed to release scratch store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::store::InMemoryStore;

    fn schema() -> Vec<AttributeDef> {
        vec![AttributeDef::text("UTProvCode", 50)]
    }

    #[test]
    fn released_on_drop() {
        let store = InMemoryStore::new();
        {
            let scratch = ScratchStore::acquire(&store, "stage", schema()).unwrap();
            assert_eq!(scratch.name(), "stage");
            assert!(store.exists("stage").unwrap());
        }
        assert!(!store.exists("stage").unwrap());
    }

    #[test]
    fn released_on_early_return() {
        fn fails(store: &InMemoryStore) -> Result<(), StoreError> {
            let scratch = ScratchStore::acquire(store, "stage", schema())?;
            store.insert_all(scratch.name(), vec![Record::new().with("Bogus", 1_i64)])?;
            Ok(())
        }

        let store = InMemoryStore::new();
        assert!(fails(&store).is_err());
        assert!(!store.exists("stage").unwrap());
    }

    #[test]
    fn leftover_does_not_block_reacquisition() {
        let store = InMemoryStore::new();
        store
            .seed("stage", schema(), vec![Record::new().with("UTProvCode", "stale")])
            .unwrap();

        let scratch = ScratchStore::acquire(&store, "stage", schema()).unwrap();
        assert_eq!(store.records(scratch.name()).unwrap().len(), 0);
    }
}
