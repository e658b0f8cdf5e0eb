//! In-memory schema store
//!
//! Clones share state, so a caller can keep a handle after giving one to a
//! registry and still inspect persisted mutations, report record counts or
//! make the next persist fail.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::errors::{StoreError, StoreResult};
use super::record::SchemaMutation;
use super::state::{StoredClass, StoredSchema};
use super::SchemaStore;

#[derive(Debug, Default)]
struct MemoryState {
    schema: StoredSchema,
    mutations: Vec<SchemaMutation>,
    record_counts: HashMap<String, u64>,
    fail_next_persist: bool,
    fail_next_sync: bool,
}

/// Shared in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemorySchemaStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemorySchemaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `classes`.
    ///
    /// The classes are taken as-is, so tests can seed states the registry
    /// would never produce.
    pub fn with_classes(classes: impl IntoIterator<Item = StoredClass>) -> Self {
        let store = Self::new();
        store.state().schema = StoredSchema::from_classes(classes);
        store
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `persist` call fail
    pub fn fail_next_persist(&self) {
        self.state().fail_next_persist = true;
    }

    /// Makes the next `persist` record the mutation and then report a
    /// FATAL fsync failure, as a log whose write landed but whose sync did
    /// not
    pub fn fail_next_sync(&self) {
        self.state().fail_next_sync = true;
    }

    /// Sets the number of records the store reports for `class_name`
    pub fn set_record_count(&self, class_name: &str, count: u64) {
        self.state()
            .record_counts
            .insert(class_name.to_lowercase(), count);
    }

    /// Mutations persisted so far, in order
    pub fn mutations(&self) -> Vec<SchemaMutation> {
        self.state().mutations.clone()
    }

    /// Replaces the stored classes wholesale
    pub fn overwrite_classes(&self, classes: impl IntoIterator<Item = StoredClass>) {
        self.state().schema = StoredSchema::from_classes(classes);
    }
}

impl SchemaStore for MemorySchemaStore {
    fn load_classes(&self) -> StoreResult<Vec<StoredClass>> {
        Ok(self.state().schema.classes())
    }

    fn persist(&mut self, mutation: &SchemaMutation) -> StoreResult<()> {
        let mut state = self.state();

        if state.fail_next_persist {
            state.fail_next_persist = false;
            return Err(StoreError::append_failed(
                format!("Injected failure persisting mutation on '{}'", mutation.class_name()),
                io::Error::new(io::ErrorKind::Other, "injected persist failure"),
            ));
        }

        state.schema.apply(mutation).map_err(|reason| {
            StoreError::append_failed(reason, io::Error::new(io::ErrorKind::InvalidInput, "mutation rejected"))
        })?;
        state.mutations.push(mutation.clone());

        if state.fail_next_sync {
            state.fail_next_sync = false;
            return Err(StoreError::fsync_failed(
                format!("Injected fsync failure after persisting mutation on '{}'", mutation.class_name()),
                io::Error::new(io::ErrorKind::Other, "injected fsync failure"),
            ));
        }
        Ok(())
    }

    fn record_count(&self, class_name: &str) -> StoreResult<u64> {
        Ok(self
            .state()
            .record_counts
            .get(&class_name.to_lowercase())
            .copied()
            .unwrap_or(0))
    }
}
