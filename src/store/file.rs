//! File-backed schema store
//!
//! Persists every mutation to the schema log and rebuilds classes by
//! replaying the whole log from disk on each load.

use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::reader::read_log;
use super::record::SchemaMutation;
use super::state::{StoredClass, StoredSchema};
use super::writer::{schema_log_path, SchemaLogWriter};
use super::SchemaStore;
use crate::observability::ObservationScope;

/// Schema store backed by `<data_dir>/schema/schema.log`
#[derive(Debug)]
pub struct FileSchemaStore {
    data_dir: PathBuf,
    writer: SchemaLogWriter,
}

impl FileSchemaStore {
    /// Opens (or creates) the store under `data_dir`.
    ///
    /// Fails if the existing log is corrupted.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let writer = SchemaLogWriter::open(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            writer,
        })
    }

    /// Returns the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the path of the schema log
    pub fn log_path(&self) -> PathBuf {
        schema_log_path(&self.data_dir)
    }

    /// Replays the log from disk into a materialized schema.
    pub fn replay(&self) -> StoreResult<StoredSchema> {
        let path = self.log_path();
        let path_str = path.display().to_string();
        let scope = ObservationScope::with_fields("SCHEMA_LOG_REPLAY", &[("path", path_str.as_str())]);

        let records = match read_log(&path) {
            Ok(records) => records,
            Err(e) => {
                scope.fail_fatal(e.message());
                return Err(e);
            }
        };

        let mut schema = StoredSchema::new();
        for record in &records {
            if let Err(reason) = schema.apply(record.mutation()) {
                scope.fail_fatal(&reason);
                return Err(StoreError::corruption_at_sequence(record.sequence_number, reason));
            }
        }

        let count = records.len().to_string();
        scope.complete_with_fields(&[("records", count.as_str())]);
        Ok(schema)
    }
}

impl SchemaStore for FileSchemaStore {
    fn load_classes(&self) -> StoreResult<Vec<StoredClass>> {
        Ok(self.replay()?.classes())
    }

    fn persist(&mut self, mutation: &SchemaMutation) -> StoreResult<()> {
        self.writer.append(mutation)?;
        Ok(())
    }

    fn record_count(&self, _class_name: &str) -> StoreResult<u64> {
        // The schema log holds no records.
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyType;
    use tempfile::TempDir;

    #[test]
    fn test_persist_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut store = FileSchemaStore::open(temp_dir.path()).unwrap();
            store
                .persist(&SchemaMutation::CreateClass {
                    name: "A".into(),
                    is_abstract: true,
                    superclasses: Vec::new(),
                })
                .unwrap();
            store
                .persist(&SchemaMutation::AddProperty {
                    class_name: "A".into(),
                    name: "property".into(),
                    property_type: PropertyType::Integer,
                })
                .unwrap();
        }

        let store = FileSchemaStore::open(temp_dir.path()).unwrap();
        let classes = store.load_classes().unwrap();
        assert_eq!(classes.len(), 1);
        assert!(classes[0].is_abstract);

        let props = store.load_properties("a").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].property_type, PropertyType::Integer);
    }

    #[test]
    fn test_inapplicable_mutation_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileSchemaStore::open(temp_dir.path()).unwrap();
        store
            .persist(&SchemaMutation::DropClass { name: "Ghost".into() })
            .unwrap();

        let err = store.load_classes().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.details(), Some("sequence 1"));
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSchemaStore::open(temp_dir.path()).unwrap();
        assert!(store.load_classes().unwrap().is_empty());
        assert_eq!(store.record_count("anything").unwrap(), 0);
    }
}
