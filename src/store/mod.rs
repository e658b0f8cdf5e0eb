//! Schema persistence
//!
//! The registry talks to storage only through [`SchemaStore`]. Two stores
//! are provided:
//!
//! - [`FileSchemaStore`]: an append-only, checksummed, fsynced mutation log
//!   under `<data_dir>/schema/schema.log`
//! - [`MemorySchemaStore`]: shared in-memory state, with hooks for
//!   injecting persist failures and record counts
//!
//! # Log Record Format
//!
//! ```text
//! | record_length (u32 LE) | mutation_kind (u8) | sequence_number (u64 LE) | payload (JSON) | checksum (u32 LE) |
//! ```
//!
//! Any checksum failure, truncation or sequence gap is corruption.

mod checksum;
mod errors;
mod file;
mod memory;
mod reader;
mod record;
mod state;
mod writer;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};
pub use file::FileSchemaStore;
pub use memory::MemorySchemaStore;
pub use reader::{read_log, SchemaLogReader};
pub use record::{LogRecord, MutationEnvelope, MutationKind, SchemaMutation, MIN_RECORD_SIZE};
pub use state::{StoredClass, StoredProperty, StoredSchema};
pub use writer::{schema_log_path, SchemaLogWriter, SCHEMA_LOG_DIR, SCHEMA_LOG_FILE};

/// Storage boundary for schema metadata
pub trait SchemaStore: Send + Sync {
    /// All persisted classes, ordered by lower-cased name
    fn load_classes(&self) -> StoreResult<Vec<StoredClass>>;

    /// Properties declared on one class; unknown classes have none
    fn load_properties(&self, class_name: &str) -> StoreResult<Vec<StoredProperty>> {
        let wanted = class_name.to_lowercase();
        Ok(self
            .load_classes()?
            .into_iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .map(|c| c.properties)
            .unwrap_or_default())
    }

    /// Durably records one mutation
    fn persist(&mut self, mutation: &SchemaMutation) -> StoreResult<()>;

    /// Number of records stored in `class_name`
    fn record_count(&self, class_name: &str) -> StoreResult<u64>;
}
