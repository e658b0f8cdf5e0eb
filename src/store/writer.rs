//! Schema log writer with fsync enforcement
//!
//! Every append is followed by fsync. A mutation is durable only once
//! `append` has returned.
//!
//! A failed append truncates the log back to its previous length. After a
//! failed fsync the writer refuses every further append; the log must be
//! reopened.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::reader::SchemaLogReader;
use super::record::{LogRecord, SchemaMutation};

/// Relative location of the schema log inside a data directory
pub const SCHEMA_LOG_DIR: &str = "schema";
/// File name of the schema log
pub const SCHEMA_LOG_FILE: &str = "schema.log";

/// Returns `<data_dir>/schema/schema.log`
pub fn schema_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SCHEMA_LOG_DIR).join(SCHEMA_LOG_FILE)
}

/// Append-only writer for the schema log.
#[derive(Debug)]
pub struct SchemaLogWriter {
    /// Path to the log file
    log_path: PathBuf,
    /// Underlying file handle, opened for append
    file: File,
    /// Next sequence number to assign (starts at 1, never reused)
    next_sequence: u64,
    /// Why the writer stopped accepting appends, if it did
    halted: Option<String>,
    #[cfg(test)]
    fault: Option<Fault>,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    ShortWrite,
    Sync,
}

impl SchemaLogWriter {
    /// Opens or creates the schema log under `data_dir`.
    ///
    /// Scans the existing log to find the next sequence number; a corrupted
    /// log fails the open.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let log_path = schema_log_path(data_dir);
        let log_dir = data_dir.join(SCHEMA_LOG_DIR);

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir).map_err(|e| {
                StoreError::append_failed(
                    format!("Failed to create schema log directory: {}", log_dir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| {
                StoreError::append_failed(
                    format!("Failed to open schema log: {}", log_path.display()),
                    e,
                )
            })?;

        let next_sequence = Self::determine_next_sequence(&log_path)?;

        Ok(Self {
            log_path,
            file,
            next_sequence,
            halted: None,
            #[cfg(test)]
            fault: None,
        })
    }

    fn determine_next_sequence(log_path: &Path) -> StoreResult<u64> {
        let metadata = match fs::metadata(log_path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
            Err(e) => return Err(StoreError::append_failed("Failed to read schema log metadata", e)),
        };

        if metadata.len() == 0 {
            return Ok(1);
        }

        let mut reader = SchemaLogReader::open(log_path)?;
        while reader.read_next()?.is_some() {}

        Ok(reader.last_sequence_number() + 1)
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Returns the next sequence number that will be assigned.
    pub fn next_sequence_number(&self) -> u64 {
        self.next_sequence
    }

    /// Returns true once a failed fsync has stopped the writer
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Appends a mutation and fsyncs.
    ///
    /// Returns the sequence number and the number of bytes written. The
    /// sequence counter only advances after a successful fsync.
    pub fn append(&mut self, mutation: &SchemaMutation) -> StoreResult<(u64, usize)> {
        if let Some(reason) = &self.halted {
            return Err(StoreError::fsync_failed(
                format!("Schema log writer halted: {}", reason),
                io::Error::new(io::ErrorKind::Other, "schema log writer halted"),
            ));
        }

        let sequence_number = self.next_sequence;
        let record = LogRecord::new(sequence_number, mutation.clone());
        let serialized = record.serialize().map_err(|e| {
            StoreError::append_failed(
                format!("Failed to encode schema log record at sequence {}", sequence_number),
                e,
            )
        })?;

        let committed_len = self
            .file
            .metadata()
            .map_err(|e| StoreError::append_failed("Failed to read schema log length", e))?
            .len();

        if let Err(e) = self.write_bytes(&serialized) {
            if let Err(truncate) = self.truncate_to(committed_len) {
                self.halted = Some(format!(
                    "could not remove partial record at sequence {}: {}",
                    sequence_number, truncate
                ));
            }
            return Err(StoreError::append_failed(
                format!("Failed to write schema log record at sequence {}", sequence_number),
                e,
            ));
        }

        if let Err(e) = self.sync() {
            // The record may or may not have reached the disk.
            let _ = self.truncate_to(committed_len);
            self.halted = Some(format!("fsync failed at sequence {}", sequence_number));
            return Err(StoreError::fsync_failed(
                format!("fsync failed after schema log append at sequence {}", sequence_number),
                e,
            ));
        }

        self.next_sequence += 1;

        Ok((sequence_number, serialized.len()))
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        #[cfg(test)]
        if self.fault == Some(Fault::ShortWrite) {
            self.fault = None;
            self.file.write_all(&data[..data.len() / 2])?;
            return Err(io::Error::new(io::ErrorKind::WriteZero, "injected short write"));
        }
        self.file.write_all(data)
    }

    fn sync(&mut self) -> io::Result<()> {
        #[cfg(test)]
        if self.fault == Some(Fault::Sync) {
            self.fault = None;
            return Err(io::Error::new(io::ErrorKind::Other, "injected fsync failure"));
        }
        self.file.sync_all()
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)?;
        self.file.sync_all()
    }
}
