//! Schema log reader with strict corruption detection
//!
//! Any checksum failure, truncated record or sequence gap stops the read.
//! There is no partial replay, skipping or repair.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::record::{LogRecord, MIN_RECORD_SIZE};

/// Sequential reader over the schema log
pub struct SchemaLogReader {
    log_path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
    last_sequence: u64,
}

impl SchemaLogReader {
    /// Opens a schema log file for reading.
    pub fn open(log_path: &Path) -> StoreResult<Self> {
        let file = File::open(log_path).map_err(|e| {
            StoreError::corruption(format!(
                "Failed to open schema log: {}: {}",
                log_path.display(),
                e
            ))
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StoreError::corruption(format!("Failed to read schema log metadata: {}", e)))?
            .len();

        Ok(Self {
            log_path: log_path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
            last_sequence: 0,
        })
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Returns the last successfully read sequence number.
    pub fn last_sequence_number(&self) -> u64 {
        self.last_sequence
    }

    /// Reads the next record.
    ///
    /// - `Ok(Some(record))` if a record was read and verified
    /// - `Ok(None)` at a clean end of file
    /// - `Err` on any corruption
    pub fn read_next(&mut self) -> StoreResult<Option<LogRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated schema log: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if record_length > remaining {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = LogRecord::deserialize(&record_buf)
            .map_err(|e| StoreError::corruption_at_offset(self.current_offset, e.to_string()))?;

        if record.sequence_number != self.last_sequence + 1 {
            return Err(StoreError::corruption_at_sequence(
                record.sequence_number,
                format!(
                    "Non-sequential sequence number: expected {}, got {}",
                    self.last_sequence + 1,
                    record.sequence_number
                ),
            ));
        }

        self.current_offset += consumed as u64;
        self.last_sequence = record.sequence_number;

        Ok(Some(record))
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> StoreResult<Vec<LogRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Reads every record of the log at `log_path`; a missing file reads as empty.
pub fn read_log(log_path: &Path) -> StoreResult<Vec<LogRecord>> {
    match std::fs::metadata(log_path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StoreError::corruption(format!(
                "Failed to read schema log metadata: {}",
                e
            )))
        }
        Ok(_) => {}
    }

    SchemaLogReader::open(log_path)?.read_all()
}
