//! Schema store error types
//!
//! Error codes:
//! - AERO_SCHEMA_LOG_APPEND_FAILED (ERROR severity)
//! - AERO_SCHEMA_LOG_FSYNC_FAILED (FATAL severity)
//! - AERO_SCHEMA_LOG_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, schema continues
    Error,
    /// Durable schema state cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Log write failed
    AeroSchemaLogAppendFailed,
    /// Log fsync failed
    AeroSchemaLogFsyncFailed,
    /// Log record unreadable or inconsistent
    AeroSchemaLogCorruption,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::AeroSchemaLogAppendFailed => "AERO_SCHEMA_LOG_APPEND_FAILED",
            StoreErrorCode::AeroSchemaLogFsyncFailed => "AERO_SCHEMA_LOG_FSYNC_FAILED",
            StoreErrorCode::AeroSchemaLogCorruption => "AERO_SCHEMA_LOG_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::AeroSchemaLogAppendFailed => Severity::Error,
            StoreErrorCode::AeroSchemaLogFsyncFailed => Severity::Fatal,
            StoreErrorCode::AeroSchemaLogCorruption => Severity::Fatal,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error type with full context
#[derive(Debug)]
pub struct StoreError {
    /// Error code
    code: StoreErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StoreError {
    /// Create an append failed error
    pub fn append_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StoreErrorCode::AeroSchemaLogAppendFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create an fsync failed error
    pub fn fsync_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StoreErrorCode::AeroSchemaLogFsyncFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a corruption error
    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::AeroSchemaLogCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::AeroSchemaLogCorruption,
            message: reason.into(),
            details: Some(format!("offset {}", offset)),
            source: None,
        }
    }

    /// Create a corruption error with sequence number context
    pub fn corruption_at_sequence(sequence: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::AeroSchemaLogCorruption,
            message: reason.into(),
            details: Some(format!("sequence {}", sequence)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the details if available
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
