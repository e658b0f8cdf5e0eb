//! DDL errors

use thiserror::Error;

use crate::schema::SchemaError;

/// Result type for DDL operations
pub type DdlResult<T> = Result<T, DdlError>;

/// DDL errors
#[derive(Debug, Error)]
pub enum DdlError {
    /// The registry refused the change
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// The statement itself is malformed
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),
}

impl DdlError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DdlError::Schema(e) => e.code().code(),
            DdlError::InvalidStatement(_) => "AERO_DDL_INVALID_STATEMENT",
        }
    }

    /// Human-readable message without the severity prefix
    pub fn message(&self) -> String {
        match self {
            DdlError::Schema(e) => e.message().to_string(),
            DdlError::InvalidStatement(reason) => reason.clone(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DdlError::Schema(e) if e.is_fatal())
    }

    /// The underlying schema error, if any
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            DdlError::Schema(e) => Some(e),
            DdlError::InvalidStatement(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = DdlError::InvalidStatement("empty class name".into());
        assert_eq!(err.code(), "AERO_DDL_INVALID_STATEMENT");
        assert_eq!(err.to_string(), "Invalid statement: empty class name");
        assert!(!err.is_fatal());

        let err: DdlError = SchemaError::unknown_class("Ghost").into();
        assert_eq!(err.code(), "AERO_SCHEMA_UNKNOWN_CLASS");
        assert!(err.to_string().contains("AERO_SCHEMA_UNKNOWN_CLASS"));
        assert!(err.as_schema().is_some());
    }
}
