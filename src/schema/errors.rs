//! Schema error types
//!
//! Error codes:
//! - AERO_SCHEMA_DUPLICATE_CLASS (REJECT)
//! - AERO_SCHEMA_UNKNOWN_CLASS (REJECT)
//! - AERO_SCHEMA_UNKNOWN_SUPERCLASS (REJECT)
//! - AERO_SCHEMA_RECURSION (REJECT)
//! - AERO_SCHEMA_CLASS_IN_USE (REJECT)
//! - AERO_SCHEMA_INVALID_NAME (REJECT)
//! - AERO_SCHEMA_DUPLICATE_PROPERTY (REJECT)
//! - AERO_SCHEMA_UNKNOWN_PROPERTY (REJECT)
//! - AERO_SCHEMA_PERSIST_FAILED (REJECT)
//! - AERO_SCHEMA_CORRUPTION (FATAL)

use std::fmt;

use crate::store::StoreError;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation rejected, schema unchanged
    Reject,
    /// Persisted schema cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Class name already registered
    AeroSchemaDuplicateClass,
    /// Class name not registered
    AeroSchemaUnknownClass,
    /// Superclass not listed on the class (strict removal only)
    AeroSchemaUnknownSuperclass,
    /// Superclass assignment would make a class its own ancestor
    AeroSchemaRecursion,
    /// Class still referenced by subclasses or records
    AeroSchemaClassInUse,
    /// Class or property name rejected
    AeroSchemaInvalidName,
    /// Property already declared on the class
    AeroSchemaDuplicateProperty,
    /// Property not declared on the class
    AeroSchemaUnknownProperty,
    /// Durable write of a mutation failed
    AeroSchemaPersistFailed,
    /// Persisted schema violates hierarchy invariants (FATAL)
    AeroSchemaCorruption,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::AeroSchemaDuplicateClass => "AERO_SCHEMA_DUPLICATE_CLASS",
            SchemaErrorCode::AeroSchemaUnknownClass => "AERO_SCHEMA_UNKNOWN_CLASS",
            SchemaErrorCode::AeroSchemaUnknownSuperclass => "AERO_SCHEMA_UNKNOWN_SUPERCLASS",
            SchemaErrorCode::AeroSchemaRecursion => "AERO_SCHEMA_RECURSION",
            SchemaErrorCode::AeroSchemaClassInUse => "AERO_SCHEMA_CLASS_IN_USE",
            SchemaErrorCode::AeroSchemaInvalidName => "AERO_SCHEMA_INVALID_NAME",
            SchemaErrorCode::AeroSchemaDuplicateProperty => "AERO_SCHEMA_DUPLICATE_PROPERTY",
            SchemaErrorCode::AeroSchemaUnknownProperty => "AERO_SCHEMA_UNKNOWN_PROPERTY",
            SchemaErrorCode::AeroSchemaPersistFailed => "AERO_SCHEMA_PERSIST_FAILED",
            SchemaErrorCode::AeroSchemaCorruption => "AERO_SCHEMA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::AeroSchemaCorruption => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Class the error concerns, if any
    class_name: Option<String>,
    /// Underlying store failure, if any
    source: Option<StoreError>,
    /// FATAL regardless of code
    fatal: bool,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String, class_name: Option<String>) -> Self {
        Self {
            code,
            message,
            class_name,
            source: None,
            fatal: false,
        }
    }

    /// Create a duplicate class error
    pub fn duplicate_class(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::AeroSchemaDuplicateClass,
            format!("Class '{}' already exists", name),
            Some(name),
        )
    }

    /// Create an unknown class error
    pub fn unknown_class(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::AeroSchemaUnknownClass,
            format!("Class '{}' not found", name),
            Some(name),
        )
    }

    /// Create an unknown superclass error
    pub fn unknown_superclass(class_name: impl Into<String>, superclass: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::new(
            SchemaErrorCode::AeroSchemaUnknownSuperclass,
            format!(
                "Class '{}' does not extend '{}'",
                class_name,
                superclass.into()
            ),
            Some(class_name),
        )
    }

    /// Create a recursion (cycle) error
    pub fn recursion(class_name: impl Into<String>, through: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::new(
            SchemaErrorCode::AeroSchemaRecursion,
            format!(
                "Cannot set superclass '{}' on class '{}' because of recursion",
                through.into(),
                class_name
            ),
            Some(class_name),
        )
    }

    /// Create a class-in-use error
    pub fn class_in_use(class_name: impl Into<String>, reason: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::new(
            SchemaErrorCode::AeroSchemaClassInUse,
            format!("Class '{}' is in use: {}", class_name, reason.into()),
            Some(class_name),
        )
    }

    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::AeroSchemaInvalidName,
            format!("Invalid name '{}': {}", name.into(), reason.into()),
            None,
        )
    }

    /// Create a duplicate property error
    pub fn duplicate_property(class_name: impl Into<String>, property: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::new(
            SchemaErrorCode::AeroSchemaDuplicateProperty,
            format!(
                "Property '{}' already declared on class '{}'",
                property.into(),
                class_name
            ),
            Some(class_name),
        )
    }

    /// Create an unknown property error
    pub fn unknown_property(class_name: impl Into<String>, property: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::new(
            SchemaErrorCode::AeroSchemaUnknownProperty,
            format!(
                "Property '{}' not declared on class '{}'",
                property.into(),
                class_name
            ),
            Some(class_name),
        )
    }

    /// Create a persistence failure error.
    ///
    /// The in-memory change is always discarded. If the store failure is
    /// FATAL the durable state is unknown and so is this error.
    pub fn persist_failed(source: StoreError) -> Self {
        let message = if source.is_fatal() {
            format!(
                "Schema mutation was discarded in memory but may be durable: {}",
                source.message()
            )
        } else {
            format!(
                "Schema mutation was not persisted and has been rolled back: {}",
                source.message()
            )
        };
        Self {
            code: SchemaErrorCode::AeroSchemaPersistFailed,
            message,
            class_name: None,
            fatal: source.is_fatal(),
            source: Some(source),
        }
    }

    /// Create the error returned by a registry halted after a FATAL
    /// persistence failure
    pub fn halted(reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::AeroSchemaPersistFailed,
            format!(
                "Schema registry halted after a fatal persistence failure: {}",
                reason.into()
            ),
            None,
        )
        .escalated()
    }

    fn escalated(mut self) -> Self {
        self.fatal = true;
        self
    }

    /// Create a corruption error (FATAL)
    pub fn corruption(reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::AeroSchemaCorruption,
            format!("Persisted schema is corrupted: {}", reason.into()),
            None,
        )
    }

    /// Create a corruption error caused by a store read failure (FATAL)
    pub fn corruption_from_store(source: StoreError) -> Self {
        Self {
            code: SchemaErrorCode::AeroSchemaCorruption,
            message: format!("Persisted schema is corrupted: {}", source.message()),
            class_name: None,
            fatal: source.is_fatal(),
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        if self.fatal {
            Severity::Fatal
        } else {
            self.code.severity()
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the class name if applicable
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns true for cycle rejections
    pub fn is_recursion(&self) -> bool {
        self.code == SchemaErrorCode::AeroSchemaRecursion
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
