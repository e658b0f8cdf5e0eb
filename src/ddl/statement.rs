//! Pre-parsed DDL statements
//!
//! Statements arrive already parsed, one JSON object each:
//!
//! ```text
//! {"kind":"create_class","name":"C","extends":["A","B"]}
//! {"kind":"alter_class","class":"C","attribute":"SUPERCLASS","value":"+B"}
//! {"kind":"create_property","class":"A","name":"age","type":"INTEGER"}
//! ```

use serde::{Deserialize, Serialize};

use super::errors::{DdlError, DdlResult};
use crate::schema::{PropertyType, SuperclassOp};

/// One schema statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DdlStatement {
    /// `CREATE CLASS name [EXTENDS a,b] [ABSTRACT]`
    CreateClass {
        name: String,
        #[serde(default, rename = "extends")]
        superclasses: Vec<String>,
        #[serde(default, rename = "abstract")]
        is_abstract: bool,
    },
    /// `DROP CLASS name`
    DropClass { name: String },
    /// Structured superclass change
    AlterSuperclasses { class: String, op: SuperclassOp },
    /// `ALTER CLASS name ABSTRACT true|false`
    AlterAbstract {
        class: String,
        #[serde(rename = "abstract")]
        is_abstract: bool,
    },
    /// `ALTER CLASS name <attribute> <value>`, with the raw attribute value
    AlterClass {
        class: String,
        attribute: String,
        value: String,
    },
    /// `CREATE PROPERTY class.name type`
    CreateProperty {
        class: String,
        name: String,
        #[serde(rename = "type")]
        property_type: PropertyType,
    },
    /// `DROP PROPERTY class.name`
    DropProperty { class: String, name: String },
}

impl DdlStatement {
    /// Name of the class the statement targets
    pub fn class_name(&self) -> &str {
        match self {
            DdlStatement::CreateClass { name, .. } | DdlStatement::DropClass { name } => name,
            DdlStatement::AlterSuperclasses { class, .. }
            | DdlStatement::AlterAbstract { class, .. }
            | DdlStatement::AlterClass { class, .. }
            | DdlStatement::CreateProperty { class, .. }
            | DdlStatement::DropProperty { class, .. } => class,
        }
    }

    /// Turns an `AlterClass` into its structured form; other statements are
    /// returned unchanged.
    pub fn normalize(self) -> DdlResult<DdlStatement> {
        match self {
            DdlStatement::AlterClass {
                class,
                attribute,
                value,
            } => match attribute.trim().to_ascii_lowercase().as_str() {
                "superclass" => Ok(DdlStatement::AlterSuperclasses {
                    class,
                    op: SuperclassOp::from_alter_value(false, &value)?,
                }),
                "superclasses" => Ok(DdlStatement::AlterSuperclasses {
                    class,
                    op: SuperclassOp::from_alter_value(true, &value)?,
                }),
                "abstract" => Ok(DdlStatement::AlterAbstract {
                    class,
                    is_abstract: parse_bool(&value)?,
                }),
                other => Err(DdlError::InvalidStatement(format!(
                    "unsupported ALTER CLASS attribute '{}'",
                    other
                ))),
            },
            other => Ok(other),
        }
    }
}

fn parse_bool(value: &str) -> DdlResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DdlError::InvalidStatement(format!(
            "expected true or false, got '{}'",
            other
        ))),
    }
}

/// Strips whitespace and one pair of surrounding backquotes.
fn class_ref(raw: &str) -> DdlResult<String> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        return Err(DdlError::InvalidStatement(format!(
            "empty class name in '{}'",
            raw
        )));
    }
    Ok(unquoted.to_string())
}

impl SuperclassOp {
    /// Interprets the value of `ALTER CLASS … SUPERCLASS[ES] value`.
    ///
    /// - plural: comma-separated full replacement
    /// - singular `+name`: add
    /// - singular `-name`: remove
    /// - singular `name`: full replacement with one superclass
    /// - `NULL` in either form: clear the list
    pub fn from_alter_value(plural: bool, value: &str) -> DdlResult<SuperclassOp> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("null") {
            return Ok(SuperclassOp::ReplaceAll(Vec::new()));
        }

        if plural {
            let names = value
                .split(',')
                .map(class_ref)
                .collect::<DdlResult<Vec<_>>>()?;
            return Ok(SuperclassOp::ReplaceAll(names));
        }

        if let Some(rest) = value.strip_prefix('+') {
            Ok(SuperclassOp::Add(class_ref(rest)?))
        } else if let Some(rest) = value.strip_prefix('-') {
            Ok(SuperclassOp::Remove(class_ref(rest)?))
        } else {
            Ok(SuperclassOp::ReplaceSingle(class_ref(value)?))
        }
    }
}
