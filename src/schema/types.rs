//! Schema type definitions
//!
//! Property data types, property definitions and class identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported property data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    Boolean,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Binary,
    Date,
    DateTime,
    Embedded,
    EmbeddedList,
    EmbeddedSet,
    EmbeddedMap,
    Link,
    LinkList,
    LinkSet,
    LinkMap,
}

impl PropertyType {
    /// All types, in declaration order
    pub const ALL: [PropertyType; 19] = [
        PropertyType::Boolean,
        PropertyType::Short,
        PropertyType::Integer,
        PropertyType::Long,
        PropertyType::Float,
        PropertyType::Double,
        PropertyType::Decimal,
        PropertyType::String,
        PropertyType::Binary,
        PropertyType::Date,
        PropertyType::DateTime,
        PropertyType::Embedded,
        PropertyType::EmbeddedList,
        PropertyType::EmbeddedSet,
        PropertyType::EmbeddedMap,
        PropertyType::Link,
        PropertyType::LinkList,
        PropertyType::LinkSet,
        PropertyType::LinkMap,
    ];

    /// Returns the type name as written in DDL
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "BOOLEAN",
            PropertyType::Short => "SHORT",
            PropertyType::Integer => "INTEGER",
            PropertyType::Long => "LONG",
            PropertyType::Float => "FLOAT",
            PropertyType::Double => "DOUBLE",
            PropertyType::Decimal => "DECIMAL",
            PropertyType::String => "STRING",
            PropertyType::Binary => "BINARY",
            PropertyType::Date => "DATE",
            PropertyType::DateTime => "DATETIME",
            PropertyType::Embedded => "EMBEDDED",
            PropertyType::EmbeddedList => "EMBEDDEDLIST",
            PropertyType::EmbeddedSet => "EMBEDDEDSET",
            PropertyType::EmbeddedMap => "EMBEDDEDMAP",
            PropertyType::Link => "LINK",
            PropertyType::LinkList => "LINKLIST",
            PropertyType::LinkSet => "LINKSET",
            PropertyType::LinkMap => "LINKMAP",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PropertyType::ALL
            .iter()
            .copied()
            .find(|t| t.type_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown property type '{}'", wanted))
    }
}

/// A property declared on a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name, as spelled at creation
    pub name: String,
    /// Data type
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Name of the class that declares the property
    pub owner_class: String,
}

impl PropertyDef {
    /// Create a property definition
    pub fn new(
        name: impl Into<String>,
        property_type: PropertyType,
        owner_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            property_type,
            owner_class: owner_class.into(),
        }
    }
}

/// Stable arena identifier of a class inside one hierarchy graph.
///
/// Identifiers are never reused within a graph; a reload builds a new graph
/// and may assign different identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    /// Returns the raw arena index
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Characters never allowed in class or property names
const FORBIDDEN_NAME_CHARS: [char; 8] = [':', ',', ';', '%', '@', '=', '.', '#'];

/// Validates a class or property name.
///
/// Names must be non-empty and free of whitespace and of `: , ; % @ = . #`.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".into());
    }

    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN_NAME_CHARS.contains(c))
    {
        return Err(format!("character '{}' is not allowed", c));
    }

    Ok(())
}

/// Case-insensitive lookup key for a name
pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_parse_case_insensitive() {
        assert_eq!("integer".parse::<PropertyType>().unwrap(), PropertyType::Integer);
        assert_eq!("DOUBLE".parse::<PropertyType>().unwrap(), PropertyType::Double);
        assert_eq!(" EmbeddedList ".parse::<PropertyType>().unwrap(), PropertyType::EmbeddedList);
        assert!("varchar".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_property_type_serde_uppercase() {
        let json = serde_json::to_string(&PropertyType::DateTime).unwrap();
        assert_eq!(json, "\"DATETIME\"");
        let parsed: PropertyType = serde_json::from_str("\"LINKMAP\"").unwrap();
        assert_eq!(parsed, PropertyType::LinkMap);
    }

    #[test]
    fn test_type_names_round_trip_through_from_str() {
        for t in PropertyType::ALL {
            assert_eq!(t.type_name().parse::<PropertyType>().unwrap(), t);
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Person").is_ok());
        assert!(validate_name("sql2A").is_ok());
        assert!(validate_name("under_score").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("has space").is_err());
        assert!(validate_name("a.b").is_err());
        assert!(validate_name("a,b").is_err());
        assert!(validate_name("#12").is_err());
    }

    #[test]
    fn test_name_key_folds_case() {
        assert_eq!(name_key("JavaA"), name_key("javaa"));
    }
}
