//! Per-class property table
//!
//! Holds the properties a class declares itself. Inherited properties are
//! never stored here; they are resolved through the hierarchy graph.

use std::collections::BTreeMap;

use super::types::{name_key, PropertyDef};

/// Case-insensitive mapping of property name to definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    /// Definitions keyed by lower-cased name
    entries: BTreeMap<String, PropertyDef>,
}

impl PropertyTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a property by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&PropertyDef> {
        self.entries.get(&name_key(name))
    }

    /// Returns true if the table declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name_key(name))
    }

    /// Inserts a definition.
    ///
    /// Returns false and leaves the table unchanged if the name is taken.
    pub fn insert(&mut self, def: PropertyDef) -> bool {
        let key = name_key(&def.name);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, def);
        true
    }

    /// Removes a definition by name, ignoring case
    pub fn remove(&mut self, name: &str) -> Option<PropertyDef> {
        self.entries.remove(&name_key(name))
    }

    /// Iterates definitions ordered by lower-cased name
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDef> {
        self.entries.values()
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is declared
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
