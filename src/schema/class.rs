//! Class node stored in the hierarchy arena

use std::collections::BTreeSet;

use super::property_table::PropertyTable;
use super::types::ClassId;

/// A schema class.
///
/// Superclass and subclass references are arena ids. `subclasses` is a
/// derived index owned by the hierarchy graph and is only changed together
/// with the matching `superclasses` entry of the subclass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) is_abstract: bool,
    pub(crate) properties: PropertyTable,
    pub(crate) superclasses: Vec<ClassId>,
    pub(crate) subclasses: BTreeSet<ClassId>,
}

impl ClassNode {
    pub(crate) fn new(id: ClassId, name: impl Into<String>, is_abstract: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_abstract,
            properties: PropertyTable::new(),
            superclasses: Vec::new(),
            subclasses: BTreeSet::new(),
        }
    }

    /// Arena id
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name as spelled at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the class is abstract
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Properties declared by this class only
    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// Direct superclasses, in declared order
    pub fn superclasses(&self) -> &[ClassId] {
        &self.superclasses
    }

    /// Direct subclasses
    pub fn subclasses(&self) -> &BTreeSet<ClassId> {
        &self.subclasses
    }
}
