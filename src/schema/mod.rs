//! Schema metadata engine
//!
//! Classes with ordered multiple inheritance, kept as a directed acyclic
//! graph under live mutation.
//!
//! - [`SchemaRegistry`] is the single mutable source of truth
//! - [`LiveClass`] handles read whatever the registry currently holds
//! - [`SchemaSnapshot`] is a frozen copy for repeatable reads
//! - Both class handles share the [`ClassView`] query surface
//!
//! Invariants:
//!
//! - No class is its own transitive ancestor
//! - `B ∈ A.subclasses ⇔ A ∈ B.superclasses`
//! - Class names are unique ignoring case
//! - A property resolves to the first match in a depth-first walk of
//!   the class and then its superclasses in declared order

mod class;
mod errors;
mod hierarchy;
mod property_table;
mod registry;
mod snapshot;
mod types;
mod view;

pub use class::ClassNode;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use hierarchy::HierarchyGraph;
pub use property_table::PropertyTable;
pub use registry::{LiveClass, RegistryOptions, RemovalPolicy, SchemaRegistry, SuperclassOp};
pub use snapshot::{ClassDescription, SchemaSnapshot, SnapshotClass};
pub use types::{validate_name, ClassId, PropertyDef, PropertyType};
pub use view::ClassView;
