//! aeroschema - schema metadata engine with multiple inheritance
//!
//! - [`schema`]: class hierarchy, registry, snapshots
//! - [`ddl`]: applies pre-parsed DDL statements
//! - [`store`]: persistence boundary, file log and in-memory stores
//! - [`observability`]: structured logging and metrics
//! - [`cli`]: the `aeroschema` binary

pub mod cli;
pub mod ddl;
pub mod observability;
pub mod schema;
pub mod store;
