//! DDL surface
//!
//! Takes statements that were parsed elsewhere and applies them to a
//! [`SchemaRegistry`](crate::schema::SchemaRegistry).
//!
//! `ALTER CLASS … SUPERCLASS[ES]` values follow the usual grammar:
//!
//! | value | effect |
//! |---|---|
//! | `SUPERCLASSES A,B` | replace the list with `[A, B]` |
//! | `SUPERCLASS A` | replace the list with `[A]` |
//! | `SUPERCLASS +A` | append `A` if absent |
//! | `SUPERCLASS -A` | remove `A` if present |

mod errors;
mod statement;
mod translator;

pub use errors::{DdlError, DdlResult};
pub use statement::DdlStatement;
pub use translator::{DdlAction, DdlOutcome, DdlTranslator};
