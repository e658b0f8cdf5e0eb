//! Command-line interface
//!
//! - init: create the data directory and an empty schema log
//! - apply: apply DDL statements from stdin
//! - show: print the schema as JSON

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{apply, apply_stream, init, open_registry, run, run_command, show, show_to, ApplySummary};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_response};
