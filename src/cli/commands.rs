//! CLI command implementations
//!
//! Every command loads the config, then opens the file-backed registry.
//! Nothing here changes the schema except through the DDL translator.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::json;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response};
use crate::ddl::{DdlStatement, DdlTranslator};
use crate::observability::Logger;
use crate::schema::SchemaRegistry;
use crate::store::{schema_log_path, FileSchemaStore};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Apply { config } => apply(&config),
        Command::Show { config, class } => show(&config, class.as_deref()),
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.min_severity()?);
    Ok(config)
}

fn is_initialized(data_dir: &Path) -> bool {
    schema_log_path(data_dir).exists()
}

/// Opens the registry over the schema log of an initialized data directory
pub fn open_registry(config: &Config) -> CliResult<SchemaRegistry> {
    let data_dir = config.data_path();
    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    let store = FileSchemaStore::open(data_dir)
        .map_err(|e| CliError::schema_failed(e.to_string()))?;
    Ok(SchemaRegistry::open(Box::new(store), config.to_options())?)
}

/// Create the data directory and an empty schema log
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    let store = FileSchemaStore::open(data_dir)
        .map_err(|e| CliError::config_error(format!("Failed to create schema log: {}", e)))?;

    let log_path = store.log_path().display().to_string();
    write_response(
        &mut io::stdout(),
        json!({"initialized": true, "schema_log": log_path}),
    )
}

/// Apply DDL statements from stdin
pub fn apply(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let registry = open_registry(&config)?;
    let translator = DdlTranslator::new(registry);

    let stdin = io::stdin();
    apply_stream(&translator, stdin.lock(), &mut io::stdout())?;
    Ok(())
}

/// Counts of statements handled by [`apply_stream`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub failed: usize,
}

/// Applies one statement per input line, writing one response per line.
///
/// Rejected statements are reported and skipped. A fatal schema error or an
/// I/O error stops processing.
pub fn apply_stream<R: BufRead, W: Write>(
    translator: &DdlTranslator,
    input: R,
    output: &mut W,
) -> CliResult<ApplySummary> {
    let mut summary = ApplySummary::default();

    for line in read_requests::<DdlStatement, _>(input) {
        let statement = match line? {
            Ok(statement) => statement,
            Err(e) => {
                summary.failed += 1;
                write_error(output, "AERO_DDL_INVALID_STATEMENT", &e.to_string())?;
                continue;
            }
        };

        match translator.execute(statement) {
            Ok(outcome) => {
                summary.applied += 1;
                write_response(output, serde_json::to_value(&outcome)?)?;
            }
            Err(e) => {
                summary.failed += 1;
                write_error(output, e.code(), &e.message())?;
                if e.is_fatal() {
                    return Err(CliError::schema_failed(e.to_string()));
                }
            }
        }
    }

    Ok(summary)
}

/// Print the schema, or one class with its resolved properties
pub fn show(config_path: &Path, class: Option<&str>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let registry = open_registry(&config)?;
    show_to(&registry, class, &mut io::stdout())
}

/// Writes the `show` response for `registry`
pub fn show_to<W: Write>(registry: &SchemaRegistry, class: Option<&str>, output: &mut W) -> CliResult<()> {
    let snapshot = registry.snapshot();

    match class {
        Some(name) => match snapshot.describe_class(name) {
            Some(description) => write_response(
                output,
                json!({"version": snapshot.version(), "class": description}),
            ),
            None => write_error(
                output,
                "AERO_SCHEMA_UNKNOWN_CLASS",
                &format!("Class '{}' not found", name),
            ),
        },
        None => write_response(
            output,
            json!({"version": snapshot.version(), "classes": snapshot.describe()}),
        ),
    }
}
