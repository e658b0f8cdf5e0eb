//! CLI argument definitions
//!
//! - aeroschema init --config <path>
//! - aeroschema apply --config <path>
//! - aeroschema show --config <path> [--class <name>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aeroschema - class hierarchy metadata with multiple inheritance
#[derive(Parser, Debug)]
#[command(name = "aeroschema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty schema log
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroschema.json")]
        config: PathBuf,
    },

    /// Apply DDL statements read from stdin, one JSON object per line
    Apply {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroschema.json")]
        config: PathBuf,
    },

    /// Print the current schema
    Show {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroschema.json")]
        config: PathBuf,

        /// Only this class, with its resolved properties
        #[arg(long)]
        class: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_with_class() {
        let cli = Cli::try_parse_from(["aeroschema", "show", "--config", "c.json", "--class", "Person"])
            .unwrap();
        match cli.command {
            Command::Show { config, class } => {
                assert_eq!(config, PathBuf::from("c.json"));
                assert_eq!(class.as_deref(), Some("Person"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["aeroschema", "apply"]).unwrap();
        match cli.command {
            Command::Apply { config } => assert_eq!(config, PathBuf::from("./aeroschema.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
