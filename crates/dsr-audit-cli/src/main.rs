//! DSR Audit CLI
//!
//! Command-line interface for the audit change-detection engine

use clap::{Parser, Subcommand};
use dsr_audit_core::logging_facility::{init, Profile};

mod commands;

/// Exit code for a usage or I/O failure; 1 is reserved for "not equivalent"
const EXIT_FAILURE: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "dsr-audit")]
#[command(about = "DSR Audit - field-level change detection for business documents", long_about = None)]
struct Cli {
    /// Logging profile (dev, prod); logging is off when omitted
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the change records between two JSON documents
    Diff(commands::diff::DiffArgs),
    /// Check whether two JSON documents differ in any reported field
    Equivalent(commands::equivalent::EquivalentArgs),
    /// Append an audit entry for an update to a JSON Lines trail
    Record(commands::record::RecordArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Some(name) = &cli.log {
        match Profile::from_name(name) {
            Some(profile) => init(profile),
            None => {
                eprintln!("Error: unknown log profile '{}'", name);
                std::process::exit(EXIT_FAILURE);
            }
        }
    }

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args).map(|()| 0),
        Commands::Equivalent(args) => {
            commands::equivalent::execute(args).map(|equivalent| if equivalent { 0 } else { 1 })
        }
        Commands::Record(args) => commands::record::execute(args).map(|()| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}
