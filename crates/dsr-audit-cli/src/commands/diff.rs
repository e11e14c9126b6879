//! Diff command
//!
//! Usage: dsr-audit diff <OLD> <NEW> [--config <FILE>] [--sorted]

use super::DocumentPair;
use clap::Args;
use dsr_audit_core::diff::sort_by_path;

#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub documents: DocumentPair,

    /// Sort records by field path instead of traversal order
    #[arg(long)]
    pub sorted: bool,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, old, new) = args.documents.load()?;

    let mut records = engine.diff_documents(&old, &new);
    if args.sorted {
        sort_by_path(&mut records);
    }

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
