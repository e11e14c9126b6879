//! Equivalent command
//!
//! Usage: dsr-audit equivalent <OLD> <NEW> [--config <FILE>]
//!
//! Prints `true` or `false`; exits 0 when equivalent, 1 otherwise.

use super::DocumentPair;
use clap::Args;

#[derive(Debug, Args)]
pub struct EquivalentArgs {
    #[command(flatten)]
    pub documents: DocumentPair,
}

/// Execute equivalent command
pub fn execute(args: EquivalentArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let (engine, old, new) = args.documents.load()?;

    let equivalent = engine.is_equivalent(Some(&old), Some(&new));
    println!("{}", equivalent);
    Ok(equivalent)
}
