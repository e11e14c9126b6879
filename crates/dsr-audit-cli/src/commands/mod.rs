//! Subcommands and the input loading they share

pub mod diff;
pub mod equivalent;
pub mod record;

use clap::Args;
use dsr_audit_core::{DiffEngine, EngineConfig};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Old/new document pair plus engine configuration
#[derive(Debug, Args)]
pub struct DocumentPair {
    /// Snapshot before the change (JSON)
    pub old: PathBuf,

    /// Snapshot after the change (JSON)
    pub new: PathBuf,

    /// Engine configuration (TOML); built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl DocumentPair {
    pub fn load(&self) -> Result<(DiffEngine, Value, Value), Box<dyn std::error::Error>> {
        let engine = load_engine(self.config.as_deref())?;
        let old = load_document(&self.old)?;
        let new = load_document(&self.new)?;
        Ok((engine, old, new))
    }
}

/// Build the engine from a config file, or the defaults
pub fn load_engine(config: Option<&Path>) -> Result<DiffEngine, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    Ok(DiffEngine::new(config)?)
}

/// Read a JSON document
pub fn load_document(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))?;
    Ok(value)
}
