//! Record command
//!
//! Usage: dsr-audit record <OLD> <NEW> --trail <FILE> --document-type <TYPE>
//!        [--document-id <ID>] [--user <NAME>] [--reason <TEXT>]
//!
//! Appends one UPDATE entry to the JSON Lines trail, or nothing when the
//! documents are equivalent. Prints the entry id, or `unchanged`.

use super::DocumentPair;
use clap::Args;
use dsr_audit_core::audit::{AuditContext, AuditRecorder, DocumentRef, JsonLinesSink};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[command(flatten)]
    pub documents: DocumentPair,

    /// JSON Lines file receiving the entry (created if missing)
    #[arg(long)]
    pub trail: PathBuf,

    /// Entity type of the documents, e.g. ExportJob
    #[arg(long)]
    pub document_type: String,

    #[arg(long)]
    pub document_id: Option<String>,

    /// Username recorded as the actor
    #[arg(long)]
    pub user: Option<String>,

    /// Free-text reason stored with the entry
    #[arg(long)]
    pub reason: Option<String>,
}

/// Execute record command
pub fn execute(args: RecordArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, old, new) = args.documents.load()?;

    let mut document = DocumentRef::new(&args.document_type);
    if let Some(id) = &args.document_id {
        document = document.with_id(id);
    }
    let business_key = |key: &str| {
        new.get(key)
            .or_else(|| old.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    document.job_no = business_key("job_no");
    document.year = business_key("year");

    let mut context = AuditContext::new();
    context.username = args.user.clone();
    context.reason = args.reason.clone();

    let recorder = AuditRecorder::new(engine, JsonLinesSink::open(&args.trail)?);
    match recorder.record_update(&document, &context, &old, &new)? {
        Some(entry) => println!("{}", entry.entry_id),
        None => println!("unchanged"),
    }
    Ok(())
}
