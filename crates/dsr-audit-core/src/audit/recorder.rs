//! Audit recorder
//!
//! Turns document lifecycle events into audit entries and appends them to
//! an [`AuditSink`]:
//!
//! - update: shortcut, then comparator, then the final exclusion filter; a
//!   change with no effective records writes nothing
//! - create: a summary record plus the document's key fields; `job_no` and
//!   `year` only for job documents, `organization` for every type
//! - delete: a single summary record
//! - bulk: one summary record for the whole batch
//!
//! The recorder diffs exactly the snapshots it is handed. Reading the "before"
//! and "after" states consistently (same transaction, or after the write is
//! committed) is the caller's job; a stale "after" snapshot yields a wrong
//! or empty trail and is not detected here.
//!
//! ## Logging
//!
//! Each `record_*` call logs `log_op_start!` at entry, then `log_op_end!`
//! with the stored change count or `log_op_error!` if the sink fails.

use crate::audit::model::{AuditAction, AuditContext, AuditEntry, DocumentRef};
use crate::audit::sink::AuditSink;
use crate::diff::engine::{present, DiffEngine};
use crate::diff::model::{ChangeRecord, ChangeType};
use crate::errors::Result;
use crate::path;
use crate::{log_op_end, log_op_error, log_op_start};
use serde_json::Value;
use std::time::Instant;

/// Document types whose creation also reports the job number and year
pub const JOB_DOCUMENT_TYPES: &[&str] = &["Job", "ExportJob"];

/// Fields reported as ADDED alongside the creation summary of a job
pub const JOB_KEY_FIELDS: &[&str] = &["job_no", "year", "organization"];

/// Fields reported as ADDED alongside the creation summary of other types
pub const COMMON_KEY_FIELDS: &[&str] = &["organization"];

/// Key fields [`AuditRecorder::record_create`] reports for `document_type`
pub fn default_key_fields(document_type: &str) -> &'static [&'static str] {
    if JOB_DOCUMENT_TYPES.contains(&document_type) {
        JOB_KEY_FIELDS
    } else {
        COMMON_KEY_FIELDS
    }
}

/// `field` of the bulk summary record
pub const BULK_FIELD: &str = "bulk_operation";

/// Old value of the deletion summary record
pub const DELETED_SUMMARY: &str = "Document existed";

/// Writes audit entries for one engine/sink pair
#[derive(Debug)]
pub struct AuditRecorder<S: AuditSink> {
    engine: DiffEngine,
    sink: S,
}

impl<S: AuditSink> AuditRecorder<S> {
    pub fn new(engine: DiffEngine, sink: S) -> Self {
        Self { engine, sink }
    }

    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Record an update from `old` to `new`.
    ///
    /// Returns the stored entry, or `None` when nothing effective changed.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the sink rejects the entry.
    pub fn record_update(
        &self,
        document: &DocumentRef,
        context: &AuditContext,
        old: &Value,
        new: &Value,
    ) -> Result<Option<AuditEntry>> {
        log_op_start!("record_update", document_type = document.document_type.as_str());
        let start = Instant::now();

        if self.engine.is_equivalent(Some(old), Some(new)) {
            log_op_end!(
                "record_update",
                duration_ms = start.elapsed().as_millis() as u64,
                change_count = 0_usize
            );
            return Ok(None);
        }

        let changes = self
            .engine
            .policy()
            .filter(self.engine.diff_documents(old, new));
        if changes.is_empty() {
            tracing::debug!(
                document_type = document.document_type.as_str(),
                "documents differ only in ignored fields"
            );
            log_op_end!(
                "record_update",
                duration_ms = start.elapsed().as_millis() as u64,
                change_count = 0_usize
            );
            return Ok(None);
        }

        let entry = AuditEntry::new(
            document.clone(),
            context.clone(),
            AuditAction::Update,
            changes,
        );
        self.commit("record_update", entry, start).map(Some)
    }

    /// Record the creation of `created`, reporting the
    /// [`default_key_fields`] of its document type
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the sink rejects the entry.
    pub fn record_create(
        &self,
        document: &DocumentRef,
        context: &AuditContext,
        created: &Value,
    ) -> Result<AuditEntry> {
        let key_fields = default_key_fields(&document.document_type);
        self.record_create_with_keys(document, context, created, key_fields)
    }

    /// Record the creation of `created`, reporting each of `key_fields`
    /// that holds a value. Key fields may be dotted paths.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the sink rejects the entry.
    pub fn record_create_with_keys(
        &self,
        document: &DocumentRef,
        context: &AuditContext,
        created: &Value,
        key_fields: &[&str],
    ) -> Result<AuditEntry> {
        log_op_start!("record_create", document_type = document.document_type.as_str());
        let start = Instant::now();

        let mut changes = vec![ChangeRecord::added(
            "",
            Value::String(format!("{} created", document.document_type)),
        )];
        let policy = self.engine.policy();
        for key in key_fields {
            let Some(value) = present(path::get_at(created, key)) else {
                continue;
            };
            if value.as_str() == Some("") || policy.is_excluded(path::last_segment(key), key) {
                continue;
            }
            changes.push(ChangeRecord::added(*key, value.clone()));
        }

        let entry = AuditEntry::new(
            document.clone(),
            context.clone(),
            AuditAction::Create,
            changes,
        );
        self.commit("record_create", entry, start)
    }

    /// Record the deletion of a document
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the sink rejects the entry.
    pub fn record_delete(&self, document: &DocumentRef, context: &AuditContext) -> Result<AuditEntry> {
        log_op_start!("record_delete", document_type = document.document_type.as_str());
        let start = Instant::now();

        let changes = vec![ChangeRecord::removed(
            "",
            Value::String(DELETED_SUMMARY.to_string()),
        )];
        let entry = AuditEntry::new(
            document.clone(),
            context.clone(),
            AuditAction::Delete,
            changes,
        );
        self.commit("record_delete", entry, start)
    }

    /// Record a mass create/update of `count` documents without per-field
    /// diffing
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the sink rejects the entry.
    pub fn record_bulk(
        &self,
        document_type: &str,
        context: &AuditContext,
        count: usize,
    ) -> Result<AuditEntry> {
        log_op_start!("record_bulk", document_type = document_type, count = count);
        let start = Instant::now();

        let changes = vec![ChangeRecord::bulk(
            BULK_FIELD,
            ChangeType::BulkOperation,
            format!("Bulk operation processed {count} jobs"),
        )];
        let entry = AuditEntry::new(
            DocumentRef::new(document_type),
            context.clone(),
            AuditAction::BulkCreateUpdate,
            changes,
        );
        self.commit("record_bulk", entry, start)
    }

    fn commit(&self, op: &'static str, entry: AuditEntry, start: Instant) -> Result<AuditEntry> {
        self.sink.append(&entry).map_err(|e| {
            let mut e = e.with_op(op);
            if let Some(document_id) = &entry.document.document_id {
                e = e.with_document_id(document_id.clone());
            }
            if let Some(request_id) = &entry.context.request_id {
                e = e.with_request_id(request_id.clone());
            }
            log_op_error!(op, e.clone(), duration_ms = start.elapsed().as_millis() as u64);
            e
        })?;

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            change_count = entry.changes.len(),
            entry_id = entry.entry_id.as_str()
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::sink::MemorySink;
    use serde_json::json;

    fn recorder() -> AuditRecorder<MemorySink> {
        AuditRecorder::new(DiffEngine::default(), MemorySink::new())
    }

    #[test]
    fn test_update_with_only_ignored_changes_writes_nothing() {
        let recorder = recorder();
        let old = json!({"status": "Pending", "detailed_status": "A", "updatedAt": "t1"});
        let new = json!({"status": "Pending", "detailed_status": "B", "updatedAt": "t2"});
        let entry = recorder
            .record_update(&DocumentRef::new("ExportJob"), &AuditContext::new(), &old, &new)
            .unwrap();
        assert!(entry.is_none());
        assert!(recorder.sink().is_empty());
    }

    #[test]
    fn test_create_reports_present_key_fields() {
        let recorder = recorder();
        let created = json!({"job_no": "EXP/7", "year": "24-25", "organization": ""});
        let entry = recorder
            .record_create(&DocumentRef::new("ExportJob"), &AuditContext::new(), &created)
            .unwrap();
        let paths: Vec<&str> = entry.changes.iter().map(|c| c.field_path.as_str()).collect();
        assert_eq!(paths, vec!["", "job_no", "year"]);
        assert_eq!(entry.changes[0].new_value, Some(json!("ExportJob created")));
        assert_eq!(entry.changes[0].field, "document");
    }

    #[test]
    fn test_create_reports_job_keys_only_for_jobs() {
        let recorder = recorder();
        let created = json!({"job_no": "U-1", "year": "24-25", "organization": "DSR"});
        let entry = recorder
            .record_create(&DocumentRef::new("User"), &AuditContext::new(), &created)
            .unwrap();
        let paths: Vec<&str> = entry.changes.iter().map(|c| c.field_path.as_str()).collect();
        assert_eq!(paths, vec!["", "organization"]);

        let entry = recorder
            .record_create(&DocumentRef::new("Job"), &AuditContext::new(), &created)
            .unwrap();
        assert_eq!(entry.changes.len(), 4);
        assert_eq!(default_key_fields("ExportJob"), JOB_KEY_FIELDS);
    }

    #[test]
    fn test_delete_summary() {
        let recorder = recorder();
        let entry = recorder
            .record_delete(&DocumentRef::new("User").with_id("42"), &AuditContext::new())
            .unwrap();
        assert_eq!(entry.action, AuditAction::Delete);
        assert_eq!(entry.changes.len(), 1);
        assert_eq!(entry.changes[0].change_type, ChangeType::Removed);
        assert_eq!(entry.changes[0].old_value, Some(json!("Document existed")));
    }

    #[test]
    fn test_bulk_summary() {
        let recorder = recorder();
        let entry = recorder
            .record_bulk("ExportJob", &AuditContext::new(), 12)
            .unwrap();
        assert_eq!(entry.action, AuditAction::BulkCreateUpdate);
        assert_eq!(entry.document.document_id, None);
        assert_eq!(entry.changes[0].field, "bulk_operation");
        assert_eq!(
            entry.changes[0].new_value,
            Some(json!("Bulk operation processed 12 jobs"))
        );
    }
}
