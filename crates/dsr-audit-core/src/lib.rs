//! DSR Audit Core - change detection for the audit trail
//!
//! This crate decides what changed between two snapshots of a business
//! document and which of those changes are worth recording:
//! - Structural comparator producing field-level change records
//! - Configurable exclusion policy for noise fields (status mirrors,
//!   timestamps, version counters)
//! - Equivalence shortcut over canonical forms, consistent with the
//!   comparator
//! - Pluggable array element matching (by position or by identity key)
//! - Audit entry model, append-only sink trait and the recorder that ties
//!   them together
//!
//! The comparator and the shortcut are pure and total; only configuration
//! loading, path writes and sinks can fail.

pub mod audit;
pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod path;
pub mod policy;

pub use dsr_audit_types::schema;

// Re-export commonly used types
pub use audit::{AuditAction, AuditContext, AuditEntry, AuditRecorder, AuditSink, DocumentRef};
pub use config::EngineConfig;
pub use diff::{ArrayMatching, ArrayPolicy, ChangeRecord, ChangeType, DiffEngine};
pub use errors::{AuditError, ExError, ExErrorKind, Result};
pub use policy::ExclusionPolicy;
