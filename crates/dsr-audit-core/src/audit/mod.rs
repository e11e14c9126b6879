//! Audit trail entries, persistence seam and recorder.

pub mod model;
pub mod recorder;
pub mod sink;

pub use model::{AuditAction, AuditContext, AuditEntry, DocumentRef};
pub use recorder::AuditRecorder;
pub use sink::{AuditSink, JsonLinesSink, MemorySink};
