//! Structural diff engine.
//!
//! Compares two snapshots of a business document and produces the flat list
//! of field-level changes persisted in the audit trail.
//!
//! ## Entry point
//!
//! ```
//! use dsr_audit_core::diff::DiffEngine;
//! use serde_json::json;
//!
//! let engine = DiffEngine::default();
//! let old = json!({"status": "Pending", "updatedAt": "2024-01-01"});
//! let new = json!({"status": "Completed", "updatedAt": "2024-01-02"});
//!
//! let changes = engine.diff_documents(&old, &new);
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].field_path, "status");
//! assert!(!engine.is_equivalent(Some(&old), Some(&new)));
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical record lists, in
//!   traversal order.
//! - **Shortcut consistency**: `is_equivalent` is true exactly when `diff`
//!   returns no records.
//! - **Exclusion**: no record ever names an excluded field, however deep,
//!   and no record value carries one.
//! - **Numbers by value**: `1` and `1.0` are the same value.
//! - **Flat output**: every record sits on a leaf or on the opaque value
//!   that replaced one (shape mismatch, depth cut-off, empty container).

pub mod canonical;
pub mod engine;
mod equality;
pub mod matching;
pub mod model;

pub use engine::DiffEngine;
pub use matching::{ArrayMatching, ArrayPolicy};
pub use model::{sort_by_path, ChangeRecord, ChangeType};
