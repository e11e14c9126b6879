//! Change record types.
//!
//! The serialized shape (`field`, `fieldPath`, `oldValue`, `newValue`,
//! `changeType`) is the one persisted by the audit store.

use crate::path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder `field` for an ADDED/REMOVED record at the document root
pub const ROOT_DOCUMENT_FIELD: &str = "document";

/// Placeholder `field` for a MODIFIED record at the document root
pub const ROOT_VALUE_FIELD: &str = "value";

/// Kind of a single change.
///
/// The comparator only produces `Added`, `Modified` and `Removed`. The bulk
/// variants are written by callers that skip per-field diffing for mass
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
    BulkOperation,
    BulkCreateUpdate,
}

impl ChangeType {
    /// The change seen from the other side (ADDED ⇄ REMOVED)
    pub fn inverse(self) -> Self {
        match self {
            ChangeType::Added => ChangeType::Removed,
            ChangeType::Removed => ChangeType::Added,
            other => other,
        }
    }

    /// Wire name of the change type
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Added => "ADDED",
            ChangeType::Modified => "MODIFIED",
            ChangeType::Removed => "REMOVED",
            ChangeType::BulkOperation => "BULK_OPERATION",
            ChangeType::BulkCreateUpdate => "BULK_CREATE_UPDATE",
        }
    }
}

/// One field-level difference between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Last path segment, or a root placeholder
    pub field: String,
    /// Full path from the document root (`""` is the root)
    pub field_path: String,
    /// Value before the change; `None` for ADDED
    pub old_value: Option<Value>,
    /// Value after the change; `None` for REMOVED
    pub new_value: Option<Value>,
    pub change_type: ChangeType,
}

impl ChangeRecord {
    /// A value that appeared at `field_path`
    pub fn added(field_path: impl Into<String>, value: Value) -> Self {
        let field_path = field_path.into();
        Self {
            field: field_name(&field_path, ROOT_DOCUMENT_FIELD),
            field_path,
            old_value: None,
            new_value: Some(value),
            change_type: ChangeType::Added,
        }
    }

    /// A value that disappeared from `field_path`
    pub fn removed(field_path: impl Into<String>, value: Value) -> Self {
        let field_path = field_path.into();
        Self {
            field: field_name(&field_path, ROOT_DOCUMENT_FIELD),
            field_path,
            old_value: Some(value),
            new_value: None,
            change_type: ChangeType::Removed,
        }
    }

    /// A value that changed in place at `field_path`
    pub fn modified(field_path: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        let field_path = field_path.into();
        Self {
            field: field_name(&field_path, ROOT_VALUE_FIELD),
            field_path,
            old_value: Some(old_value),
            new_value: Some(new_value),
            change_type: ChangeType::Modified,
        }
    }

    /// A caller-written record that stands in for a whole mass operation
    pub fn bulk(field: impl Into<String>, change_type: ChangeType, summary: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            field_path: String::new(),
            old_value: None,
            new_value: Some(Value::String(summary.into())),
            change_type,
        }
    }

    /// The same change seen from the other side: values swapped and
    /// ADDED ⇄ REMOVED
    pub fn inverted(&self) -> Self {
        Self {
            field: self.field.clone(),
            field_path: self.field_path.clone(),
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
            change_type: self.change_type.inverse(),
        }
    }
}

fn field_name(field_path: &str, root_placeholder: &str) -> String {
    match path::last_segment(field_path) {
        "" => root_placeholder.to_string(),
        segment => segment.to_string(),
    }
}

/// Sort records by `field_path` (stable, so same-path records keep their
/// traversal order). The comparator itself never sorts.
pub fn sort_by_path(records: &mut [ChangeRecord]) {
    records.sort_by(|a, b| a.field_path.cmp(&b.field_path));
}
