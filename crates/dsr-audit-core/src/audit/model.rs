//! Audit entry types.
//!
//! An [`AuditEntry`] serializes flat, in the shape of the audit-trail
//! collection: document identifiers, actor and request metadata, the action,
//! the list of change records and a UTC timestamp.

use crate::diff::model::ChangeRecord;
use chrono::{DateTime, Utc};
use dsr_audit_types::{EntryId, RequestId};
use serde::{Deserialize, Serialize};

/// What happened to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    BulkCreateUpdate,
    BulkOperation,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::BulkCreateUpdate => "BULK_CREATE_UPDATE",
            AuditAction::BulkOperation => "BULK_OPERATION",
        }
    }
}

/// Which document an entry is about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub document_id: Option<String>,
    /// Entity type, e.g. `ExportJob`
    pub document_type: String,
    #[serde(rename = "job_no")]
    pub job_no: Option<String>,
    pub year: Option<String>,
}

impl DocumentRef {
    pub fn new(document_type: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Job number and year, the business key of a job document
    pub fn with_job(mut self, job_no: impl Into<String>, year: impl Into<String>) -> Self {
        self.job_no = Some(job_no.into());
        self.year = Some(year.into());
        self
    }
}

/// Actor and request metadata attached to an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Optional free-text reason given for the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
}

impl AuditContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Who made the change
    pub fn with_user(
        mut self,
        user_id: impl Into<String>,
        username: impl Into<String>,
        user_role: impl Into<String>,
    ) -> Self {
        self.user_id = Some(user_id.into());
        self.username = Some(username.into());
        self.user_role = Some(user_role.into());
        self
    }

    /// Through which endpoint
    pub fn with_request(mut self, method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_client(
        mut self,
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        self.ip_address = Some(ip_address.into());
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

/// One persisted audit-trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub entry_id: EntryId,
    #[serde(flatten)]
    pub document: DocumentRef,
    #[serde(flatten)]
    pub context: AuditContext,
    pub action: AuditAction,
    pub changes: Vec<ChangeRecord>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Stamp a new entry with a fresh id and the current time
    pub fn new(
        document: DocumentRef,
        context: AuditContext,
        action: AuditAction,
        changes: Vec<ChangeRecord>,
    ) -> Self {
        Self {
            entry_id: EntryId::new(),
            document,
            context,
            action,
            changes,
            timestamp: Utc::now(),
        }
    }
}
