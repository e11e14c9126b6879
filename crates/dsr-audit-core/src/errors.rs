use dsr_audit_types::RequestId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests and any API built on top of stored audit entries. The comparator and
/// the equivalence shortcut are total and never produce any of these; they
/// come from configuration, path addressing and the persistence seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    /// Engine configuration could not be parsed or failed validation
    InvalidConfig,
    /// A field path could not be resolved against a document
    InvalidPath,

    // Integration/IO
    Io,
    Serialization,
    /// The audit sink rejected an append
    Persistence,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional context
/// (operation, field path, document, request) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    field_path: Option<String>,
    document_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            field_path: None,
            document_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add field path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    /// Add document ID context
    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the field path context, if any
    pub fn field_path(&self) -> Option<&str> {
        self.field_path.as_deref()
    }

    /// Get the document ID context, if any
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.field_path {
            write!(f, " (field_path: {})", path)?;
        }
        if let Some(document_id) = &self.document_id {
            write!(f, " (document_id: {})", document_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised around the audit engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    /// Engine configuration text is not valid TOML or has the wrong shape
    #[error("Invalid engine configuration: {reason}")]
    InvalidConfig { reason: String },

    /// `max_depth` must allow at least the document root to be walked
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth { max_depth: usize },

    /// An excluded field name is empty or ends in an array index
    #[error("Invalid excluded field '{name}': {reason}")]
    InvalidExcludedField { name: String, reason: String },

    /// A keyed array rule cannot be honoured
    #[error("Invalid array rule for field '{field}' (key '{key}'): {reason}")]
    InvalidArrayKey {
        field: String,
        key: String,
        reason: String,
    },

    /// Path segment cannot be traversed (scalar parent, bad index)
    #[error("Cannot traverse segment '{segment}' of path '{path}'")]
    PathNotTraversable { path: String, segment: String },

    /// Writing the document root through a path is not supported
    #[error("Cannot write through an empty field path")]
    EmptyPath,

    /// Audit sink failed to store an entry
    #[error("Audit sink append failed: {message}")]
    SinkAppend { message: String },

    /// I/O failure reading configuration or writing entries
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<AuditError> for ExError {
    fn from(err: AuditError) -> Self {
        let message = err.to_string();
        match err {
            AuditError::InvalidConfig { .. }
            | AuditError::InvalidMaxDepth { .. }
            | AuditError::InvalidExcludedField { .. }
            | AuditError::InvalidArrayKey { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }

            AuditError::PathNotTraversable { path, .. } => ExError::new(ExErrorKind::InvalidPath)
                .with_path(path)
                .with_message(message),

            AuditError::EmptyPath => ExError::new(ExErrorKind::InvalidPath)
                .with_path("")
                .with_message(message),

            AuditError::SinkAppend { .. } => {
                ExError::new(ExErrorKind::Persistence).with_message(message)
            }

            AuditError::Io { .. } => ExError::new(ExErrorKind::Io).with_message(message),

            AuditError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to AuditError
impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Io {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AuditError {
    fn from(err: toml::de::Error) -> Self {
        AuditError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_stable() {
        let cases = [
            (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
            (ExErrorKind::InvalidPath, "ERR_INVALID_PATH"),
            (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
            (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_code_op_and_path() {
        let err = ExError::new(ExErrorKind::InvalidPath)
            .with_op("set_at")
            .with_path("invoices.3")
            .with_message("index out of range");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_INVALID_PATH]"));
        assert!(rendered.contains("'set_at'"));
        assert!(rendered.contains("invoices.3"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        use std::error::Error as _;
        let inner = ExError::new(ExErrorKind::Io).with_message("disk full");
        let outer = ExError::new(ExErrorKind::Persistence).with_source(inner);
        assert!(outer.source().is_some());
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Io)
        );
    }
}
