//! Engine configuration
//!
//! Loads the per-entity-type engine settings from TOML:
//!
//! ```toml
//! excluded_fields = ["detailed_status", "updatedAt", "__v"]
//! max_depth = 64
//!
//! [arrays.keyed]
//! containers = "container_number"
//! ```
//!
//! Adding an entity type means adding a configuration; the algorithm does
//! not change.

use crate::diff::matching::{key_rejection, ArrayPolicy};
use crate::errors::{AuditError, ExError, Result};
use crate::path;
use crate::policy::{ExclusionPolicy, DEFAULT_EXCLUDED_FIELDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Nesting depth walked before subtrees are compared whole
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for one [`DiffEngine`](crate::diff::DiffEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Field names (or dotted path suffixes) never reported as changes
    pub excluded_fields: Vec<String>,
    pub max_depth: usize,
    /// Per-sequence element matching
    pub arrays: ArrayPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            excluded_fields: DEFAULT_EXCLUDED_FIELDS.iter().map(|s| s.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            arrays: ArrayPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`: malformed TOML, unknown keys, or a rule rejected
    ///   by [`EngineConfig::validate`]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text).map_err(AuditError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    ///
    /// # Errors
    ///
    /// - `Io`: the file cannot be read
    /// - `InvalidConfig`: see [`EngineConfig::from_toml_str`]
    pub fn from_path(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let text = fs::read_to_string(config_path).map_err(|e| {
            ExError::from(AuditError::from(e)).with_path(config_path.display().to_string())
        })?;
        Self::from_toml_str(&text).map_err(|e| e.with_path(config_path.display().to_string()))
    }

    /// The exclusion policy described by `excluded_fields`
    pub fn policy(&self) -> ExclusionPolicy {
        ExclusionPolicy::new(self.excluded_fields.iter().cloned())
    }

    /// Check the rules the comparator and the shortcut rely on.
    ///
    /// Excluded names may not contain empty or array-index segments, keyed
    /// array fields must be plain non-numeric names, and identity keys must
    /// stay visible: not empty, not a system marker, not excluded.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`: the first rule violated
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(AuditError::InvalidMaxDepth {
                max_depth: self.max_depth,
            }
            .into());
        }

        for name in &self.excluded_fields {
            let reason = if name.is_empty() {
                Some("name is empty")
            } else if name.split(path::SEPARATOR).any(str::is_empty) {
                Some("name has an empty segment")
            } else if name.split(path::SEPARATOR).any(path::is_index_segment) {
                Some("name has an array index segment")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(AuditError::InvalidExcludedField {
                    name: name.clone(),
                    reason: reason.to_string(),
                }
                .into());
            }
        }

        let policy = self.policy();
        for (field, key) in self.arrays.rules() {
            let field_reason = if field.is_empty() {
                Some("field name is empty")
            } else if field != "*" && field.contains(path::SEPARATOR) {
                Some("field name must be a single segment")
            } else if path::is_index_segment(field) {
                Some("field name is an array index")
            } else {
                None
            };
            let reason = field_reason.or_else(|| key_rejection(key, |k| policy.is_excluded(k, k)));
            if let Some(reason) = reason {
                return Err(AuditError::InvalidArrayKey {
                    field: field.to_string(),
                    key: key.to_string(),
                    reason: reason.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
