//! Field exclusion policy
//!
//! Decides which fields are never reported as changes. Exclusion is
//! name-based and depth-independent: `x.y.detailed_status` is excluded
//! exactly like a top-level `detailed_status`. There is no include-list and
//! no wildcard beyond "matches the final segment".
//!
//! Separately from the configured names, a fixed set of system markers
//! (identity keys, version counters, last-modified timestamps) is skipped by
//! the comparator and the equivalence shortcut regardless of configuration.

use crate::diff::model::ChangeRecord;
use crate::path::SEPARATOR;
use std::collections::BTreeSet;

/// Field names excluded when no configuration is supplied
pub const DEFAULT_EXCLUDED_FIELDS: &[&str] = &["detailed_status", "updatedAt", "__v"];

/// Keys starting with this prefix are store-internal (`_id`, `__v`)
pub const SYSTEM_KEY_PREFIX: char = '_';

/// Store-maintained keys without the system prefix
pub const SYSTEM_KEYS: &[&str] = &["updatedAt"];

/// True for keys that are never reported, whatever the policy says
pub fn is_system_key(key: &str) -> bool {
    key.starts_with(SYSTEM_KEY_PREFIX) || SYSTEM_KEYS.contains(&key)
}

/// Set of excluded field names, injected into the engine at construction.
///
/// # Example
/// ```
/// use dsr_audit_core::policy::ExclusionPolicy;
///
/// let policy = ExclusionPolicy::new(["detailed_status"]);
/// assert!(policy.is_excluded("detailed_status", "detailed_status"));
/// assert!(policy.is_excluded("detailed_status", "milestones.3.detailed_status"));
/// assert!(!policy.is_excluded("status", "status"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    /// Names without a separator, matched against the last path segment
    names: BTreeSet<String>,
    /// Names containing a separator, matched as a path suffix
    dotted: Vec<String>,
}

impl ExclusionPolicy {
    /// Build a policy from a set of excluded field names
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = BTreeSet::new();
        let mut dotted = Vec::new();
        for field in fields.into_iter().map(Into::into) {
            if field.contains(SEPARATOR) {
                if !dotted.contains(&field) {
                    dotted.push(field);
                }
            } else {
                names.insert(field);
            }
        }
        dotted.sort();
        Self { names, dotted }
    }

    /// A policy that excludes nothing beyond the system markers
    pub fn none() -> Self {
        Self::new(std::iter::empty::<String>())
    }

    /// All configured names, sorted
    pub fn excluded_fields(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self
            .names
            .iter()
            .chain(self.dotted.iter())
            .map(String::as_str)
            .collect();
        all.sort_unstable();
        all
    }

    /// True if a change at `field_path` (local name `field_name`) must not
    /// be reported.
    ///
    /// Matches when the name is excluded, or the path equals an excluded
    /// name, or the path ends with `.` followed by an excluded name.
    pub fn is_excluded(&self, field_name: &str, field_path: &str) -> bool {
        if self.names.contains(field_name) {
            return true;
        }
        let last = field_path.rsplit(SEPARATOR).next().unwrap_or(field_path);
        if self.names.contains(last) {
            return true;
        }
        self.dotted.iter().any(|name| {
            field_path == name
                || (field_path.len() > name.len()
                    && field_path.ends_with(name.as_str())
                    && field_path[..field_path.len() - name.len()].ends_with(SEPARATOR))
        })
    }

    /// True if a mapping key is skipped during traversal: either a system
    /// marker or an excluded field at `key_path`
    pub fn skips_key(&self, key: &str, key_path: &str) -> bool {
        is_system_key(key) || self.is_excluded(key, key_path)
    }

    /// Final-filter predicate over an emitted record
    pub fn allows(&self, record: &ChangeRecord) -> bool {
        !self.is_excluded(&record.field, &record.field_path)
    }

    /// Drop every record the policy does not allow
    pub fn filter(&self, records: Vec<ChangeRecord>) -> Vec<ChangeRecord> {
        records.into_iter().filter(|r| self.allows(r)).collect()
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_FIELDS.iter().copied())
    }
}
