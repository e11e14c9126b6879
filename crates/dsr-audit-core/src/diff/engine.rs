//! Structural comparator.
//!
//! [`DiffEngine::diff`] walks two snapshots of the same entity and yields
//! field-level [`ChangeRecord`]s in traversal order (mapping keys as
//! encountered, array positions ascending). It is total over JSON values:
//! `null` and a missing value both mean "absent", and comparing different
//! shapes (mapping vs sequence) degrades to one MODIFIED at the shared path.
//!
//! The exclusion policy is applied at three points: on entry to every
//! subtree, before every leaf is emitted, and over the final list. The later
//! checks are redundant with the first for every branch that exists today;
//! they keep a newly added branch from leaking excluded fields.
//!
//! A key present on one side only is drilled to its leaves: each leaf gets
//! its own ADDED or REMOVED record rather than one record carrying the
//! whole subtree. Adding a populated nested object therefore stores one
//! record per leaf, a larger trail than a single opaque record would give.
//!
//! Numbers compare by value, so `1` and `1.0` are not a change.
//!
//! Snapshots are owned `serde_json::Value` trees and cannot contain cycles.
//! Nesting deeper than `max_depth` is not walked: the subtrees at the
//! cut-off are stripped of ignored keys without recursion, compared as
//! whole values and reported as one record.

use crate::config::{EngineConfig, DEFAULT_MAX_DEPTH};
use crate::diff::equality::{same_present, same_value};
use crate::diff::matching::{pair_elements, ArrayPolicy, ElementPair};
use crate::diff::model::ChangeRecord;
use crate::errors::Result;
use crate::path;
use crate::policy::ExclusionPolicy;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Added,
    Removed,
}

impl Side {
    fn record(self, field_path: &str, value: Value) -> ChangeRecord {
        match self {
            Side::Added => ChangeRecord::added(field_path, value),
            Side::Removed => ChangeRecord::removed(field_path, value),
        }
    }
}

/// Treat JSON `null` as absent
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Comparator and equivalence shortcut bound to one exclusion/array policy.
///
/// Holds configuration only; every call is independent and the engine can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    pub(crate) policy: ExclusionPolicy,
    pub(crate) arrays: ArrayPolicy,
    pub(crate) max_depth: usize,
}

impl DiffEngine {
    /// Build an engine from a validated configuration
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`: see [`EngineConfig::validate`]
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: ExclusionPolicy::new(config.excluded_fields),
            arrays: config.arrays,
            max_depth: config.max_depth,
        })
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    pub fn array_policy(&self) -> &ArrayPolicy {
        &self.arrays
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Compare two whole documents from the root
    pub fn diff_documents(&self, old: &Value, new: &Value) -> Vec<ChangeRecord> {
        self.diff(Some(old), Some(new), "")
    }

    /// Compare `old` and `new`, reporting paths under `base_path`.
    ///
    /// - both absent: no records
    /// - one side absent: ADDED/REMOVED leaves at the bottom of the present
    ///   subtree (an empty container is itself a leaf)
    /// - two sequences: elements paired by the array policy
    /// - two mappings: union of keys, system and excluded keys skipped
    /// - anything else: MODIFIED iff the values differ
    pub fn diff(&self, old: Option<&Value>, new: Option<&Value>, base_path: &str) -> Vec<ChangeRecord> {
        let mut records = Vec::new();
        self.walk(present(old), present(new), base_path, 0, &mut records);
        records.retain(|r| self.policy.allows(r));
        tracing::debug!(
            field_path = base_path,
            change_count = records.len(),
            "structural diff complete"
        );
        records
    }

    fn walk(
        &self,
        old: Option<&Value>,
        new: Option<&Value>,
        at: &str,
        depth: usize,
        out: &mut Vec<ChangeRecord>,
    ) {
        match (old, new) {
            (None, None) => {}
            (None, Some(new)) => self.walk_one_side(new, at, depth, Side::Added, out),
            (Some(old), None) => self.walk_one_side(old, at, depth, Side::Removed, out),
            (Some(old), Some(new)) => {
                if self.enters_excluded(at) {
                    return;
                }
                if depth >= self.max_depth {
                    let (old, new) = (self.prune(old, at), self.prune(new, at));
                    if !same_value(&old, &new) {
                        self.depth_cutoff(at, depth);
                        self.emit(ChangeRecord::modified(at, old, new), out);
                    }
                    return;
                }
                match (old, new) {
                    (Value::Array(old), Value::Array(new)) => {
                        self.walk_sequences(old, new, at, depth, out)
                    }
                    (Value::Object(old), Value::Object(new)) => {
                        self.walk_mappings(old, new, at, depth, out)
                    }
                    _ if !same_value(old, new) => self.emit(
                        ChangeRecord::modified(
                            at,
                            self.strip(old, at, depth),
                            self.strip(new, at, depth),
                        ),
                        out,
                    ),
                    _ => {}
                }
            }
        }
    }

    fn walk_mappings(
        &self,
        old: &Map<String, Value>,
        new: &Map<String, Value>,
        at: &str,
        depth: usize,
        out: &mut Vec<ChangeRecord>,
    ) {
        let new_only = new.keys().filter(|key| !old.contains_key(*key));
        for key in old.keys().chain(new_only) {
            let at_key = path::join(at, key);
            if self.policy.skips_key(key, &at_key) {
                continue;
            }
            let (old_value, new_value) = (present(old.get(key)), present(new.get(key)));
            if same_present(old_value, new_value) {
                continue;
            }
            self.walk(old_value, new_value, &at_key, depth + 1, out);
        }
    }

    fn walk_sequences(
        &self,
        old: &[Value],
        new: &[Value],
        at: &str,
        depth: usize,
        out: &mut Vec<ChangeRecord>,
    ) {
        let strategy = self.arrays.strategy_for(at);
        for pair in pair_elements(&strategy, old, new) {
            match pair {
                ElementPair::Both { index, old, new } => self.walk(
                    present(Some(old)),
                    present(Some(new)),
                    &path::join_index(at, index),
                    depth + 1,
                    out,
                ),
                // Appended/dropped elements are reported even when null
                ElementPair::Added { index, new } => self.walk_one_side(
                    new,
                    &path::join_index(at, index),
                    depth + 1,
                    Side::Added,
                    out,
                ),
                ElementPair::Removed { index, old } => self.walk_one_side(
                    old,
                    &path::join_index(at, index),
                    depth + 1,
                    Side::Removed,
                    out,
                ),
            }
        }
    }

    fn walk_one_side(
        &self,
        value: &Value,
        at: &str,
        depth: usize,
        side: Side,
        out: &mut Vec<ChangeRecord>,
    ) {
        if self.enters_excluded(at) {
            return;
        }
        if depth >= self.max_depth {
            if value.is_object() || value.is_array() {
                self.depth_cutoff(at, depth);
            }
            self.emit(side.record(at, self.prune(value, at)), out);
            return;
        }
        match value {
            Value::Object(map) => {
                let mut descended = false;
                for (key, child) in map {
                    let at_key = path::join(at, key);
                    if child.is_null() || self.policy.skips_key(key, &at_key) {
                        continue;
                    }
                    descended = true;
                    self.walk_one_side(child, &at_key, depth + 1, side, out);
                }
                if !descended {
                    self.emit(side.record(at, Value::Object(Map::new())), out);
                }
            }
            Value::Array(items) if items.is_empty() => {
                self.emit(side.record(at, Value::Array(Vec::new())), out)
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.walk_one_side(item, &path::join_index(at, index), depth + 1, side, out);
                }
            }
            scalar => self.emit(side.record(at, scalar.clone()), out),
        }
    }

    fn enters_excluded(&self, at: &str) -> bool {
        self.policy.is_excluded(path::last_segment(at), at)
    }

    fn emit(&self, record: ChangeRecord, out: &mut Vec<ChangeRecord>) {
        if self.policy.allows(&record) {
            out.push(record);
        }
    }

    fn depth_cutoff(&self, at: &str, depth: usize) {
        tracing::warn!(
            field_path = at,
            depth,
            max_depth = self.max_depth,
            "nesting exceeds max_depth, comparing subtree as a whole"
        );
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            policy: ExclusionPolicy::default(),
            arrays: ArrayPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
