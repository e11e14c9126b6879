//! Canonical form and the equivalence shortcut.
//!
//! Two snapshots are equivalent when their canonical forms are equal. The
//! canonical form drops exactly what the comparator ignores: excluded
//! fields, system markers and null-valued keys. Sequence order is kept,
//! except that a keyed sequence is ordered by identity so reordering it is
//! not a change. Beyond `max_depth` the same keys are dropped without
//! recursion and sequence order is kept, mirroring the comparator's cut-off.
//!
//! The shortcut and the comparator agree: `is_equivalent(a, b)` holds
//! exactly when `diff(a, b)` is empty. Both compare numbers by value.

use crate::diff::engine::{present, DiffEngine};
use crate::diff::equality::same_value;
use crate::diff::matching::{sorted_by_key, ArrayMatching};
use crate::path;
use serde_json::{Map, Value};

impl DiffEngine {
    /// True if no effective change separates `old` and `new`
    pub fn is_equivalent(&self, old: Option<&Value>, new: Option<&Value>) -> bool {
        let canonical = |value: Option<&Value>| {
            present(value)
                .map(|v| self.canonicalize(v))
                .unwrap_or(Value::Null)
        };
        let equivalent = same_value(&canonical(old), &canonical(new));
        tracing::trace!(equivalent, "equivalence check");
        equivalent
    }

    /// Canonical form of a whole document
    pub fn canonicalize(&self, value: &Value) -> Value {
        self.reduce(value, "", 0, true)
    }

    /// Record value with ignored fields removed; sequence order is kept as
    /// written so the record shows what was stored.
    pub(crate) fn strip(&self, value: &Value, at: &str, depth: usize) -> Value {
        self.reduce(value, at, depth, false)
    }

    /// Copy of a subtree at the depth cut-off with ignored keys removed.
    ///
    /// Uses an explicit stack, so it is safe at any nesting depth. Sequence
    /// order is kept as written.
    pub(crate) fn prune(&self, value: &Value, at: &str) -> Value {
        let mut pruned = value.clone();
        {
            let mut pending: Vec<(&mut Value, String)> = vec![(&mut pruned, at.to_string())];
            while let Some((node, node_path)) = pending.pop() {
                match node {
                    Value::Object(map) => {
                        map.retain(|key, child| {
                            !child.is_null()
                                && !self.policy.skips_key(key, &path::join(&node_path, key))
                        });
                        for (key, child) in map.iter_mut() {
                            let child_path = path::join(&node_path, key);
                            pending.push((child, child_path));
                        }
                    }
                    Value::Array(items) => {
                        for (index, item) in items.iter_mut().enumerate() {
                            pending.push((item, path::join_index(&node_path, index)));
                        }
                    }
                    _ => {}
                }
            }
        }
        pruned
    }

    fn reduce(&self, value: &Value, at: &str, depth: usize, order_keyed: bool) -> Value {
        if depth >= self.max_depth {
            return self.prune(value, at);
        }
        match value {
            Value::Object(map) => {
                let mut kept = Map::new();
                for (key, child) in map {
                    let at_key = path::join(at, key);
                    if child.is_null() || self.policy.skips_key(key, &at_key) {
                        continue;
                    }
                    kept.insert(key.clone(), self.reduce(child, &at_key, depth + 1, order_keyed));
                }
                Value::Object(kept)
            }
            Value::Array(items) => {
                let ordered = match self.arrays.strategy_for(at) {
                    ArrayMatching::ByKey(key) if order_keyed => sorted_by_key(items, &key),
                    _ => None,
                }
                .unwrap_or_else(|| items.iter().collect());
                Value::Array(
                    ordered
                        .into_iter()
                        .enumerate()
                        .map(|(index, item)| {
                            self.reduce(item, &path::join_index(at, index), depth + 1, order_keyed)
                        })
                        .collect(),
                )
            }
            scalar => scalar.clone(),
        }
    }
}
