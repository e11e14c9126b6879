//! Array element matching strategies.
//!
//! By default sequences are compared position-wise: index `i` in a path is a
//! position, not an identity, so an insertion near the front reports every
//! later element as changed. Entity types whose arrays carry a stable
//! identity field can opt into key-based matching per field name.

use crate::diff::equality::canonical_number;
use crate::path;
use crate::policy::is_system_key;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// How the elements of one sequence are paired with the other side's
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayMatching {
    /// Pair elements by position
    ByIndex,
    /// Pair mapping elements by the scalar value stored under this key
    ByKey(String),
}

/// Per-field choice of [`ArrayMatching`].
///
/// The strategy for a sequence is looked up by the last segment of its path;
/// `containers = "container_number"` pairs the elements of every
/// `containers` array by container number. Sequences with no rule use
/// `default_key` when set, position otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrayPolicy {
    pub default_key: Option<String>,
    pub keyed: BTreeMap<String, String>,
}

impl ArrayPolicy {
    /// Position-wise matching everywhere
    pub fn by_index() -> Self {
        Self::default()
    }

    /// Add a key-based rule for sequences named `field`
    pub fn with_key(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.keyed.insert(field.into(), key.into());
        self
    }

    /// Strategy for the sequence found at `sequence_path`
    pub fn strategy_for(&self, sequence_path: &str) -> ArrayMatching {
        self.keyed
            .get(path::last_segment(sequence_path))
            .or(self.default_key.as_ref())
            .map(|key| ArrayMatching::ByKey(key.clone()))
            .unwrap_or(ArrayMatching::ByIndex)
    }

    /// All `(field, key)` rules, the default rule reported with field `"*"`
    pub(crate) fn rules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.default_key
            .iter()
            .map(|key| ("*", key.as_str()))
            .chain(self.keyed.iter().map(|(f, k)| (f.as_str(), k.as_str())))
    }
}

/// One step of a sequence comparison
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ElementPair<'a> {
    /// Elements present on both sides, reported at `index`
    Both {
        index: usize,
        old: &'a Value,
        new: &'a Value,
    },
    /// Element only in the new sequence, at its new position
    Added { index: usize, new: &'a Value },
    /// Element only in the old sequence, at its old position
    Removed { index: usize, old: &'a Value },
}

/// Pair the elements of two sequences.
///
/// `ByIndex` walks `0..max(len)` ascending. `ByKey` applies only when both
/// sides are fully keyed (see [`key_positions`]); otherwise it falls back to
/// `ByIndex`. Keyed output lists new-side elements in new order, then the
/// removed old elements in old order.
pub(crate) fn pair_elements<'a>(
    strategy: &ArrayMatching,
    old: &'a [Value],
    new: &'a [Value],
) -> Vec<ElementPair<'a>> {
    if let ArrayMatching::ByKey(key) = strategy {
        if let (Some(old_keys), Some(new_keys)) = (key_positions(old, key), key_positions(new, key))
        {
            return pair_by_key(old, new, &old_keys, &new_keys);
        }
    }
    pair_by_index(old, new)
}

fn pair_by_index<'a>(old: &'a [Value], new: &'a [Value]) -> Vec<ElementPair<'a>> {
    (0..old.len().max(new.len()))
        .filter_map(|index| match (old.get(index), new.get(index)) {
            (Some(old), Some(new)) => Some(ElementPair::Both { index, old, new }),
            (None, Some(new)) => Some(ElementPair::Added { index, new }),
            (Some(old), None) => Some(ElementPair::Removed { index, old }),
            (None, None) => None,
        })
        .collect()
}

fn pair_by_key<'a>(
    old: &'a [Value],
    new: &'a [Value],
    old_keys: &HashMap<String, usize>,
    new_keys: &HashMap<String, usize>,
) -> Vec<ElementPair<'a>> {
    let mut pairs = Vec::with_capacity(old.len().max(new.len()));
    let mut new_order: Vec<(&String, &usize)> = new_keys.iter().collect();
    new_order.sort_by_key(|(_, index)| **index);
    for (identity, &index) in new_order {
        match old_keys.get(identity) {
            Some(&old_index) => pairs.push(ElementPair::Both {
                index,
                old: &old[old_index],
                new: &new[index],
            }),
            None => pairs.push(ElementPair::Added {
                index,
                new: &new[index],
            }),
        }
    }

    let mut removed: Vec<usize> = old_keys
        .iter()
        .filter(|(identity, _)| !new_keys.contains_key(*identity))
        .map(|(_, index)| *index)
        .collect();
    removed.sort_unstable();
    pairs.extend(removed.into_iter().map(|index| ElementPair::Removed {
        index,
        old: &old[index],
    }));
    pairs
}

/// Map each element's identity to its position.
///
/// Returns `None` unless every element is a mapping holding a non-null
/// scalar under `key` and identities are unique. The identity is the key
/// value's JSON text with numbers in canonical form, so `1` and `1.0` are
/// one identity while `1` and `"1"` are distinct.
pub(crate) fn key_positions(items: &[Value], key: &str) -> Option<HashMap<String, usize>> {
    let mut positions = HashMap::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let identity = match item.as_object()?.get(key)? {
            Value::Number(n) => canonical_number(n).to_string(),
            v @ (Value::String(_) | Value::Bool(_)) => v.to_string(),
            _ => return None,
        };
        if positions.insert(identity, index).is_some() {
            return None;
        }
    }
    Some(positions)
}

/// Elements of a fully keyed sequence ordered by identity, or `None` when
/// the sequence does not qualify for key matching.
pub(crate) fn sorted_by_key<'a>(items: &'a [Value], key: &str) -> Option<Vec<&'a Value>> {
    let positions = key_positions(items, key)?;
    let mut ordered: Vec<(String, usize)> = positions.into_iter().collect();
    ordered.sort();
    Some(ordered.into_iter().map(|(_, index)| &items[index]).collect())
}

/// Reasons an identity key cannot be used; `None` when it is acceptable.
///
/// The key must stay visible after exclusions, otherwise two sequences could
/// look equal to the shortcut while the comparator pairs them differently.
pub(crate) fn key_rejection(key: &str, is_excluded: impl Fn(&str) -> bool) -> Option<&'static str> {
    if key.is_empty() {
        Some("identity key is empty")
    } else if is_system_key(key) {
        Some("identity key is a system marker")
    } else if is_excluded(key) {
        Some("identity key is an excluded field")
    } else {
        None
    }
}
