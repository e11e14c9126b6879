//! Property tests for the comparator and the equivalence shortcut.

use dsr_audit_core::diff::{sort_by_path, ArrayPolicy, ChangeRecord, ChangeType, DiffEngine};
use dsr_audit_core::policy::{is_system_key, DEFAULT_EXCLUDED_FIELDS};
use dsr_audit_core::EngineConfig;
use proptest::prelude::*;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(vec!["a", "b", "c", "id", "name", "items"]),
        1 => prop::sample::select(vec!["detailed_status", "updatedAt", "__v", "_id"]),
    ]
    .prop_map(str::to_string)
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-3i64..3).prop_map(Value::from),
        (-3i64..3).prop_map(|n| Value::from(n as f64)),
        prop::sample::select(vec!["", "x", "y", "Pending"]).prop_map(Value::from),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

/// A value and a mutated copy, so pairs share most of their structure
fn arb_pair() -> impl Strategy<Value = (Value, Value)> {
    prop_oneof![
        (arb_value(), arb_value()),
        arb_value().prop_flat_map(|v| {
            let base = v.clone();
            (Just(base), arb_mutation(v))
        }),
    ]
}

fn arb_mutation(value: Value) -> impl Strategy<Value = Value> {
    (arb_key(), arb_value(), any::<bool>()).prop_map(move |(key, replacement, drop)| {
        let mut mutated = value.clone();
        match &mut mutated {
            Value::Object(map) if drop => {
                map.remove(&key);
            }
            Value::Object(map) => {
                map.insert(key, replacement);
            }
            Value::Array(items) if drop => {
                items.pop();
            }
            Value::Array(items) => items.push(replacement),
            other => *other = replacement,
        }
        mutated
    })
}

fn keyed_engine() -> DiffEngine {
    DiffEngine::new(EngineConfig {
        arrays: ArrayPolicy {
            default_key: Some("id".to_string()),
            ..ArrayPolicy::default()
        },
        ..EngineConfig::default()
    })
    .unwrap()
}

fn shallow_engine() -> DiffEngine {
    DiffEngine::new(EngineConfig {
        max_depth: 2,
        ..EngineConfig::default()
    })
    .unwrap()
}

fn sorted(mut records: Vec<ChangeRecord>) -> Vec<ChangeRecord> {
    sort_by_path(&mut records);
    records
}

fn names_excluded(record: &ChangeRecord) -> bool {
    record
        .field_path
        .split('.')
        .any(|segment| DEFAULT_EXCLUDED_FIELDS.contains(&segment) || is_system_key(segment))
}

fn is_ignored_key(key: &str) -> bool {
    DEFAULT_EXCLUDED_FIELDS.contains(&key) || is_system_key(key)
}

/// True if any mapping inside `value` still holds an ignored key
fn carries_ignored_key(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(key, child)| is_ignored_key(key) || carries_ignored_key(child)),
        Value::Array(items) => items.iter().any(carries_ignored_key),
        _ => false,
    }
}

fn nest(mut value: Value, levels: usize) -> Value {
    for _ in 0..levels {
        let mut wrapper = Map::new();
        wrapper.insert("a".to_string(), value);
        value = Value::Object(wrapper);
    }
    value
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn diff_is_reflexive(x in arb_value()) {
        prop_assert!(DiffEngine::default().diff_documents(&x, &x).is_empty());
        prop_assert!(DiffEngine::default().is_equivalent(Some(&x), Some(&x)));
    }

    /// The shortcut says "equivalent" exactly when the comparator finds nothing
    #[test]
    fn shortcut_agrees_with_comparator((old, new) in arb_pair()) {
        for engine in [DiffEngine::default(), keyed_engine(), shallow_engine()] {
            let equivalent = engine.is_equivalent(Some(&old), Some(&new));
            let records = engine.diff_documents(&old, &new);
            prop_assert_eq!(
                equivalent,
                records.is_empty(),
                "max_depth={} records={:?}",
                engine.max_depth(),
                records
            );
        }
    }

    #[test]
    fn shortcut_agrees_with_comparator_one_sided(x in arb_value()) {
        let engine = DiffEngine::default();
        prop_assert_eq!(engine.is_equivalent(None, Some(&x)), engine.diff(None, Some(&x), "").is_empty());
        prop_assert_eq!(engine.is_equivalent(Some(&x), None), engine.diff(Some(&x), None, "").is_empty());
    }

    /// Swapping sides swaps ADDED/REMOVED and the MODIFIED values
    #[test]
    fn diff_is_symmetric((old, new) in arb_pair()) {
        let engine = DiffEngine::default();
        let forward: Vec<ChangeRecord> = engine
            .diff_documents(&old, &new)
            .iter()
            .map(ChangeRecord::inverted)
            .collect();
        let backward = engine.diff_documents(&new, &old);
        prop_assert_eq!(sorted(forward), sorted(backward));
    }

    #[test]
    fn excluded_fields_never_reported((old, new) in arb_pair()) {
        for engine in [DiffEngine::default(), keyed_engine(), shallow_engine()] {
            for record in engine.diff_documents(&old, &new) {
                prop_assert!(!names_excluded(&record), "leaked {:?}", record);
                let values = record.old_value.iter().chain(record.new_value.iter());
                for value in values {
                    prop_assert!(!carries_ignored_key(value), "value leaked {:?}", record);
                }
            }
        }
    }

    #[test]
    fn excluded_field_changes_are_invisible(
        base in prop::collection::btree_map(arb_key(), arb_value(), 0..4),
        field in prop::sample::select(DEFAULT_EXCLUDED_FIELDS.to_vec()),
        before in arb_value(),
        after in arb_value(),
    ) {
        let mut old: Map<String, Value> = base.into_iter().collect();
        let mut new = old.clone();
        old.insert(field.to_string(), before);
        new.insert(field.to_string(), after);
        let (old, new) = (Value::Object(old), Value::Object(new));

        let engine = DiffEngine::default();
        prop_assert!(engine.diff_documents(&old, &new).is_empty());
        prop_assert!(engine.is_equivalent(Some(&old), Some(&new)));
    }

    /// Same invariance when the edited mapping sits at or past `max_depth`
    #[test]
    fn excluded_field_changes_are_invisible_past_cut_off(
        base in prop::collection::btree_map(arb_key(), arb_value(), 0..4),
        field in prop::sample::select(DEFAULT_EXCLUDED_FIELDS.to_vec()),
        before in arb_value(),
        after in arb_value(),
        levels in 0usize..5,
    ) {
        let mut old: Map<String, Value> = base.into_iter().collect();
        let mut new = old.clone();
        old.insert(field.to_string(), before);
        new.insert(field.to_string(), after);
        let old = nest(Value::Object(old), levels);
        let new = nest(Value::Object(new), levels);

        for engine in [shallow_engine(), keyed_engine()] {
            prop_assert!(engine.diff_documents(&old, &new).is_empty(), "levels={}", levels);
            prop_assert!(engine.is_equivalent(Some(&old), Some(&new)));
        }
    }

    /// k changed keys in a flat mapping give exactly k MODIFIED records
    #[test]
    fn flat_mapping_leaf_count(
        values in prop::collection::vec(-100i64..100, 1..12),
        changed in prop::collection::vec(any::<bool>(), 12),
    ) {
        let mut old = Map::new();
        let mut new = Map::new();
        let mut expected = 0;
        for (i, value) in values.iter().enumerate() {
            old.insert(format!("f{i}"), Value::from(*value));
            let next = if changed[i] { expected += 1; value + 1 } else { *value };
            new.insert(format!("f{i}"), Value::from(next));
        }

        let records = DiffEngine::default().diff_documents(&Value::Object(old), &Value::Object(new));
        prop_assert_eq!(records.len(), expected);
        prop_assert!(records.iter().all(|r| r.change_type == ChangeType::Modified));
    }
}
