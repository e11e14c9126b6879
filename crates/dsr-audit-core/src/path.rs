//! Dotted/indexed field paths
//!
//! A path addresses a value from the document root: mapping keys and array
//! indices joined by `.` (`invoices.0.products.2.description`). The empty
//! path is the root itself.

use crate::errors::{AuditError, Result};
use serde_json::{Map, Value};

/// Separator between path segments
pub const SEPARATOR: char = '.';

/// Append a key segment to a parent path
pub fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}{SEPARATOR}{segment}")
    }
}

/// Append an array index segment to a parent path
pub fn join_index(parent: &str, index: usize) -> String {
    join(parent, &index.to_string())
}

/// Last segment of a path (`""` for the root)
pub fn last_segment(path: &str) -> &str {
    path.rsplit(SEPARATOR).next().unwrap_or(path)
}

/// Iterate over the segments of a path; the root has none
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// True if the segment reads as an array index
pub fn is_index_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a path against a document.
///
/// Numeric segments index into sequences; on a mapping they are plain keys.
pub fn get_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    })
}

/// Write `new_value` at `path`, creating missing intermediate mappings.
///
/// An index equal to the sequence length appends; anything past it fails.
///
/// # Errors
///
/// - `InvalidPath`: the path is empty, or a segment meets a scalar or an
///   out-of-range / non-numeric sequence index
pub fn set_at(value: &mut Value, path: &str, new_value: Value) -> Result<()> {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(AuditError::EmptyPath.into());
    };

    let not_traversable = |segment: &str| AuditError::PathNotTraversable {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let mut current = value;
    for segment in parents {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get_mut(index))
                .ok_or_else(|| not_traversable(segment))?,
            _ => return Err(not_traversable(segment).into()),
        };
    }

    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), new_value);
            Ok(())
        }
        Value::Array(items) => {
            let index = last
                .parse::<usize>()
                .map_err(|_| not_traversable(last))?;
            if index < items.len() {
                items[index] = new_value;
            } else if index == items.len() {
                items.push(new_value);
            } else {
                return Err(not_traversable(last).into());
            }
            Ok(())
        }
        _ => Err(not_traversable(last).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use serde_json::json;

    #[test]
    fn test_join_from_root_has_no_leading_separator() {
        assert_eq!(join("", "items"), "items");
        assert_eq!(join("items", "id"), "items.id");
        assert_eq!(join_index("items", 2), "items.2");
        assert_eq!(join_index("", 0), "0");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("invoices.0.products.2.description"), "description");
        assert_eq!(last_segment("status"), "status");
        assert_eq!(last_segment(""), "");
    }

    #[test]
    fn test_get_at_walks_objects_and_arrays() {
        let doc = json!({"invoices": [{"products": [{"description": "pepper"}]}]});
        assert_eq!(
            get_at(&doc, "invoices.0.products.0.description"),
            Some(&json!("pepper"))
        );
        assert_eq!(get_at(&doc, ""), Some(&doc));
        assert_eq!(get_at(&doc, "invoices.4"), None);
        assert_eq!(get_at(&doc, "invoices.x"), None);
    }

    #[test]
    fn test_get_at_numeric_key_on_mapping() {
        let doc = json!({"2024": {"count": 3}});
        assert_eq!(get_at(&doc, "2024.count"), Some(&json!(3)));
    }

    #[test]
    fn test_set_at_creates_intermediate_mappings() {
        let mut doc = json!({});
        set_at(&mut doc, "shipment.port.code", json!("INNSA")).unwrap();
        assert_eq!(doc, json!({"shipment": {"port": {"code": "INNSA"}}}));
    }

    #[test]
    fn test_set_at_replaces_and_appends_array_elements() {
        let mut doc = json!({"containers": ["A", "B"]});
        set_at(&mut doc, "containers.1", json!("C")).unwrap();
        set_at(&mut doc, "containers.2", json!("D")).unwrap();
        assert_eq!(doc, json!({"containers": ["A", "C", "D"]}));
    }

    #[test]
    fn test_set_at_rejects_out_of_range_index() {
        let mut doc = json!({"containers": ["A"]});
        let err = set_at(&mut doc, "containers.5", json!("X")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidPath);
        assert_eq!(err.field_path(), Some("containers.5"));
    }

    #[test]
    fn test_set_at_rejects_scalar_parent() {
        let mut doc = json!({"job_no": "EXP/001"});
        let err = set_at(&mut doc, "job_no.prefix", json!("EXP")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidPath);
    }

    #[test]
    fn test_set_at_rejects_empty_path() {
        let mut doc = json!({});
        assert!(set_at(&mut doc, "", json!(1)).is_err());
    }
}
