//! Value equality shared by the comparator and the equivalence shortcut.
//!
//! JSON has a single number kind, but `serde_json` keeps integers and floats
//! apart, so `1` and `1.0` are unequal `Value`s. Snapshots that round-trip
//! through a store switch between the two freely; here both compare equal.

use serde_json::{Number, Value};

const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Integral floats in integer range rewritten as integers; anything else
/// returned as is. Two numbers denote the same value iff their canonical
/// forms are equal.
pub(crate) fn canonical_number(number: &Number) -> Number {
    let Some(float) = number.as_f64().filter(|_| number.is_f64()) else {
        return number.clone();
    };
    if float.fract() != 0.0 {
        return number.clone();
    }
    if (0.0..TWO_POW_64).contains(&float) {
        Number::from(float as u64)
    } else if (-TWO_POW_63..0.0).contains(&float) {
        Number::from(float as i64)
    } else {
        number.clone()
    }
}

/// Structural equality with numbers compared by value.
///
/// Walks with an explicit stack, so arbitrarily deep values are safe.
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    let mut pending = vec![(a, b)];
    while let Some((a, b)) = pending.pop() {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                if canonical_number(x) != canonical_number(y) {
                    return false;
                }
            }
            (Value::Array(x), Value::Array(y)) => {
                if x.len() != y.len() {
                    return false;
                }
                pending.extend(x.iter().zip(y));
            }
            (Value::Object(x), Value::Object(y)) => {
                if x.len() != y.len() {
                    return false;
                }
                for (key, value) in x {
                    match y.get(key) {
                        Some(other) => pending.push((value, other)),
                        None => return false,
                    }
                }
            }
            // Scalars, and containers of different kinds
            _ => {
                if a != b {
                    return false;
                }
            }
        }
    }
    true
}

/// [`same_value`] lifted over optional values
pub(crate) fn same_present(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => same_value(a, b),
        _ => false,
    }
}
