//! Cell value helpers: coercion, equality, ordering and numeric summaries

use std::cmp::Ordering;

use ahash::AHashSet;

use crate::schema::NumericSpec;

pub use serde_json::Value;

/// Coerce a cell to a number, `NaN` when it has no numeric reading.
///
/// Numeric strings are accepted; booleans read as 0/1. Null, empty strings,
/// arrays and objects are `NaN`.
pub fn as_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                f64::NAN
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => f64::NAN,
    }
}

/// Exact equality, except that `1` and `1.0` are the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Key used to collapse duplicates
fn identity_key(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("n:{}", f.to_bits()),
            None => format!("n:{}", n),
        },
        other => other.to_string(),
    }
}

/// Text used for lexical ordering
fn collation_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Compare two cells numerically; values without a numeric reading sort last
pub fn compare_numeric(a: &Value, b: &Value) -> Ordering {
    let (x, y) = (as_number(a), as_number(b));
    match (x.is_nan(), y.is_nan()) {
        (true, true) => collation_key(a).cmp(&collation_key(b)),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Compare two cells by their text
pub fn compare_lexical(a: &Value, b: &Value) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

/// Drop duplicates, keeping the first occurrence of each value
pub fn distinct<I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = Value>,
{
    let mut seen = AHashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(identity_key(v)))
        .collect()
}

/// Sort in place, numerically or lexically
pub fn sort_values(values: &mut [Value], numeric: bool) {
    if numeric {
        values.sort_by(compare_numeric);
    } else {
        values.sort_by(compare_lexical);
    }
}

/// Deduplicate then sort
pub fn distinct_sorted<I>(values: I, numeric: bool) -> Vec<Value>
where
    I: IntoIterator<Item = Value>,
{
    let mut values = distinct(values);
    sort_values(&mut values, numeric);
    values
}

/// Summarize the numeric domain of a set of values.
///
/// The increment is the smallest positive gap between consecutive distinct
/// values in sorted order. A single distinct value yields an increment of 0.
/// Returns `None` when no value has a numeric reading.
pub fn numeric_spec<'a, I>(values: I) -> Option<NumericSpec>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut numbers: Vec<f64> = values
        .into_iter()
        .map(as_number)
        .filter(|n| !n.is_nan())
        .collect();

    if numbers.is_empty() {
        return None;
    }

    numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    numbers.dedup();

    let increment = numbers
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.min(d))))
        .unwrap_or(0.0);

    Some(NumericSpec {
        min_val: numbers[0],
        max_val: numbers[numbers.len() - 1],
        increment,
    })
}
