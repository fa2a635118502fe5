use std::cmp::Ordering;

use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

/// Compare two numbers across `u64`/`i64`/`f64` representations.
pub(crate) fn compare_numbers(left: &Number, right: &Number) -> Option<Ordering> {
    fn against<T>(left: T, right: &Number) -> Option<Ordering>
    where
        T: NumCmp<u64> + NumCmp<i64> + NumCmp<f64>,
    {
        if let Some(right) = right.as_u64() {
            NumCmp::num_cmp(left, right)
        } else if let Some(right) = right.as_i64() {
            NumCmp::num_cmp(left, right)
        } else {
            NumCmp::num_cmp(left, right.as_f64().expect("Always valid"))
        }
    }
    if let Some(left) = left.as_u64() {
        against(left, right)
    } else if let Some(left) = left.as_i64() {
        against(left, right)
    } else {
        against(left.as_f64().expect("Always valid"), right)
    }
}

/// Compare two numbers by mathematical value, so `1` and `1.0` are equal.
pub(crate) fn equal_numbers(left: &Number, right: &Number) -> bool {
    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return left == right;
    }
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left == right;
    }
    let right = right.as_f64().expect("Always valid");
    if let Some(left) = left.as_u64() {
        NumCmp::num_eq(left, right)
    } else if let Some(left) = left.as_i64() {
        NumCmp::num_eq(left, right)
    } else {
        let left = left.as_f64().expect("Always valid");
        NumCmp::num_eq(left, right)
    }
}

/// Read a keyword value that must be a non-negative integer.
pub(crate) fn count_limit(
    ctx: &crate::compiler::ParseContext<'_, '_>,
    keyword: &str,
    value: &Value,
) -> Result<u64, crate::Error> {
    match value.as_u64() {
        Some(limit) => Ok(limit),
        None => Err(crate::Error::invalid_schema(
            ctx.base_uri().as_str(),
            vec![crate::error::SchemaError {
                location: ctx.location().join(keyword),
                message: format!("{value} is not a non-negative integer"),
            }],
        )),
    }
}

/// Structural equality with mathematical numeric equality at the leaves.
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => equal_numbers(left, right),
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (left, right) => left == right,
    }
}

pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right.iter()).all(|(a, b)| equal(a, b))
}

pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, a)| right.get(key).map_or(false, |b| equal(a, b)))
}
