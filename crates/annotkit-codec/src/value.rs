//! Path-tracking accessors over `serde_json::Value`.

use annotkit_core::DVec2;
use serde_json::{Map, Value};

use crate::error::FormatError;

pub(crate) fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

pub(crate) fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

pub(crate) fn as_object<'a>(
    v: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, FormatError> {
    v.as_object()
        .ok_or_else(|| FormatError::invalid(path, "expected an object"))
}

pub(crate) fn as_array<'a>(v: &'a Value, path: &str) -> Result<&'a Vec<Value>, FormatError> {
    v.as_array()
        .ok_or_else(|| FormatError::invalid(path, "expected an array"))
}

pub(crate) fn require<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, FormatError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(FormatError::missing(join(path, key))),
        Some(v) => Ok(v),
    }
}

/// Present and non-null.
pub(crate) fn optional<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

pub(crate) fn number(v: &Value, path: &str) -> Result<f64, FormatError> {
    v.as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormatError::invalid(path, "expected a finite number"))
}

pub(crate) fn string<'a>(v: &'a Value, path: &str) -> Result<&'a str, FormatError> {
    v.as_str()
        .ok_or_else(|| FormatError::invalid(path, "expected a string"))
}

pub(crate) fn point(v: &Value, path: &str) -> Result<DVec2, FormatError> {
    let items = as_array(v, path)?;
    if items.len() < 2 {
        return Err(FormatError::invalid(path, "expected an [x, y] pair"));
    }
    Ok(DVec2::new(
        number(&items[0], &index(path, 0))?,
        number(&items[1], &index(path, 1))?,
    ))
}

pub(crate) fn points(v: &Value, path: &str) -> Result<Vec<DVec2>, FormatError> {
    as_array(v, path)?
        .iter()
        .enumerate()
        .map(|(i, p)| point(p, &index(path, i)))
        .collect()
}

pub(crate) fn point_value(p: DVec2) -> Value {
    Value::from(vec![p.x, p.y])
}
