//! Lenient serde helpers for client-submitted payloads
//!
//! Form-backed clients send numbers as strings, `""` for an unset number and
//! `null` for a cleared value. These helpers coerce such input instead of
//! rejecting the whole submission.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a leading integer the way a form field would be read ("12 pcs" -> 12)
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

pub(crate) fn value_to_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn value_to_string(v: Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn clamp_count(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

/// Any scalar as a string; null becomes empty
pub fn string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| v.map(value_to_string).unwrap_or_default())
}

/// Any scalar as a string; null and empty become `None`
pub fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d)
        .map(|v| v.map(value_to_string).filter(|s| !s.is_empty()))
}

/// JavaScript-style truthiness
pub fn truthy<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    })
}

/// Non-negative integer count; unparseable input becomes 0, negatives clamp to 0
pub fn count<'de, D>(d: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| {
        v.as_ref()
            .and_then(value_to_int)
            .map(clamp_count)
            .unwrap_or(0)
    })
}

/// Optional non-negative integer; unparseable input means unset
pub fn opt_count<'de, D>(d: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| v.as_ref().and_then(value_to_int).map(clamp_count))
}

/// Signed integer; unparseable input becomes 0
pub fn int<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| v.as_ref().and_then(value_to_int).unwrap_or(0))
}

/// Epoch milliseconds; only numeric input is accepted, negatives are dropped
pub fn opt_millis<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| match v {
        Some(Value::Number(n)) => value_to_int(&Value::Number(n)).filter(|ms| *ms >= 0),
        _ => None,
    })
}

/// Fractional seconds; only numeric input is accepted, negatives clamp to 0
pub fn opt_seconds<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| match v {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0)),
        _ => None,
    })
}

/// Array that may be null, missing or not an array at all
pub fn vec_or_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(d)? {
        Some(items @ Value::Array(_)) => serde_json::from_value(items).map_err(de::Error::custom),
        _ => Ok(Vec::new()),
    }
}

/// Array of names; every element is stringified
pub fn string_list<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(d).map(|v| match v {
        Some(Value::Array(items)) => items.into_iter().map(value_to_string).collect(),
        _ => Vec::new(),
    })
}

/// Nested object that is dropped when it is not an object or does not parse
pub fn opt_boxed<'de, D, T>(d: D) -> Result<Option<Box<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Option::<Value>::deserialize(d).map(|v| match v {
        Some(obj @ Value::Object(_)) => serde_json::from_value::<T>(obj).ok().map(Box::new),
        _ => None,
    })
}
