//! Deserializers for fields that arrive either as JSON numbers or strings
//! (numeric primary keys from older rows, form-encoded clients).

use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected id, found {}", other))),
    }
}

pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected id, found {}", other))),
    }
}

/// Integer given as a number or a numeric string. Non-integers are kept as
/// `Err` values for the caller to report, so validation stays in one place.
pub fn opt_integer<'de, D>(deserializer: D) -> Result<Option<Result<i64, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.as_i64().ok_or_else(|| n.to_string())),
        Some(Value::String(s)) => Some(s.trim().parse::<i64>().map_err(|_| s)),
        Some(other) => Some(Err(other.to_string())),
    })
}

pub fn opt_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid price '{}'", s))),
        Some(other) => Err(D::Error::custom(format!("expected price, found {}", other))),
    }
}
