//! Raw filter values to typed [`Value`]s.
//!
//! Conditions carry their value as a string. A [`Deserializer`] turns that string into a
//! value of the target [`Type`]; the bundled [`json`] deserializer parses it as JSON.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use thiserror::Error;

use crate::value::{EnumValue, Type, Value, ValueKind};

pub type DeserializeError = Box<dyn std::error::Error + Send + Sync>;

pub type Deserializer = Arc<dyn Fn(&str, &Type) -> Result<Value, DeserializeError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum JsonValueError {
    #[error("null is not allowed for non-nullable {0}")]
    NullNotAllowed(String),
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: &'static str },
    #[error("{value} is not a defined {name} value")]
    UndefinedEnum { name: &'static str, value: String },
    #[error("invalid date-time {raw:?}: {source}")]
    DateTime {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// The bundled JSON deserializer.
#[must_use]
pub fn json() -> Deserializer {
    Arc::new(from_json)
}

/// Parses `raw` as JSON and converts it to `ty`.
///
/// # Errors
/// Returns an error if `raw` is not valid JSON or does not fit `ty`.
pub fn from_json(raw: &str, ty: &Type) -> Result<Value, DeserializeError> {
    let parsed: Json = serde_json::from_str(raw)?;
    Ok(value_from_json(&parsed, ty)?)
}

/// Converts an already-parsed JSON value to `ty`.
///
/// # Errors
/// Returns an error if the JSON shape does not fit `ty`.
pub fn value_from_json(json: &Json, ty: &Type) -> Result<Value, JsonValueError> {
    match (ty, json) {
        (Type::Value(_), Json::Null) => Err(JsonValueError::NullNotAllowed(ty.to_string())),
        (_, Json::Null) => Ok(Value::Null),
        (Type::Array(kind), Json::Array(items)) => items
            .iter()
            .map(|item| scalar_from_json(item, *kind))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        (Type::Array(_), other) => Err(mismatch(ty, other)),
        (_, other) => scalar_from_json(other, ty.kind()),
    }
}

fn scalar_from_json(json: &Json, kind: ValueKind) -> Result<Value, JsonValueError> {
    let found = || JsonValueError::Mismatch { expected: kind.to_string(), found: json_kind(json) };
    match kind {
        ValueKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(found),
        ValueKind::Int => json.as_i64().map(Value::Int).ok_or_else(found),
        ValueKind::Float => json.as_f64().map(Value::Float).ok_or_else(found),
        ValueKind::Text => json.as_str().map(|s| Value::Text(s.to_string())).ok_or_else(found),
        ValueKind::DateTime => {
            let raw = json.as_str().ok_or_else(found)?;
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|source| JsonValueError::DateTime { raw: raw.to_string(), source })
        }
        ValueKind::Enum(def) => {
            let discriminant = match json {
                Json::Number(n) => n.as_i64().ok_or_else(found)?,
                Json::String(s) => def
                    .discriminant(s)
                    .or_else(|| s.trim().parse::<i64>().ok())
                    .ok_or_else(|| JsonValueError::UndefinedEnum { name: def.name, value: s.clone() })?,
                _ => return Err(found()),
            };
            if def.is_defined(discriminant) {
                Ok(Value::Enum(EnumValue::new(def, discriminant)))
            } else {
                Err(JsonValueError::UndefinedEnum { name: def.name, value: discriminant.to_string() })
            }
        }
    }
}

fn mismatch(ty: &Type, json: &Json) -> JsonValueError {
    JsonValueError::Mismatch { expected: ty.to_string(), found: json_kind(json) }
}

const fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
