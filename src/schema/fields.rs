//! Per-field input coercion
//!
//! Turns a raw JSON value into the value stored for a field, or the list of
//! messages explaining why it was rejected.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use crate::models::{FieldKind, FieldSpec};

pub const REQUIRED: &str = "This field is required.";
pub const NULL: &str = "This field may not be null.";
pub const BLANK: &str = "This field may not be blank.";

/// Validate and normalize the value submitted for `spec`
pub fn clean_value(spec: &FieldSpec, value: &Value) -> Result<Value, Vec<String>> {
    if value.is_null() {
        return if spec.allow_null {
            Ok(Value::Null)
        } else {
            Err(vec![NULL.to_string()])
        };
    }

    match spec.kind {
        FieldKind::Char { max_length } => {
            let s = clean_string(spec, value)?;
            let len = s.chars().count();
            if len > max_length {
                return Err(vec![format!(
                    "Ensure this field has no more than {} characters.",
                    max_length
                )]);
            }
            Ok(Value::String(s))
        }
        FieldKind::Text => clean_string(spec, value).map(Value::String),
        FieldKind::Integer => clean_integer(value)
            .map(|n| Value::Number(n.into()))
            .ok_or_else(|| vec!["A valid integer is required.".to_string()]),
        FieldKind::Float => clean_float(value)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| vec!["A valid number is required.".to_string()]),
        FieldKind::Boolean => clean_bool(value)
            .map(Value::Bool)
            .ok_or_else(|| vec!["Must be a valid boolean.".to_string()]),
        FieldKind::DateTime => clean_datetime(value).map(Value::String).ok_or_else(|| {
            vec![
                "Datetime has wrong format. Use one of these formats instead: \
                 YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z]."
                    .to_string(),
            ]
        }),
        FieldKind::Json => Ok(value.clone()),
    }
}

fn clean_string(spec: &FieldSpec, value: &Value) -> Result<String, Vec<String>> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(vec!["Not a valid string.".to_string()]),
    };
    if s.is_empty() && !spec.allow_blank {
        return Err(vec![BLANK.to_string()]);
    }
    Ok(s)
}

fn clean_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clean_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clean_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn clean_datetime(value: &Value) -> Option<String> {
    let s = value.as_str()?;
    let parsed = DateTime::parse_from_rfc3339(s.trim()).ok()?;
    Some(
        parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
    )
}
