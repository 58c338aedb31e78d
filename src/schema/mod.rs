//! Input/output schemas
//!
//! A [`Schema`] is the list of fields a handler accepts and renders. The
//! default schema of a model covers every declared field; handlers may be
//! configured with narrower ones.

pub mod fields;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{AdminError, AdminResult};
use crate::models::{FieldSpec, ModelMeta};

/// Key under which errors not tied to a single field are reported
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field-level validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors consisting of one message not tied to a field
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn extend_field(&mut self, field: impl Into<String>, messages: Vec<String>) {
        self.0.entry(field.into()).or_default().extend(messages);
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_value(&self) -> Value {
        json!(self.0)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Field list used to validate input and render records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Schema covering every declared field of a model
    pub fn for_model(meta: &ModelMeta) -> Self {
        Self::new(
            format!("{}ModelSerializer", meta.object_name),
            meta.fields.clone(),
        )
    }

    /// Schema restricted to the named fields, in the given order
    pub fn with_fields(meta: &ModelMeta, names: &[&str]) -> AdminResult<Self> {
        let fields = names
            .iter()
            .map(|name| {
                meta.get_field(name).cloned().ok_or_else(|| {
                    AdminError::Config(format!(
                        "Field name `{}` is not valid for model `{}`.",
                        name, meta.object_name
                    ))
                })
            })
            .collect::<AdminResult<Vec<_>>>()?;
        Ok(Self::new(format!("{}ModelSerializer", meta.object_name), fields))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate an input payload
    ///
    /// Returns the cleaned values of the writable fields that were
    /// submitted, in schema order. With `partial`, missing required fields
    /// are not an error. Unknown keys are ignored.
    pub fn validate(
        &self,
        data: &Value,
        partial: bool,
    ) -> Result<Map<String, Value>, ValidationErrors> {
        let input = match data {
            Value::Object(map) => map,
            other => {
                return Err(ValidationErrors::non_field(format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(other)
                )))
            }
        };

        let mut cleaned = Map::new();
        let mut errors = ValidationErrors::new();

        for field in self.fields.iter().filter(|f| f.is_writable()) {
            match input.get(&field.name) {
                Some(raw) => match fields::clean_value(field, raw) {
                    Ok(value) => {
                        cleaned.insert(field.name.clone(), value);
                    }
                    Err(messages) => errors.extend_field(field.name.clone(), messages),
                },
                None if field.required && !partial => {
                    errors.add(field.name.clone(), fields::REQUIRED)
                }
                None => {}
            }
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }

    /// Render a record using only this schema's fields
    pub fn to_representation<T: Serialize>(&self, record: &T) -> AdminResult<Value> {
        let mut object = match serde_json::to_value(record)? {
            Value::Object(object) => object,
            other => return Ok(other),
        };

        let mut out = Map::new();
        for field in &self.fields {
            if let Some(v) = object.remove(&field.name) {
                out.insert(field.name.clone(), v);
            }
        }
        Ok(Value::Object(out))
    }

    /// Describe every field for metadata responses
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        for field in &self.fields {
            let mut info = Map::new();
            info.insert("type".into(), json!(field.kind.label()));
            info.insert("required".into(), json!(field.required && field.is_writable()));
            info.insert("read_only".into(), json!(!field.is_writable()));
            info.insert("label".into(), json!(field.label()));
            if let crate::models::FieldKind::Char { max_length } = field.kind {
                info.insert("max_length".into(), json!(max_length));
            }
            out.insert(field.name.clone(), Value::Object(info));
        }
        Value::Object(out)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
