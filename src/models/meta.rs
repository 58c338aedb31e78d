//! Model metadata and the `Model` trait
//!
//! Every record type served by the admin site describes itself through a
//! [`ModelMeta`]: its application label, names used for routes and
//! permission codes, human-readable display names, and the ordered list
//! of persisted fields.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Primary key type for all records
pub type RecordId = u64;

/// Storage kind of a single field, used for input validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldKind {
    /// Bounded string
    Char { max_length: usize },
    /// Unbounded string
    Text,
    Integer,
    Float,
    Boolean,
    /// RFC 3339 timestamp carried as a string
    DateTime,
    /// Any JSON value
    Json,
}

impl FieldKind {
    /// Name of the kind as reported by metadata responses
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Char { .. } | FieldKind::Text => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::DateTime => "datetime",
            FieldKind::Json => "json",
        }
    }
}

/// Declaration of one persisted field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allow_null: bool,
    #[serde(default)]
    pub allow_blank: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Human-readable label, defaults to the name with underscores as spaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose_name: Option<String>,
}

impl FieldSpec {
    /// Create an optional, writable field
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_key: false,
            required: false,
            allow_null: false,
            allow_blank: false,
            read_only: false,
            verbose_name: None,
        }
    }

    /// An auto-assigned integer primary key
    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            primary_key: true,
            read_only: true,
            ..Self::new(name, FieldKind::Integer)
        }
    }

    pub fn char(name: impl Into<String>, max_length: usize) -> Self {
        Self::new(name, FieldKind::Char { max_length })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = Some(name.into());
        self
    }

    /// The label shown in metadata responses
    pub fn label(&self) -> String {
        self.verbose_name
            .clone()
            .unwrap_or_else(|| self.name.replace('_', " "))
    }

    /// Whether input for this field is accepted at all
    pub fn is_writable(&self) -> bool {
        !(self.read_only || self.primary_key)
    }
}

/// Identity and shape of a model type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub app_label: String,
    /// Type name, e.g. `TestModel`
    pub object_name: String,
    /// Lowercase type name, used for routes and permission codenames
    pub model_name: String,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    pub fields: Vec<FieldSpec>,
    /// Abstract models describe shared fields and cannot be served
    #[serde(default)]
    pub abstract_model: bool,
}

impl ModelMeta {
    /// Create metadata with display names derived from the type name
    pub fn new(app_label: impl Into<String>, object_name: impl Into<String>) -> Self {
        let object_name = object_name.into();
        let verbose_name = camel_case_to_spaces(&object_name);
        Self {
            app_label: app_label.into(),
            model_name: object_name.to_lowercase(),
            verbose_name_plural: format!("{}s", verbose_name),
            verbose_name,
            object_name,
            fields: Vec::new(),
            abstract_model: false,
        }
    }

    /// Override the singular display name
    ///
    /// The plural is re-derived unless it was already set explicitly.
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        let derived_plural = format!("{}s", self.verbose_name);
        self.verbose_name = name.into();
        if self.verbose_name_plural == derived_plural {
            self.verbose_name_plural = format!("{}s", self.verbose_name);
        }
        self
    }

    pub fn verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = name.into();
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn abstract_model(mut self) -> Self {
        self.abstract_model = true;
        self
    }

    /// `app_label.model_name`, used as the audit content type
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Permission code for an action verb such as `add` or `view`
    pub fn permission_code(&self, verb: &str) -> String {
        format!("{}.{}_{}", self.app_label, verb, self.model_name)
    }

    /// Name of the primary key field, `id` when none is declared
    pub fn pk_name(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.primary_key)
            .map(|f| f.name.as_str())
            .unwrap_or("id")
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// A record type that can be registered with an admin site
///
/// `Display` provides the record's display string, recorded in audit
/// entries as the object representation.
pub trait Model:
    Serialize + DeserializeOwned + Clone + fmt::Display + Send + Sync + 'static
{
    /// Describe the model
    fn meta() -> ModelMeta;

    /// Primary key of this record
    fn pk(&self) -> RecordId;

    /// Assign the primary key, called by storage on insert
    fn set_pk(&mut self, pk: RecordId);

    /// Drop any related objects loaded alongside this record
    fn clear_related_cache(&mut self) {}
}

/// Split a CamelCase type name into lowercase words
fn camel_case_to_spaces(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }
        out.extend(c.to_lowercase());
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let meta = ModelMeta::new("models", "TestModel");
        assert_eq!(meta.model_name, "testmodel");
        assert_eq!(meta.verbose_name, "test model");
        assert_eq!(meta.verbose_name_plural, "test models");
        assert_eq!(meta.label(), "models.testmodel");
    }

    #[test]
    fn test_acronym_names() {
        assert_eq!(camel_case_to_spaces("HTTPRequest"), "http request");
        assert_eq!(camel_case_to_spaces("Widget"), "widget");
    }

    #[test]
    fn test_verbose_name_overrides() {
        let meta = ModelMeta::new("models", "TestModel").verbose_name("sample");
        assert_eq!(meta.verbose_name, "sample");
        assert_eq!(meta.verbose_name_plural, "samples");

        let meta = ModelMeta::new("models", "TestModel")
            .verbose_name_plural("test data")
            .verbose_name("test datum");
        assert_eq!(meta.verbose_name_plural, "test data");
    }

    #[test]
    fn test_permission_code() {
        let meta = ModelMeta::new("shop", "Widget");
        assert_eq!(meta.permission_code("add"), "shop.add_widget");
        assert_eq!(meta.permission_code("view"), "shop.view_widget");
    }

    #[test]
    fn test_pk_name() {
        let meta = ModelMeta::new("shop", "Widget")
            .field(FieldSpec::primary_key("widget_id"))
            .field(FieldSpec::char("name", 100));
        assert_eq!(meta.pk_name(), "widget_id");
        assert!(!meta.get_field("widget_id").unwrap().is_writable());
        assert_eq!(meta.field_names(), vec!["widget_id", "name"]);

        assert_eq!(ModelMeta::new("shop", "Widget").pk_name(), "id");
    }
}
