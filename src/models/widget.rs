//! Demo model served by the command-line front end

use serde::{Deserialize, Serialize};
use std::fmt;

use super::meta::{FieldKind, FieldSpec, Model, ModelMeta, RecordId};

/// A named item with an optional description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Widget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            active: true,
        }
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Model for Widget {
    fn meta() -> ModelMeta {
        ModelMeta::new("models", "Widget")
            .field(FieldSpec::primary_key("id"))
            .field(FieldSpec::char("name", 100).required())
            .field(FieldSpec::new("description", FieldKind::Text).blank())
            .field(FieldSpec::new("active", FieldKind::Boolean))
    }

    fn pk(&self) -> RecordId {
        self.id
    }

    fn set_pk(&mut self, pk: RecordId) {
        self.id = pk;
    }
}
