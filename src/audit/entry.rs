//! Audit entry data structures
//!
//! Defines the action kinds, the structured change message and the entry
//! format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EntryId, ModelMeta};

/// Kind of change recorded by an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFlag {
    /// Record was created
    Addition,
    /// Record was changed
    Change,
    /// Record was deleted
    Deletion,
}

impl ActionFlag {
    /// Numeric code, 1 for additions through 3 for deletions
    pub fn code(&self) -> u8 {
        match self {
            ActionFlag::Addition => 1,
            ActionFlag::Change => 2,
            ActionFlag::Deletion => 3,
        }
    }
}

impl std::fmt::Display for ActionFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionFlag::Addition => write!(f, "ADDITION"),
            ActionFlag::Change => write!(f, "CHANGE"),
            ActionFlag::Deletion => write!(f, "DELETION"),
        }
    }
}

/// One element of an entry's change message
///
/// Serialized as `{"added": {...}}`, `{"changed": {...}}` or
/// `{"deleted": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMessage {
    Added {
        name: String,
        object: String,
    },
    Changed {
        name: String,
        object: String,
        fields: Vec<String>,
    },
    Deleted {
        name: String,
        object: String,
    },
}

impl ChangeMessage {
    pub fn added(meta: &ModelMeta, object: impl Into<String>) -> Self {
        Self::Added {
            name: meta.verbose_name.clone(),
            object: object.into(),
        }
    }

    pub fn changed(meta: &ModelMeta, object: impl Into<String>, fields: Vec<String>) -> Self {
        Self::Changed {
            name: meta.verbose_name.clone(),
            object: object.into(),
            fields,
        }
    }

    pub fn deleted(meta: &ModelMeta, object: impl Into<String>) -> Self {
        Self::Deleted {
            name: meta.verbose_name.clone(),
            object: object.into(),
        }
    }

    /// Render as a sentence, e.g. `Changed name and active for widget "Gear".`
    pub fn to_sentence(&self) -> String {
        match self {
            Self::Added { name, object } => format!("Added {} \"{}\".", name, object),
            Self::Changed {
                name,
                object,
                fields,
            } => {
                if fields.is_empty() {
                    format!("No fields changed for {} \"{}\".", name, object)
                } else {
                    format!("Changed {} for {} \"{}\".", join_words(fields), name, object)
                }
            }
            Self::Deleted { name, object } => format!("Deleted {} \"{}\".", name, object),
        }
    }
}

fn join_words(words: &[String]) -> String {
    match words {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: EntryId,

    /// When the action was recorded (UTC)
    pub action_time: DateTime<Utc>,

    /// Primary key of the acting user, `None` for anonymous callers
    pub user_id: Option<u64>,

    /// Model label of the target, e.g. `models.widget`
    pub content_type: String,

    /// Primary key of the target, as a string
    pub object_id: String,

    /// Display string of the target at the time of the action
    pub object_repr: String,

    pub action_flag: ActionFlag,

    #[serde(default)]
    pub change_message: Vec<ChangeMessage>,

    /// Human-readable field diff for changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    pub fn new(
        action_flag: ActionFlag,
        user_id: Option<u64>,
        meta: &ModelMeta,
        object_id: impl Into<String>,
        object_repr: impl Into<String>,
        change_message: Vec<ChangeMessage>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            action_time: Utc::now(),
            user_id,
            content_type: meta.label(),
            object_id: object_id.into(),
            object_repr: object_repr.into(),
            action_flag,
            change_message,
            diff_summary: None,
        }
    }

    pub fn with_diff_summary(mut self, summary: Option<String>) -> Self {
        self.diff_summary = summary;
        self
    }

    pub fn is_addition(&self) -> bool {
        self.action_flag == ActionFlag::Addition
    }

    pub fn is_change(&self) -> bool {
        self.action_flag == ActionFlag::Change
    }

    pub fn is_deletion(&self) -> bool {
        self.action_flag == ActionFlag::Deletion
    }

    /// Field names listed by the entry's change message
    pub fn changed_fields(&self) -> Vec<String> {
        self.change_message
            .iter()
            .flat_map(|m| match m {
                ChangeMessage::Changed { fields, .. } => fields.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// The change message rendered as text
    pub fn message_text(&self) -> String {
        self.change_message
            .iter()
            .map(ChangeMessage::to_sentence)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let user = self
            .user_id
            .map(|id| format!("user {}", id))
            .unwrap_or_else(|| "anonymous".to_string());

        let mut output = format!(
            "[{}] {} {} {} ({}) by {}",
            self.action_time.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action_flag,
            self.content_type,
            self.object_id,
            self.object_repr,
            user
        );

        let message = self.message_text();
        if !message.is_empty() {
            output.push_str(&format!("\n  {}", message));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}
