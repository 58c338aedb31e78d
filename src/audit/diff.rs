//! Field-level diffing of record snapshots
//!
//! [`ModelDiff`] captures a snapshot of a record before an update and
//! compares it with the record afterwards. Snapshots hold the model's
//! declared fields in declaration order.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AdminResult;
use crate::models::Model;

/// Field name to value, in declaration order
pub type Snapshot = Map<String, Value>;

/// One changed field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// The set of changed fields between two snapshots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    changes: Vec<FieldChange>,
}

impl Diff {
    /// Compare two snapshots
    ///
    /// Only fields present in both snapshots with unequal values are kept.
    pub fn between(initial: &Snapshot, updated: &Snapshot) -> Self {
        let changes = initial
            .iter()
            .filter_map(|(field, old)| {
                let new = updated.get(field)?;
                (old != new).then(|| FieldChange {
                    field: field.clone(),
                    old: old.clone(),
                    new: new.clone(),
                })
            })
            .collect();
        Self { changes }
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter()
    }

    pub fn fields(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.field.clone()).collect()
    }
}

/// Tracks the changes made to one record over the course of an update
#[derive(Debug, Clone)]
pub struct ModelDiff {
    initial: Snapshot,
    updated: Option<Snapshot>,
    diff: Diff,
}

impl ModelDiff {
    /// Start tracking from the current state of `record`
    pub fn new<R: Model>(record: &R) -> AdminResult<Self> {
        Ok(Self::from_snapshot(snapshot(record)?))
    }

    pub fn from_snapshot(initial: Snapshot) -> Self {
        Self {
            initial,
            updated: None,
            diff: Diff::default(),
        }
    }

    /// Capture the state of `record` after a change
    pub fn record_updated<R: Model>(&mut self, record: &R) -> AdminResult<&mut Self> {
        let snap = snapshot(record)?;
        Ok(self.record_updated_snapshot(snap))
    }

    /// Capture an updated snapshot
    ///
    /// On every call after the first, the previously captured snapshot
    /// becomes the new baseline, so consecutive calls diff consecutive
    /// states.
    pub fn record_updated_snapshot(&mut self, snap: Snapshot) -> &mut Self {
        if let Some(previous) = self.updated.take() {
            self.initial = previous;
        }
        self.diff = Diff::between(&self.initial, &snap);
        self.updated = Some(snap);
        self
    }

    /// Changed fields; empty until an updated snapshot is captured
    pub fn diff(&self) -> &Diff {
        &self.diff
    }

    pub fn has_changed(&self) -> bool {
        !self.diff.is_empty()
    }

    pub fn changed_fields(&self) -> Vec<String> {
        self.diff.fields()
    }

    /// The change to one field, or `None` if it did not change
    pub fn field_diff(&self, field: &str) -> Option<&FieldChange> {
        self.diff.get(field)
    }
}

/// Snapshot the declared fields of a record
///
/// Models without declared fields are snapshotted whole.
pub fn snapshot<R: Model>(record: &R) -> AdminResult<Snapshot> {
    let meta = R::meta();
    let object = to_object(record)?;
    if meta.fields.is_empty() {
        return Ok(object);
    }
    Ok(meta
        .fields
        .iter()
        .filter_map(|f| object.get(&f.name).map(|v| (f.name.clone(), v.clone())))
        .collect())
}

fn to_object<T: Serialize>(record: &T) -> AdminResult<Snapshot> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".into(), other);
            Ok(map)
        }
    }
}

/// Render a diff as `field: old -> new` pairs, or `None` when empty
pub fn summarize(diff: &Diff) -> Option<String> {
    if diff.is_empty() {
        return None;
    }
    Some(
        diff.iter()
            .map(|c| format!("{}: {} -> {}", c.field, format_value(&c.old), format_value(&c.new)))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
