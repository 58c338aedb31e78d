//! JSON export of the audit log, with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditEntry, AuditLog};
use crate::error::{AdminError, AdminResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full audit log export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub entries: Vec<AuditEntry>,

    pub metadata: ExportMetadata,
}

/// Summary counts for reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub entry_count: usize,
    pub addition_count: usize,
    pub change_count: usize,
    pub deletion_count: usize,

    /// Timestamp of the oldest entry
    pub earliest_entry: Option<DateTime<Utc>>,

    /// Timestamp of the newest entry
    pub latest_entry: Option<DateTime<Utc>>,
}

impl AuditExport {
    /// Collect every entry of an audit log
    pub fn from_log(log: &dyn AuditLog) -> AdminResult<Self> {
        Ok(Self::from_entries(log.read_all()?))
    }

    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        let metadata = ExportMetadata {
            entry_count: entries.len(),
            addition_count: entries.iter().filter(|e| e.is_addition()).count(),
            change_count: entries.iter().filter(|e| e.is_change()).count(),
            deletion_count: entries.iter().filter(|e| e.is_deletion()).count(),
            earliest_entry: entries.iter().map(|e| e.action_time).min(),
            latest_entry: entries.iter().map(|e| e.action_time).max(),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            entries,
            metadata,
        }
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        if self.metadata.entry_count != self.entries.len() {
            return Err(format!(
                "Entry count mismatch: metadata says {}, found {}",
                self.metadata.entry_count,
                self.entries.len()
            ));
        }

        Ok(())
    }
}

/// Export the audit log to JSON
pub fn export_audit_json<W: Write>(
    log: &dyn AuditLog,
    writer: &mut W,
    pretty: bool,
) -> AdminResult<()> {
    let export = AuditExport::from_log(log)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| AdminError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a JSON export
pub fn import_from_json(json_str: &str) -> AdminResult<AuditExport> {
    let export: AuditExport =
        serde_json::from_str(json_str).map_err(|e| AdminError::Export(e.to_string()))?;
    export.validate().map_err(AdminError::Export)?;
    Ok(export)
}
