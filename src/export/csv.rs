//! CSV export of the audit log, one row per entry

use std::io::Write;

use crate::audit::AuditLog;
use crate::error::{AdminError, AdminResult};

const HEADER: [&str; 9] = [
    "ID",
    "Time",
    "User",
    "Content Type",
    "Object ID",
    "Object",
    "Action",
    "Message",
    "Diff",
];

/// Export every audit entry to CSV
pub fn export_audit_csv<W: Write>(log: &dyn AuditLog, writer: W) -> AdminResult<usize> {
    let entries = log.read_all()?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(HEADER)
        .map_err(|e| AdminError::Export(e.to_string()))?;

    for entry in &entries {
        let user = entry.user_id.map(|id| id.to_string()).unwrap_or_default();
        csv_writer
            .write_record([
                entry.id.to_string(),
                entry.action_time.to_rfc3339(),
                user,
                entry.content_type.clone(),
                entry.object_id.clone(),
                entry.object_repr.clone(),
                entry.action_flag.to_string(),
                entry.message_text(),
                entry.diff_summary.clone().unwrap_or_default(),
            ])
            .map_err(|e| AdminError::Export(e.to_string()))?;
    }

    csv_writer.flush().map_err(|e| AdminError::Export(e.to_string()))?;
    Ok(entries.len())
}
