//! YAML export of the audit log, for human review

use std::io::Write;

use crate::audit::AuditLog;
use crate::error::{AdminError, AdminResult};
use crate::export::json::AuditExport;

/// Export the audit log to YAML
pub fn export_audit_yaml<W: Write>(log: &dyn AuditLog, writer: &mut W) -> AdminResult<()> {
    let export = AuditExport::from_log(log)?;

    let header = format!(
        "# restful-admin audit log export\n# Generated: {}\n# App Version: {}\n# Entries: {}\n\n",
        export.exported_at, export.app_version, export.metadata.entry_count
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| AdminError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| AdminError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a YAML export
pub fn import_from_yaml(yaml_str: &str) -> AdminResult<AuditExport> {
    let export: AuditExport =
        serde_yaml::from_str(yaml_str).map_err(|e| AdminError::Export(e.to_string()))?;
    export.validate().map_err(AdminError::Export)?;
    Ok(export)
}
