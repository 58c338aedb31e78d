//! Audit log export
//!
//! Writes the audit trail in several formats:
//! - CSV: one row per entry (spreadsheet-compatible)
//! - JSON: machine-readable, with schema version and summary counts
//! - YAML: human-readable, same structure as JSON
//!
//! JSON and YAML exports can be read back and checked for consistency.

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_audit_csv;
pub use json::{
    export_audit_json, import_from_json, AuditExport, ExportMetadata, EXPORT_SCHEMA_VERSION,
};
pub use yaml::{export_audit_yaml, import_from_yaml};
