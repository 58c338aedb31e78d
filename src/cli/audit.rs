//! Audit CLI commands
//!
//! Lists, shows and exports the entries recorded by the audit log, and
//! checks previously written exports.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::audit::{AuditLog, AuditLogger};
use crate::display::{format_audit_details, format_audit_list};
use crate::error::{AdminError, AdminResult};
use crate::export::{
    export_audit_csv, export_audit_json, export_audit_yaml, import_from_json, import_from_yaml,
    AuditExport,
};
use crate::models::EntryId;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per entry
    Csv,
    /// JSON with schema version and counts
    Json,
    /// YAML, human-readable
    Yaml,
}

/// Audit subcommands
#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// List recent entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show one entry in full
    Show {
        /// Entry ID (with or without the `log-` prefix)
        id: String,
    },
    /// Export every entry to a file
    Export {
        /// Output file path
        output: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check that a JSON or YAML export is readable and consistent
    Verify {
        /// Export file path
        file: PathBuf,

        /// Export format; guessed from the file extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
    },
}

/// Handle an audit command
pub fn handle_audit_command(log: &AuditLogger, cmd: AuditCommands) -> AdminResult<()> {
    match cmd {
        AuditCommands::List { limit } => {
            let entries = log.read_recent(limit)?;
            println!("{}", format_audit_list(&entries));
        }
        AuditCommands::Show { id } => {
            let entry = log
                .read_all()?
                .into_iter()
                .find(|e| {
                    e.id.to_string() == id
                        || id.parse::<EntryId>().is_ok_and(|parsed| parsed == e.id)
                })
                .ok_or_else(|| AdminError::record_not_found("Audit entry", &id))?;
            print!("{}", format_audit_details(&entry));
        }
        AuditCommands::Export {
            output,
            format,
            pretty,
        } => handle_export(log, output, format, pretty)?,
        AuditCommands::Verify { file, format } => {
            let export = verify_export(&file, format)?;
            println!("Export OK: {}", file.display());
            println!("  Schema version: {}", export.schema_version);
            println!("  Exported at:    {}", export.exported_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!(
                "  Entries:        {} ({} added, {} changed, {} deleted)",
                export.metadata.entry_count,
                export.metadata.addition_count,
                export.metadata.change_count,
                export.metadata.deletion_count
            );
        }
    }
    Ok(())
}

/// Read back a JSON or YAML export, checking its schema version and counts
pub fn verify_export(path: &Path, format: Option<ExportFormat>) -> AdminResult<AuditExport> {
    let format = format.unwrap_or_else(|| match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => ExportFormat::Yaml,
        Some("csv") => ExportFormat::Csv,
        _ => ExportFormat::Json,
    });

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AdminError::Export(format!("Failed to read {}: {}", path.display(), e)))?;

    match format {
        ExportFormat::Json => import_from_json(&contents),
        ExportFormat::Yaml => import_from_yaml(&contents),
        ExportFormat::Csv => Err(AdminError::Export(
            "CSV exports carry no schema version and cannot be verified".into(),
        )),
    }
}

fn handle_export(
    log: &AuditLogger,
    output: PathBuf,
    format: ExportFormat,
    pretty: bool,
) -> AdminResult<()> {
    let file = File::create(&output).map_err(|e| {
        AdminError::Export(format!("Failed to create file {}: {}", output.display(), e))
    })?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => {
            let count = export_audit_csv(log, &mut writer)?;
            println!("Exported {} entries to: {}", count, output.display());
        }
        ExportFormat::Json => {
            export_audit_json(log, &mut writer, pretty)?;
            println!("Audit log exported to: {}", output.display());
        }
        ExportFormat::Yaml => {
            export_audit_yaml(log, &mut writer)?;
            println!("Audit log exported to: {}", output.display());
        }
    }

    Ok(())
}
