//! Audit entry formatting

use crate::audit::AuditEntry;

/// Format audit entries, newest last, one per line
pub fn format_audit_list(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
    }
    output
}

/// Format one entry with every recorded detail
pub fn format_audit_details(entry: &AuditEntry) -> String {
    let mut output = String::new();
    output.push_str(&format!("Entry:        {}\n", entry.id));
    output.push_str(&format!(
        "Time:         {}\n",
        entry.action_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "User:         {}\n",
        entry
            .user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    ));
    output.push_str(&format!("Action:       {}\n", entry.action_flag));
    output.push_str(&format!("Content type: {}\n", entry.content_type));
    output.push_str(&format!("Object:       {} ({})\n", entry.object_repr, entry.object_id));

    let message = entry.message_text();
    if !message.is_empty() {
        output.push_str(&format!("Message:      {}\n", message));
    }
    if let Some(diff) = &entry.diff_summary {
        output.push_str(&format!("Changes:      {}\n", diff));
    }
    output
}
