//! Audit log stores
//!
//! [`AuditLog`] is the append-only sink handlers write to. [`AuditLogger`]
//! writes each entry as one JSON line and flushes immediately;
//! [`MemoryAuditLog`] keeps entries in memory.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{AdminError, AdminResult};

use super::entry::AuditEntry;

/// Append-only store of audit entries
pub trait AuditLog: Send + Sync {
    /// Append one entry
    fn log(&self, entry: &AuditEntry) -> AdminResult<()>;

    /// All entries, oldest first
    fn read_all(&self) -> AdminResult<Vec<AuditEntry>>;

    /// The most recent `count` entries, oldest first
    fn read_recent(&self, count: usize) -> AdminResult<Vec<AuditEntry>> {
        let mut all_entries = self.read_all()?;
        let start = all_entries.len().saturating_sub(count);
        Ok(all_entries.split_off(start))
    }
}

/// Writes audit entries to a line-delimited JSON file
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    fn open_for_append(&self) -> AdminResult<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AdminError::Io(format!("Failed to open audit log: {}", e)))
    }

    /// Get the number of entries in the audit log
    pub fn entry_count(&self) -> AdminResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AdminError::Io(format!("Failed to open audit log: {}", e)))?;

        let count = BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count();

        Ok(count)
    }
}

impl AuditLog for AuditLogger {
    fn log(&self, entry: &AuditEntry) -> AdminResult<()> {
        let mut file = self.open_for_append()?;

        let json = serde_json::to_string(entry)
            .map_err(|e| AdminError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| AdminError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| AdminError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    fn read_all(&self) -> AdminResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AdminError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AdminError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                AdminError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }
}

/// Keeps audit entries in memory
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn log(&self, entry: &AuditEntry) -> AdminResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AdminError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        entries.push(entry.clone());
        Ok(())
    }

    fn read_all(&self) -> AdminResult<Vec<AuditEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AdminError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{ActionFlag, ChangeMessage};
    use crate::models::{Model, Widget};
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        (AuditLogger::new(log_path), temp_dir)
    }

    fn entry(object_id: &str, flag: ActionFlag) -> AuditEntry {
        let meta = Widget::meta();
        AuditEntry::new(
            flag,
            Some(1),
            &meta,
            object_id,
            "Gear",
            vec![ChangeMessage::added(&meta, "Gear")],
        )
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.log(&entry("1", ActionFlag::Addition)).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action_flag, ActionFlag::Addition);
        assert_eq!(entries[0].content_type, "models.widget");
    }

    #[test]
    fn test_entry_count() {
        let (logger, _temp) = create_test_logger();

        for i in 0..3 {
            logger.log(&entry(&i.to_string(), ActionFlag::Change)).unwrap();
        }

        assert_eq!(logger.entry_count().unwrap(), 3);
        assert_eq!(logger.read_all().unwrap().len(), 3);
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();

        for i in 0..10 {
            logger.log(&entry(&i.to_string(), ActionFlag::Addition)).unwrap();
        }

        let recent = logger.read_recent(3).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.object_id.as_str()).collect();
        assert_eq!(ids, vec!["7", "8", "9"]);
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();

        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_survives_restart() {
        let (logger, temp) = create_test_logger();
        logger.log(&entry("1", ActionFlag::Deletion)).unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        let entries = reopened.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_deletion());
    }

    #[test]
    fn test_memory_log() {
        let log = MemoryAuditLog::new();
        assert!(log.is_empty());

        log.log(&entry("1", ActionFlag::Addition)).unwrap();
        log.log(&entry("2", ActionFlag::Change)).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.read_recent(1).unwrap()[0].object_id, "2");
    }
}
