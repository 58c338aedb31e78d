//! Path management for restful-admin
//!
//! Provides XDG-compliant path resolution for settings, record data and the
//! audit log.
//!
//! ## Path Resolution Order
//!
//! 1. `RESTFUL_ADMIN_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/restful-admin` or `~/.config/restful-admin`
//! 3. Windows: `%APPDATA%\restful-admin`

use std::path::PathBuf;

use crate::error::AdminError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "RESTFUL_ADMIN_DATA_DIR";

/// Manages all paths used by restful-admin
#[derive(Debug, Clone)]
pub struct AdminPaths {
    /// Base directory for all restful-admin data
    base_dir: PathBuf,
}

impl AdminPaths {
    /// Create a new AdminPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, AdminError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create AdminPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding one JSON file per registered model
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the append-only audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the storage file for a model, keyed by its lowercase name
    pub fn model_file(&self, model_name: &str) -> PathBuf {
        self.data_dir().join(format!("{}.json", model_name))
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), AdminError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| AdminError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| AdminError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if the site has been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, AdminError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                AdminError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("restful-admin"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, AdminError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| AdminError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("restful-admin"))
}
