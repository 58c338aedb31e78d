//! Site settings for restful-admin
//!
//! Controls the permission fallback, pagination and the URL prefix under
//! which the generated routes are mounted.

use serde::{Deserialize, Serialize};

use super::paths::AdminPaths;
use crate::error::AdminError;

/// Settings shared by every handler registered on a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Result of a permission check for an action missing from the
    /// permission map
    #[serde(default)]
    pub not_found_permission_default: bool,

    /// Page size for list responses; `None` disables pagination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,

    /// Upper bound for a client-requested `page_size`
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Prefix stripped from incoming paths before route matching
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_max_page_size() -> usize {
    100
}

fn default_url_prefix() -> String {
    "api/".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            not_found_permission_default: false,
            page_size: None,
            max_page_size: default_max_page_size(),
            url_prefix: default_url_prefix(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &AdminPaths) -> Result<Self, AdminError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| AdminError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                AdminError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AdminPaths) -> Result<(), AdminError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AdminError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| AdminError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// The URL prefix normalized to `/prefix/` form, used when building
    /// absolute links such as `Location` headers
    pub fn mount_point(&self) -> String {
        let trimmed = self.url_prefix.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.not_found_permission_default);
        assert_eq!(settings.page_size, None);
        assert_eq!(settings.max_page_size, 100);
        assert_eq!(settings.mount_point(), "/api/");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AdminPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            page_size: Some(25),
            url_prefix: "admin".into(),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.page_size, Some(25));
        assert_eq!(loaded.mount_point(), "/admin/");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"page_size": 10}"#).unwrap();
        assert_eq!(settings.page_size, Some(10));
        assert_eq!(settings.url_prefix, "api/");
        assert_eq!(settings.schema_version, 1);
    }

    #[test]
    fn test_empty_prefix_mounts_at_root() {
        let settings = Settings {
            url_prefix: String::new(),
            ..Settings::default()
        };
        assert_eq!(settings.mount_point(), "/");
    }
}
