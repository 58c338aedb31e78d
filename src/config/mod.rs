//! Configuration module for restful-admin
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Site settings persistence (pagination, permission defaults, URL prefix)

pub mod paths;
pub mod settings;

pub use paths::AdminPaths;
pub use settings::Settings;
