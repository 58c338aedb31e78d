//! restful-admin - generic REST administration endpoints for data models
//!
//! This library exposes registered record types through uniform CRUD
//! endpoints. Every action is authorized through a per-model permission
//! map and every write is recorded in an audit log with a field-level
//! diff of what changed.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and site settings
//! - `error`: Custom error types
//! - `models`: Model metadata, the `Model` trait, users and the demo model
//! - `schema`: Input validation and output rendering
//! - `storage`: Record stores (in memory or JSON file backed)
//! - `permission`: Permission maps and access policies
//! - `audit`: Audit entries, change tracking and audit logs
//! - `http`: Request and response values
//! - `handler`: The generic CRUD handler
//! - `site`: Model registry and request router
//! - `export`: Audit log export (CSV, JSON, YAML)
//! - `display`: Terminal formatting
//! - `cli`: Command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use restful_admin::audit::MemoryAuditLog;
//! use restful_admin::config::Settings;
//! use restful_admin::http::Request;
//! use restful_admin::models::{User, Widget};
//! use restful_admin::site::AdminSite;
//! use restful_admin::storage::Repository;
//!
//! let mut site = AdminSite::new(Settings::default(), Arc::new(MemoryAuditLog::new()));
//! site.register::<Widget>(Arc::new(Repository::in_memory()))?;
//! let router = site.into_router();
//!
//! let request = Request::get("/api/widget/").with_user(User::superuser(1, "root"));
//! let response = router.handle(&request)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod handler;
pub mod http;
pub mod models;
pub mod permission;
pub mod schema;
pub mod site;
pub mod storage;

pub use error::{AdminError, AdminResult};
