//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the admin site.

pub mod audit;
pub mod demo;
pub mod request;
pub mod site;

pub use audit::{handle_audit_command, verify_export, AuditCommands, ExportFormat};
pub use demo::{build_demo_site, DemoSite};
pub use request::{handle_request_command, RequestArgs};
pub use site::{handle_docs_command, handle_routes_command};
