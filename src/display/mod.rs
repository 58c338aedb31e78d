//! Display formatting for terminal output
//!
//! Renders route tables, audit entries and responses for the command-line
//! front end.

pub mod audit;
pub mod response;
pub mod routes;

pub use audit::{format_audit_details, format_audit_list};
pub use response::format_response;
pub use routes::format_route_table;
