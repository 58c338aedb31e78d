//! Audit logging for restful-admin
//!
//! Every create, update and delete performed through a handler appends an
//! entry to an append-only audit log.
//!
//! # Architecture
//!
//! - `AuditEntry`: actor, target model and object, action kind and a
//!   structured change message.
//! - `AuditLog`: the append-only store, implemented by `AuditLogger`
//!   (JSON lines on disk) and `MemoryAuditLog`.
//! - `ModelDiff`: compares a record before and after an update to list the
//!   changed fields.
//!
//! # Example
//!
//! ```rust,ignore
//! use restful_admin::audit::{AuditLogger, ModelDiff};
//!
//! let mut helper = ModelDiff::new(&widget)?;
//! widget.name = "renamed".into();
//! helper.record_updated(&widget)?;
//! assert_eq!(helper.changed_fields(), vec!["name"]);
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::{snapshot, summarize, Diff, FieldChange, ModelDiff, Snapshot};
pub use entry::{ActionFlag, AuditEntry, ChangeMessage};
pub use logger::{AuditLog, AuditLogger, MemoryAuditLog};
