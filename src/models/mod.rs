//! Core data models for restful-admin
//!
//! This module contains the model description types shared by every
//! registered record type, the caller identity, and the demo model.

pub mod ids;
pub mod meta;
pub mod user;
pub mod widget;

pub use ids::EntryId;
pub use meta::{FieldKind, FieldSpec, Model, ModelMeta, RecordId};
pub use user::User;
pub use widget::Widget;
