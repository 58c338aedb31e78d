//! Storage layer for restful-admin
//!
//! Handlers reach records only through the [`Store`] trait. The bundled
//! [`Repository`] keeps records in memory and can mirror them to a JSON
//! file with atomic writes.

pub mod file_io;
pub mod repository;

pub use file_io::{read_json, write_json_atomic};
pub use repository::Repository;

use crate::error::AdminError;
use crate::models::{Model, RecordId};

/// Persistence primitives used by the CRUD handler
pub trait Store<R: Model>: Send + Sync {
    /// Look up a record by primary key
    fn get(&self, pk: RecordId) -> Result<Option<R>, AdminError>;

    /// All records, ordered by primary key
    fn all(&self) -> Result<Vec<R>, AdminError>;

    /// Persist a new record, assigning and returning its primary key
    fn insert(&self, record: R) -> Result<R, AdminError>;

    /// Replace an existing record
    fn update(&self, record: R) -> Result<R, AdminError>;

    /// Remove a record, returning whether it existed
    fn delete(&self, pk: RecordId) -> Result<bool, AdminError>;

    fn count(&self) -> Result<usize, AdminError> {
        Ok(self.all()?.len())
    }
}
