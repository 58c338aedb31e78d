//! Custom error types for restful-admin
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions. Client-facing failures (not found,
//! permission denied, validation) are distinguished from faults that the
//! host is expected to handle itself.

use thiserror::Error;

use crate::schema::ValidationErrors;

/// The main error type for restful-admin operations
#[derive(Error, Debug)]
pub enum AdminError {
    /// A model was registered twice
    #[error("The model {0} is already registered")]
    AlreadyRegistered(String),

    /// A model was unregistered or looked up without being registered
    #[error("The model {0} is not registered")]
    NotRegistered(String),

    /// A model that cannot be instantiated was offered for registration
    #[error("The model {0} is abstract, so it cannot be registered with admin.")]
    InvalidModel(String),

    /// Record or route not found
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// The caller is not allowed to perform the action
    #[error("Permission denied")]
    PermissionDenied,

    /// Payload failed schema validation
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// The route exists but does not accept the method
    #[error("Method \"{0}\" not allowed.")]
    MethodNotAllowed(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl AdminError {
    /// Create a "not found" error for a record of the given model
    pub fn record_not_found(model: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: model.into(),
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for an unmatched route
    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Route".into(),
            identifier: path.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error should be answered with a client-error response
    /// rather than propagated to the host
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::PermissionDenied
                | Self::Validation(_)
                | Self::MethodNotAllowed(_)
        )
    }
}

impl From<std::io::Error> for AdminError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<ValidationErrors> for AdminError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Result type alias for restful-admin operations
pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdminError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_registration_errors() {
        let err = AdminError::AlreadyRegistered("Widget".into());
        assert_eq!(err.to_string(), "The model Widget is already registered");

        let err = AdminError::NotRegistered("Widget".into());
        assert_eq!(err.to_string(), "The model Widget is not registered");
    }

    #[test]
    fn test_not_found_error() {
        let err = AdminError::record_not_found("widget", "42");
        assert_eq!(err.to_string(), "widget not found: 42");
        assert!(err.is_not_found());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_faults_are_not_client_errors() {
        assert!(!AdminError::Storage("disk full".into()).is_client_error());
        assert!(!AdminError::InvalidModel("Base".into()).is_client_error());
        assert!(AdminError::PermissionDenied.is_client_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let admin_err: AdminError = io_err.into();
        assert!(matches!(admin_err, AdminError::Io(_)));
    }
}
