//! Outbound responses

use serde_json::{json, Value};

use crate::error::AdminError;

pub const HTTP_200_OK: u16 = 200;
pub const HTTP_201_CREATED: u16 = 201;
pub const HTTP_204_NO_CONTENT: u16 = 204;
pub const HTTP_400_BAD_REQUEST: u16 = 400;
pub const HTTP_403_FORBIDDEN: u16 = 403;
pub const HTTP_404_NOT_FOUND: u16 = 404;
pub const HTTP_405_METHOD_NOT_ALLOWED: u16 = 405;

const FORBIDDEN_DETAIL: &str = "You do not have permission to perform this action.";
const NOT_FOUND_DETAIL: &str = "Not found.";

/// A response produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body, `None` for empty responses
    pub data: Option<Value>,
}

impl Response {
    pub fn new(status: u16, data: Option<Value>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            data,
        }
    }

    pub fn ok(data: Value) -> Self {
        Self::new(HTTP_200_OK, Some(data))
    }

    pub fn created(data: Value) -> Self {
        Self::new(HTTP_201_CREATED, Some(data))
    }

    pub fn no_content() -> Self {
        Self::new(HTTP_204_NO_CONTENT, None)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Client-error response for an error, or `None` for faults the host
    /// must handle
    ///
    /// Permission failures carry a fixed message that does not reveal which
    /// rule failed.
    pub fn from_error(err: &AdminError) -> Option<Self> {
        let response = match err {
            AdminError::PermissionDenied => {
                Self::new(HTTP_403_FORBIDDEN, Some(json!({"detail": FORBIDDEN_DETAIL})))
            }
            AdminError::NotFound { .. } => {
                Self::new(HTTP_404_NOT_FOUND, Some(json!({"detail": NOT_FOUND_DETAIL})))
            }
            AdminError::Validation(errors) => {
                Self::new(HTTP_400_BAD_REQUEST, Some(errors.to_value()))
            }
            AdminError::MethodNotAllowed(method) => Self::new(
                HTTP_405_METHOD_NOT_ALLOWED,
                Some(json!({"detail": format!("Method \"{}\" not allowed.", method)})),
            ),
            _ => return None,
        };
        Some(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationErrors;

    #[test]
    fn test_forbidden_has_generic_detail() {
        let response = Response::from_error(&AdminError::PermissionDenied).unwrap();
        assert_eq!(response.status, 403);
        assert_eq!(
            response.data,
            Some(json!({"detail": "You do not have permission to perform this action."}))
        );
    }

    #[test]
    fn test_validation_maps_to_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "This field is required.");

        let response = Response::from_error(&AdminError::Validation(errors)).unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(response.data, Some(json!({"name": ["This field is required."]})));
    }

    #[test]
    fn test_faults_have_no_response() {
        assert!(Response::from_error(&AdminError::Storage("boom".into())).is_none());
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let response = Response::no_content().with_header("Location", "/api/widget/1/");
        assert_eq!(response.header("location"), Some("/api/widget/1/"));
        assert!(response.is_success());
    }
}
