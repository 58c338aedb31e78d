//! Caller identity
//!
//! The identity of whoever issued a request, with the permission codes
//! granted to them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The caller of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key, `None` for anonymous callers
    pub id: Option<u64>,

    pub username: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Staff users pass the `IsAdminUser` policy
    #[serde(default)]
    pub is_staff: bool,

    /// Active superusers hold every permission
    #[serde(default)]
    pub is_superuser: bool,

    /// Granted permission codes, e.g. `shop.add_widget`
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Create an active user without any permissions
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            username: username.into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            permissions: BTreeSet::new(),
        }
    }

    /// An unauthenticated caller
    pub fn anonymous() -> Self {
        Self {
            id: None,
            username: String::new(),
            is_active: false,
            is_staff: false,
            is_superuser: false,
            permissions: BTreeSet::new(),
        }
    }

    /// Create an active superuser
    pub fn superuser(id: u64, username: impl Into<String>) -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
            ..Self::new(id, username)
        }
    }

    pub fn with_permission(mut self, code: impl Into<String>) -> Self {
        self.permissions.insert(code.into());
        self
    }

    pub fn with_permissions<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }

    /// Check whether the user holds a permission code
    pub fn has_perm(&self, code: &str) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_superuser || self.permissions.contains(code)
    }
}

impl Default for User {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            write!(f, "AnonymousUser")
        } else {
            write!(f, "{}", self.username)
        }
    }
}
