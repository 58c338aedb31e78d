//! Access policies
//!
//! A handler runs every configured policy before an action and again for
//! the fetched record on detail actions; all of them must allow the
//! request.

use crate::handler::Handler;
use crate::http::Request;
use crate::models::Model;

/// A check applied to every request a handler serves
pub trait AccessPolicy<R: Model>: Send + Sync {
    /// Collection-level check, before any record is fetched
    fn has_permission(&self, _request: &Request, _handler: &Handler<R>, _action: &str) -> bool {
        true
    }

    /// Object-level check against the fetched record
    fn has_object_permission(
        &self,
        _request: &Request,
        _handler: &Handler<R>,
        _action: &str,
        _obj: &R,
    ) -> bool {
        true
    }
}

/// Authorizes through the handler's permission map
#[derive(Debug, Clone, Copy, Default)]
pub struct HasPermissionAccess;

impl<R: Model> AccessPolicy<R> for HasPermissionAccess {
    fn has_permission(&self, request: &Request, handler: &Handler<R>, action: &str) -> bool {
        handler.has_perm_action(action, request, None)
    }

    fn has_object_permission(
        &self,
        request: &Request,
        handler: &Handler<R>,
        action: &str,
        obj: &R,
    ) -> bool {
        handler.has_perm_action(action, request, Some(obj))
    }
}

/// Allows only staff users
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAdminUser;

impl<R: Model> AccessPolicy<R> for IsAdminUser {
    fn has_permission(&self, request: &Request, _handler: &Handler<R>, _action: &str) -> bool {
        request.user.is_active && request.user.is_staff
    }
}
