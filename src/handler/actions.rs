//! Extra actions
//!
//! Custom endpoints attached to a handler next to the standard CRUD
//! operations. A list-level action is routed at `{model}/{url_path}/`, a
//! detail-level one at `{model}/<pk>/{url_path}/` and receives the fetched
//! record.

use std::fmt;
use std::sync::Arc;

use crate::error::AdminResult;
use crate::http::{Method, Request, Response};
use crate::models::Model;
use crate::permission::PermissionRule;

use super::Handler;

/// Body of an extra action; detail actions receive the fetched record
pub type ActionCallback<R> =
    Arc<dyn Fn(&Handler<R>, &Request, Option<R>) -> AdminResult<Response> + Send + Sync>;

/// A named custom endpoint on a handler
pub struct ExtraAction<R: Model> {
    pub name: String,
    pub methods: Vec<Method>,
    pub detail: bool,
    pub url_path: String,
    /// Rule for this action, replacing any map entry of the same name.
    /// `None` still replaces it: only active superusers pass.
    pub permission: Option<PermissionRule<R>>,
    callback: ActionCallback<R>,
}

impl<R: Model> ExtraAction<R> {
    /// Create a GET action routed at its own name
    pub fn new<F>(name: impl Into<String>, detail: bool, callback: F) -> Self
    where
        F: Fn(&Handler<R>, &Request, Option<R>) -> AdminResult<Response> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            url_path: name.clone(),
            name,
            methods: vec![Method::Get],
            detail,
            permission: None,
            callback: Arc::new(callback),
        }
    }

    pub fn methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = methods;
        self
    }

    pub fn url_path(mut self, path: impl Into<String>) -> Self {
        self.url_path = path.into();
        self
    }

    pub fn permission(mut self, rule: impl Into<PermissionRule<R>>) -> Self {
        self.permission = Some(rule.into());
        self
    }

    /// Route name suffix, the action name with dashes
    pub fn url_name(&self) -> String {
        self.name.replace('_', "-")
    }

    pub(crate) fn call(
        &self,
        handler: &Handler<R>,
        request: &Request,
        obj: Option<R>,
    ) -> AdminResult<Response> {
        (self.callback)(handler, request, obj)
    }
}

impl<R: Model> fmt::Debug for ExtraAction<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraAction")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("detail", &self.detail)
            .field("url_path", &self.url_path)
            .field("permission", &self.permission)
            .finish()
    }
}
