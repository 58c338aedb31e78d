//! Permission resolution
//!
//! Each handler owns a permission map from action name to
//! [`PermissionRule`]. The map starts from defaults derived from the
//! model's identity (`<app_label>.<verb>_<model_name>`), then handler
//! overrides, then the rule attached to an extra action.
//!
//! Resolution order for one action:
//!
//! 1. `OPTIONS` requests and the `metadata` action are always allowed
//! 2. An empty action falls back to the configured default
//! 3. An action missing from the map falls back to the configured default
//! 4. `Predicate` rules are called with the handler, action, request and
//!    object; `Fixed` rules return their value; `Code` rules ask the user

pub mod policy;

pub use policy::{AccessPolicy, HasPermissionAccess, IsAdminUser};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::handler::Handler;
use crate::http::{Method, Request};
use crate::models::{Model, ModelMeta};

/// Name of the introspection action
pub const METADATA_ACTION: &str = "metadata";

/// Custom authorization logic: `(handler, action, request, object)`
pub type PermissionPredicate<R> =
    Arc<dyn Fn(&Handler<R>, &str, &Request, Option<&R>) -> bool + Send + Sync>;

/// How one action is authorized
pub enum PermissionRule<R: Model> {
    /// Always allow or always deny
    Fixed(bool),
    /// Require the user to hold a permission code
    Code(String),
    /// Delegate to custom logic
    Predicate(PermissionPredicate<R>),
}

impl<R: Model> PermissionRule<R> {
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code(code.into())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Handler<R>, &str, &Request, Option<&R>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Evaluate the rule
    pub fn evaluate(
        &self,
        handler: &Handler<R>,
        action: &str,
        request: &Request,
        obj: Option<&R>,
    ) -> bool {
        match self {
            Self::Predicate(predicate) => predicate(handler, action, request, obj),
            Self::Fixed(allowed) => *allowed,
            Self::Code(code) => request.user.has_perm(code),
        }
    }
}

impl<R: Model> Clone for PermissionRule<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(allowed) => Self::Fixed(*allowed),
            Self::Code(code) => Self::Code(code.clone()),
            Self::Predicate(predicate) => Self::Predicate(Arc::clone(predicate)),
        }
    }
}

impl<R: Model> fmt::Debug for PermissionRule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(allowed) => f.debug_tuple("Fixed").field(allowed).finish(),
            Self::Code(code) => f.debug_tuple("Code").field(code).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<R: Model> From<bool> for PermissionRule<R> {
    fn from(allowed: bool) -> Self {
        Self::Fixed(allowed)
    }
}

impl<R: Model> From<&str> for PermissionRule<R> {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

impl<R: Model> From<String> for PermissionRule<R> {
    fn from(code: String) -> Self {
        Self::Code(code)
    }
}

/// Action name to rule
pub type PermissionMap<R> = BTreeMap<String, PermissionRule<R>>;

/// Default rules for the standard actions of a model
///
/// `delete` is kept alongside `destroy`, the action the DELETE method maps
/// to, so overrides written against either name apply.
pub fn default_permission_map<R: Model>(meta: &ModelMeta) -> PermissionMap<R> {
    [
        ("list", "view"),
        ("retrieve", "view"),
        ("create", "add"),
        ("update", "change"),
        ("partial_update", "change"),
        ("delete", "delete"),
        ("destroy", "delete"),
    ]
    .into_iter()
    .map(|(action, verb)| (action.to_string(), PermissionRule::Code(meta.permission_code(verb))))
    .collect()
}

/// Decide whether `request` may perform `action`, optionally on `obj`
///
/// `map` is the effective permission map and `default` the result for
/// actions it does not cover.
pub fn resolve<R: Model>(
    handler: &Handler<R>,
    map: &PermissionMap<R>,
    action: &str,
    request: &Request,
    obj: Option<&R>,
    default: bool,
) -> bool {
    if request.method == Method::Options || action == METADATA_ACTION {
        return true;
    }

    if action.is_empty() {
        return default;
    }

    match map.get(action) {
        Some(rule) => rule.evaluate(handler, action, request, obj),
        None => default,
    }
}
