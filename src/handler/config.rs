//! Per-model handler configuration
//!
//! Everything a registration may customize about a handler lives in
//! [`HandlerConfig`]; unset values fall back to model-derived defaults.

use std::fmt;
use std::sync::Arc;

use crate::models::Model;
use crate::permission::{AccessPolicy, HasPermissionAccess, PermissionMap, PermissionRule};
use crate::schema::Schema;

use super::actions::ExtraAction;

/// The base set of records a handler operates on
pub struct QuerySet<R> {
    filter: Option<Arc<dyn Fn(&R) -> bool + Send + Sync>>,
}

impl<R> QuerySet<R> {
    /// Every record of the model
    pub fn all() -> Self {
        Self { filter: None }
    }

    /// Records matching a predicate
    pub fn filter<F>(f: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self {
            filter: Some(Arc::new(f)),
        }
    }

    pub fn contains(&self, record: &R) -> bool {
        self.filter.as_ref().map_or(true, |f| f(record))
    }

    pub fn is_all(&self) -> bool {
        self.filter.is_none()
    }
}

impl<R> Clone for QuerySet<R> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
        }
    }
}

impl<R> fmt::Debug for QuerySet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            f.write_str("QuerySet(all)")
        } else {
            f.write_str("QuerySet(filtered)")
        }
    }
}

/// Options applied to one registered model
pub struct HandlerConfig<R: Model> {
    /// Base record set; all records when unset
    pub queryset: Option<QuerySet<R>>,

    /// Schema for list output; every declared field when unset
    pub schema: Option<Schema>,

    /// Schema for create, retrieve and update; `schema` when unset
    pub single_schema: Option<Schema>,

    /// Rules overriding the default permission map
    pub permission_map: PermissionMap<R>,

    /// Policies every request must pass
    pub permission_classes: Vec<Arc<dyn AccessPolicy<R>>>,

    pub extra_actions: Vec<ExtraAction<R>>,

    /// Page size overriding the site setting
    pub page_size: Option<usize>,
}

impl<R: Model> Default for HandlerConfig<R> {
    fn default() -> Self {
        Self {
            queryset: None,
            schema: None,
            single_schema: None,
            permission_map: PermissionMap::new(),
            permission_classes: vec![Arc::new(HasPermissionAccess)],
            extra_actions: Vec::new(),
            page_size: None,
        }
    }
}

impl<R: Model> HandlerConfig<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queryset(mut self, queryset: QuerySet<R>) -> Self {
        self.queryset = Some(queryset);
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn single_schema(mut self, schema: Schema) -> Self {
        self.single_schema = Some(schema);
        self
    }

    /// Override the rule for one action
    pub fn permission(
        mut self,
        action: impl Into<String>,
        rule: impl Into<PermissionRule<R>>,
    ) -> Self {
        self.permission_map.insert(action.into(), rule.into());
        self
    }

    /// Replace the access policies
    pub fn permission_classes(mut self, policies: Vec<Arc<dyn AccessPolicy<R>>>) -> Self {
        self.permission_classes = policies;
        self
    }

    pub fn action(mut self, action: ExtraAction<R>) -> Self {
        self.extra_actions.push(action);
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }
}
