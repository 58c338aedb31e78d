//! Admin site registry
//!
//! An [`AdminSite`] collects model registrations and manual routes. Once
//! configuration is complete it is consumed by [`AdminSite::into_router`],
//! which fills in handler defaults and produces the immutable
//! [`AdminRouter`] that serves requests.

pub mod docs;
mod endpoint;
pub mod router;

pub use docs::generate_docs;
pub use router::{AdminRouter, ExtraRoute, Route, RouteCallback, PK_SEGMENT};

use std::any::TypeId;
use std::sync::Arc;

use tracing::info;

use crate::audit::AuditLog;
use crate::config::Settings;
use crate::error::{AdminError, AdminResult};
use crate::handler::{Handler, HandlerConfig};
use crate::http::Method;
use crate::models::{Model, ModelMeta};
use crate::permission::METADATA_ACTION;
use crate::storage::Store;

use endpoint::Endpoint;
use router::RouteTarget;

struct Registration {
    type_id: TypeId,
    endpoint: Box<dyn Endpoint>,
}

/// Registry of served models
pub struct AdminSite {
    settings: Settings,
    audit: Arc<dyn AuditLog>,
    registry: Vec<Registration>,
    extra_routes: Vec<ExtraRoute>,
}

impl AdminSite {
    pub fn new(settings: Settings, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            settings,
            audit,
            registry: Vec::new(),
            extra_routes: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register a model with the default handler configuration
    pub fn register<R: Model>(&mut self, store: Arc<dyn Store<R>>) -> AdminResult<()> {
        self.register_with(store, HandlerConfig::default())
    }

    /// Register a model with a custom handler configuration
    pub fn register_with<R: Model>(
        &mut self,
        store: Arc<dyn Store<R>>,
        config: HandlerConfig<R>,
    ) -> AdminResult<()> {
        let meta = R::meta();
        if meta.abstract_model {
            return Err(AdminError::InvalidModel(meta.object_name));
        }
        if self.is_registered::<R>() {
            return Err(AdminError::AlreadyRegistered(meta.object_name));
        }

        let doc = generate_docs(&meta);
        let handler = Handler::new(store, Arc::clone(&self.audit), self.settings.clone(), config)
            .with_doc(doc);

        info!(model = %meta.label(), "registered model");
        self.registry.push(Registration {
            type_id: TypeId::of::<R>(),
            endpoint: Box::new(handler),
        });
        Ok(())
    }

    pub fn unregister<R: Model>(&mut self) -> AdminResult<()> {
        let position = self
            .registry
            .iter()
            .position(|r| r.type_id == TypeId::of::<R>())
            .ok_or_else(|| AdminError::NotRegistered(R::meta().object_name))?;

        let removed = self.registry.remove(position);
        info!(model = %removed.endpoint.meta().label(), "unregistered model");
        Ok(())
    }

    pub fn is_registered<R: Model>(&self) -> bool {
        self.registry.iter().any(|r| r.type_id == TypeId::of::<R>())
    }

    /// Metadata of registered models, in registration order
    pub fn registered_models(&self) -> Vec<&ModelMeta> {
        self.registry.iter().map(|r| r.endpoint.meta()).collect()
    }

    /// Generated documentation for a registered model
    pub fn docs_for(&self, model_name: &str) -> Option<&str> {
        self.registry
            .iter()
            .map(|r| &r.endpoint)
            .find(|e| e.meta().model_name == model_name)
            .map(|e| e.doc())
    }

    /// Replace the documentation served for a registered model
    pub fn set_docs<R: Model>(&mut self, doc: impl Into<String>) -> AdminResult<()> {
        let registration = self
            .registry
            .iter_mut()
            .find(|r| r.type_id == TypeId::of::<R>())
            .ok_or_else(|| AdminError::NotRegistered(R::meta().object_name))?;
        registration.endpoint.set_doc(doc.into());
        Ok(())
    }

    /// Add a route served outside any model
    pub fn register_route(&mut self, route: ExtraRoute) {
        info!(pattern = %route.pattern, name = %route.name, "registered route");
        self.extra_routes.push(route);
    }

    /// Fill handler defaults and produce the route table
    ///
    /// Generated routes come first, in registration order, followed by
    /// manual routes in the order they were added.
    pub fn build_routes(&mut self) -> Vec<Route> {
        let mut routes = vec![Route::new(String::new(), "api-root".into(), RouteTarget::Root)
            .method(Method::Get, "api_root")];

        for (index, registration) in self.registry.iter_mut().enumerate() {
            registration.endpoint.finalize();
            routes.extend(model_routes(index, registration.endpoint.as_ref()));
        }

        for (index, extra) in self.extra_routes.iter().enumerate() {
            let pattern = extra.pattern.trim_start_matches('/').to_string();
            let route = Route::new(pattern, extra.name.clone(), RouteTarget::Manual(index));
            routes.push(
                extra
                    .methods
                    .iter()
                    .fold(route, |route, method| route.method(*method, extra.name.clone())),
            );
        }

        routes
    }

    /// Finish configuration and produce the request router
    pub fn into_router(mut self) -> AdminRouter {
        let routes = self.build_routes();
        info!(routes = routes.len(), "router built");

        let endpoints = self.registry.into_iter().map(|r| r.endpoint).collect();
        AdminRouter::new(self.settings, routes, endpoints, self.extra_routes)
    }
}

/// Routes generated for one model: list, list-level actions, detail and
/// detail-level actions
fn model_routes(index: usize, endpoint: &dyn Endpoint) -> Vec<Route> {
    let meta = endpoint.meta();
    let model = &meta.model_name;
    let label = meta.label();
    let target = RouteTarget::Model(index);
    let actions = endpoint.action_routes();

    let mut routes = vec![Route::new(format!("{}/", model), format!("{}-list", model), target)
        .method(Method::Get, "list")
        .method(Method::Post, "create")
        .method(Method::Options, METADATA_ACTION)
        .for_model(label.clone())];

    for action in actions.iter().filter(|a| !a.detail) {
        routes.push(action_route(
            format!("{}/{}/", model, action.url_path),
            format!("{}-{}", model, action.url_name),
            target,
            &action.name,
            &action.methods,
            &label,
        ));
    }

    routes.push(
        Route::new(format!("{}/{}/", model, PK_SEGMENT), format!("{}-detail", model), target)
            .method(Method::Get, "retrieve")
            .method(Method::Put, "update")
            .method(Method::Patch, "partial_update")
            .method(Method::Delete, "destroy")
            .method(Method::Options, METADATA_ACTION)
            .for_model(label.clone()),
    );

    for action in actions.iter().filter(|a| a.detail) {
        routes.push(action_route(
            format!("{}/{}/{}/", model, PK_SEGMENT, action.url_path),
            format!("{}-{}", model, action.url_name),
            target,
            &action.name,
            &action.methods,
            &label,
        ));
    }

    routes
}

fn action_route(
    pattern: String,
    name: String,
    target: RouteTarget,
    action: &str,
    methods: &[Method],
    label: &str,
) -> Route {
    methods
        .iter()
        .fold(Route::new(pattern, name, target), |route, method| route.method(*method, action))
        .method(Method::Options, METADATA_ACTION)
        .for_model(label)
}
