//! Route table and request dispatch
//!
//! An [`AdminRouter`] is produced once from a fully configured site and is
//! read-only afterwards. Paths are matched segment by segment after the
//! site's URL prefix is stripped; `<pk>` segments capture the record key.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Settings;
use crate::error::{AdminError, AdminResult};
use crate::http::{Method, Request, Response};

use super::endpoint::Endpoint;

/// Placeholder segment capturing a record key
pub const PK_SEGMENT: &str = "<pk>";

/// Callback serving a manually registered route
pub type RouteCallback = Arc<dyn Fn(&Request) -> AdminResult<Response> + Send + Sync>;

/// A route added to a site by hand, outside any model
pub struct ExtraRoute {
    pub pattern: String,
    pub name: String,
    pub methods: Vec<Method>,
    callback: RouteCallback,
}

impl ExtraRoute {
    /// Create a GET route; `pattern` is relative to the site prefix
    pub fn new<F>(pattern: impl Into<String>, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Request) -> AdminResult<Response> + Send + Sync + 'static,
    {
        Self {
            pattern: pattern.into(),
            name: name.into(),
            methods: vec![Method::Get],
            callback: Arc::new(callback),
        }
    }

    pub fn methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = methods;
        self
    }
}

impl fmt::Debug for ExtraRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraRoute")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteTarget {
    Root,
    Model(usize),
    Manual(usize),
}

/// One entry of the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Pattern relative to the site prefix, e.g. `widget/<pk>/`
    pub pattern: String,
    pub name: String,
    /// Method to action name
    pub methods: BTreeMap<Method, String>,
    /// Model label for generated routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip)]
    pub(crate) target: RouteTarget,
}

impl Route {
    pub(crate) fn new(pattern: String, name: String, target: RouteTarget) -> Self {
        Self {
            pattern,
            name,
            methods: BTreeMap::new(),
            model: None,
            target,
        }
    }

    pub(crate) fn method(mut self, method: Method, action: impl Into<String>) -> Self {
        self.methods.insert(method, action.into());
        self
    }

    pub(crate) fn for_model(mut self, label: impl Into<String>) -> Self {
        self.model = Some(label.into());
        self
    }

    /// Match path segments, returning the captured key when the pattern
    /// has one
    pub fn matches(&self, segments: &[&str]) -> Option<Option<String>> {
        let parts: Vec<&str> = self.pattern.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != segments.len() {
            return None;
        }

        let mut pk = None;
        for (part, segment) in parts.iter().zip(segments) {
            if *part == PK_SEGMENT {
                pk = Some(segment.to_string());
            } else if part != segment {
                return None;
            }
        }
        Some(pk)
    }

    /// Comma-separated accepted methods, for the `Allow` header
    pub fn allow(&self) -> String {
        self.methods
            .keys()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Immutable dispatcher over every registered handler and manual route
pub struct AdminRouter {
    settings: Settings,
    routes: Vec<Route>,
    endpoints: Vec<Box<dyn Endpoint>>,
    extra_routes: Vec<ExtraRoute>,
}

impl AdminRouter {
    pub(crate) fn new(
        settings: Settings,
        routes: Vec<Route>,
        endpoints: Vec<Box<dyn Endpoint>>,
        extra_routes: Vec<ExtraRoute>,
    ) -> Self {
        Self {
            settings,
            routes,
            endpoints,
            extra_routes,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Find the route for a path and the key it captures
    pub fn resolve(&self, path: &str) -> Option<(&Route, Option<String>)> {
        let rest = self.strip_prefix(path)?;
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        self.routes
            .iter()
            .find_map(|route| route.matches(&segments).map(|pk| (route, pk)))
    }

    /// Serve a request
    ///
    /// Not found, permission, validation and method failures become client
    /// error responses. Any other failure is returned to the caller.
    pub fn handle(&self, request: &Request) -> AdminResult<Response> {
        match self.dispatch(request) {
            Ok(response) => Ok(response),
            Err(err) => match Response::from_error(&err) {
                Some(response) => {
                    debug!(
                        method = %request.method,
                        path = %request.path,
                        status = response.status,
                        "client error"
                    );
                    Ok(self.with_allow(response, request))
                }
                None => Err(err),
            },
        }
    }

    fn dispatch(&self, request: &Request) -> AdminResult<Response> {
        let (route, pk) = self
            .resolve(&request.path)
            .ok_or_else(|| AdminError::route_not_found(&request.path))?;

        let action = match route.methods.get(&request.method) {
            Some(action) => action.as_str(),
            None if request.method == Method::Head => route
                .methods
                .get(&Method::Get)
                .map(String::as_str)
                .ok_or_else(|| AdminError::MethodNotAllowed(request.method.to_string()))?,
            None => return Err(AdminError::MethodNotAllowed(request.method.to_string())),
        };

        debug!(route = %route.name, action, method = %request.method, "route matched");

        match route.target {
            RouteTarget::Root => Ok(self.api_root()),
            RouteTarget::Model(index) => {
                let endpoint = self
                    .endpoints
                    .get(index)
                    .ok_or_else(|| AdminError::route_not_found(&request.path))?;
                endpoint.dispatch(action, pk.as_deref(), request)
            }
            RouteTarget::Manual(index) => {
                let route = self
                    .extra_routes
                    .get(index)
                    .ok_or_else(|| AdminError::route_not_found(&request.path))?;
                (route.callback)(request)
            }
        }
    }

    /// Map of model name to list URL
    fn api_root(&self) -> Response {
        let mount = self.settings.mount_point();
        let mut body = Map::new();
        for endpoint in &self.endpoints {
            let name = &endpoint.meta().model_name;
            body.insert(name.clone(), Value::from(format!("{}{}/", mount, name)));
        }
        Response::ok(Value::Object(body))
    }

    fn with_allow(&self, response: Response, request: &Request) -> Response {
        if response.status != crate::http::response::HTTP_405_METHOD_NOT_ALLOWED {
            return response;
        }
        match self.resolve(&request.path) {
            Some((route, _)) => response.with_header("Allow", route.allow()),
            None => response,
        }
    }

    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let path = path.trim_start_matches('/');
        let prefix = self.settings.url_prefix.trim_matches('/');
        if prefix.is_empty() {
            return Some(path);
        }
        path.strip_prefix(prefix)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

impl fmt::Debug for AdminRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminRouter")
            .field("routes", &self.routes)
            .field("extra_routes", &self.extra_routes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> Route {
        Route::new("widget/<pk>/".into(), "widget-detail".into(), RouteTarget::Model(0))
            .method(Method::Get, "retrieve")
            .method(Method::Delete, "destroy")
    }

    #[test]
    fn test_match_captures_pk() {
        assert_eq!(detail().matches(&["widget", "12"]), Some(Some("12".to_string())));
        assert_eq!(detail().matches(&["widget"]), None);
        assert_eq!(detail().matches(&["gadget", "12"]), None);
    }

    #[test]
    fn test_match_literal() {
        let route = Route::new("widget/".into(), "widget-list".into(), RouteTarget::Model(0));
        assert_eq!(route.matches(&["widget"]), Some(None));
    }

    #[test]
    fn test_allow_header_value() {
        assert_eq!(detail().allow(), "GET, DELETE");
    }

    #[test]
    fn test_route_serializes_without_target() {
        let value = serde_json::to_value(detail().for_model("models.widget")).unwrap();
        assert_eq!(value["name"], "widget-detail");
        assert_eq!(value["methods"]["GET"], "retrieve");
        assert_eq!(value["model"], "models.widget");
        assert!(value.get("target").is_none());
    }
}
