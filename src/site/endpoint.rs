//! Type-erased view of a handler, so one site can hold handlers for
//! different model types

use crate::error::AdminResult;
use crate::handler::Handler;
use crate::http::{Method, Request, Response};
use crate::models::{Model, ModelMeta};

/// Routing facts about one extra action
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActionRoute {
    pub name: String,
    pub url_name: String,
    pub url_path: String,
    pub detail: bool,
    pub methods: Vec<Method>,
}

pub(crate) trait Endpoint: Send + Sync {
    fn meta(&self) -> &ModelMeta;

    fn doc(&self) -> &str;

    fn set_doc(&mut self, doc: String);

    /// Fill unset configuration with model defaults
    fn finalize(&mut self);

    fn action_routes(&self) -> Vec<ActionRoute>;

    fn dispatch(&self, action: &str, pk: Option<&str>, request: &Request) -> AdminResult<Response>;
}

impl<R: Model> Endpoint for Handler<R> {
    fn meta(&self) -> &ModelMeta {
        Handler::meta(self)
    }

    fn doc(&self) -> &str {
        Handler::doc(self)
    }

    fn set_doc(&mut self, doc: String) {
        Handler::set_doc(self, doc);
    }

    fn finalize(&mut self) {
        Handler::finalize(self);
    }

    fn action_routes(&self) -> Vec<ActionRoute> {
        self.config()
            .extra_actions
            .iter()
            .map(|action| ActionRoute {
                name: action.name.clone(),
                url_name: action.url_name(),
                url_path: action.url_path.clone(),
                detail: action.detail,
                methods: action.methods.clone(),
            })
            .collect()
    }

    fn dispatch(&self, action: &str, pk: Option<&str>, request: &Request) -> AdminResult<Response> {
        Handler::dispatch(self, action, pk, request)
    }
}
