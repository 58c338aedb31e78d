use serde_json::{Map, Value};

use crate::error::AdminResult;
use crate::http::{Method, Request, Response};
use crate::models::Model;

use super::Handler;

const MEDIA_TYPES: [&str; 1] = ["application/json"];

impl<R: Model> Handler<R> {
    /// Describe the endpoint and the writes the caller may perform
    ///
    /// Writes the caller is not allowed to make are left out of `actions`.
    pub(crate) fn metadata(&self, request: &Request, pk: Option<&str>) -> AdminResult<Response> {
        let suffix = if pk.is_some() { "Instance" } else { "List" };
        let mut body = Map::new();
        let name = format!("{} {}", title(&self.meta.verbose_name), suffix);
        body.insert("name".into(), Value::from(name));
        body.insert("description".into(), Value::from(self.doc.clone()));
        body.insert("renders".into(), Value::from(MEDIA_TYPES.to_vec()));
        body.insert("parses".into(), Value::from(MEDIA_TYPES.to_vec()));

        // Permissions are probed as if the write itself had been requested
        let mut actions = Map::new();
        match pk {
            None => {
                let probe = with_method(request, Method::Post);
                if self.allowed(self.check_permissions("create", &probe))? {
                    actions.insert("POST".into(), self.get_single_schema().describe());
                }
            }
            Some(pk) => {
                let probe = with_method(request, Method::Put);
                let permitted = self.allowed(self.check_permissions("update", &probe))?
                    && self.allowed(self.get_object("update", &probe, pk).map(|_| ()))?;
                if permitted {
                    actions.insert("PUT".into(), self.get_single_schema().describe());
                }
            }
        }
        if !actions.is_empty() {
            body.insert("actions".into(), Value::Object(actions));
        }

        Ok(Response::ok(Value::Object(body)))
    }

    /// Client errors mean "not allowed"; other faults propagate
    fn allowed(&self, outcome: AdminResult<()>) -> AdminResult<bool> {
        match outcome {
            Ok(()) => Ok(true),
            Err(err) if err.is_client_error() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn with_method(request: &Request, method: Method) -> Request {
    let mut probe = request.clone();
    probe.method = method;
    probe
}

fn title(words: &str) -> String {
    words
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::super::tests::{editor, fixture};
    use crate::http::Request;
    use crate::models::{User, Widget};
    use crate::storage::Store;
    use serde_json::json;

    #[test]
    fn test_options_lists_post_for_adder() {
        let f = fixture();
        let request = Request::options("/api/widget/").with_user(editor());

        let data = f.handler.dispatch("metadata", None, &request).unwrap().data.unwrap();
        assert_eq!(data["name"], json!("Widget List"));
        assert_eq!(data["renders"], json!(["application/json"]));
        assert_eq!(data["actions"]["POST"]["name"]["required"], json!(true));
        assert_eq!(data["actions"]["POST"]["id"]["read_only"], json!(true));
    }

    #[test]
    fn test_options_allowed_for_anonymous() {
        let f = fixture();
        let request = Request::options("/api/widget/");

        let response = f.handler.dispatch("metadata", None, &request).unwrap();
        assert_eq!(response.status, 200);
        assert!(response.data.unwrap().get("actions").is_none());
    }

    #[test]
    fn test_detail_options_hides_put_without_change_permission() {
        let f = fixture();
        f.store.insert(Widget::new("gear")).unwrap();

        let viewer = User::new(2, "viewer").with_permission("models.view_widget");
        let request = Request::get("/api/widget/1/").with_user(viewer);
        let data = f.handler.dispatch("metadata", Some("1"), &request).unwrap().data.unwrap();

        assert_eq!(data["name"], json!("Widget Instance"));
        assert!(data.get("actions").is_none());

        let request = Request::get("/api/widget/1/").with_user(editor());
        let data = f.handler.dispatch("metadata", Some("1"), &request).unwrap().data.unwrap();
        assert!(data["actions"]["PUT"].is_object());
    }
}
