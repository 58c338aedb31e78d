//! Endpoint documentation generated from model metadata

use crate::models::ModelMeta;

/// Markdown describing the routes served for a model
pub fn generate_docs(meta: &ModelMeta) -> String {
    let model = &meta.model_name;
    let one = &meta.verbose_name;
    let many = &meta.verbose_name_plural;

    format!(
        "List all {many}, create new {one}\n\
         > `[GET]` `{model}/`<br/>\n\
         > `[POST]` `{model}/`\n\
         \n\
         Operate on specific {one} selected by `<pk>` field value:\n\
         > `[GET]` `{model}/<pk>/` => Get {one}<br/>\n\
         > `[PATCH | PUT]` `{model}/<pk>/` => Update {one}<br/>\n\
         > `[DELETE]` `{model}/<pk>/` => Delete {one}\n\
         \n\
         List {one} fields for form creation, view supported operations for {many}\n\
         > `[OPTIONS]` `{model}/`<br/>\n\
         > `[OPTIONS]` `{model}/<pk>/`\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docs_mention_routes_and_names() {
        let meta = ModelMeta::new("shop", "OrderLine");
        let docs = generate_docs(&meta);

        assert!(docs.starts_with("List all order lines, create new order line\n"));
        assert!(docs.contains("> `[GET]` `orderline/<pk>/` => Get order line<br/>"));
        assert!(docs.contains("> `[OPTIONS]` `orderline/`<br/>"));
        assert!(docs.contains("view supported operations for order lines"));
    }
}
