//! Demo site served by the command-line front end
//!
//! Serves the `Widget` model from a JSON file under the data directory and
//! records audit entries in the site's audit log file.

use std::sync::Arc;

use serde_json::json;

use crate::audit::AuditLogger;
use crate::config::{paths::AdminPaths, settings::Settings};
use crate::error::AdminResult;
use crate::handler::{ExtraAction, HandlerConfig};
use crate::http::{Method, Response};
use crate::models::Widget;
use crate::site::{AdminSite, ExtraRoute};
use crate::storage::Repository;

/// The demo site and the audit log it writes to
pub struct DemoSite {
    pub site: AdminSite,
    pub audit: Arc<AuditLogger>,
}

/// Build the demo site from on-disk state
pub fn build_demo_site(paths: &AdminPaths, settings: &Settings) -> AdminResult<DemoSite> {
    let audit = Arc::new(AuditLogger::new(paths.audit_log()));
    let widgets = Arc::new(Repository::<Widget>::open(paths.model_file("widget"))?);

    let mut site = AdminSite::new(settings.clone(), audit.clone());
    site.register_with::<Widget>(widgets, widget_config())?;
    site.register_route(ExtraRoute::new("health/", "health", |_| {
        Ok(Response::ok(json!({"status": "ok"})))
    }));

    Ok(DemoSite { site, audit })
}

/// Widgets gain a `toggle` action that flips `active`, authorized like
/// any other change
fn widget_config() -> HandlerConfig<Widget> {
    let toggle = ExtraAction::<Widget>::new("toggle", true, |handler, request, obj| {
        let Some(mut widget) = obj else {
            return Ok(Response::no_content());
        };
        widget.active = !widget.active;
        let saved = handler.store().update(widget)?;
        handler.log_change(
            request,
            &saved,
            vec![crate::audit::ChangeMessage::changed(
                handler.meta(),
                saved.to_string(),
                vec!["active".to_string()],
            )],
            None,
        )?;
        Ok(Response::ok(handler.get_single_schema().to_representation(&saved)?))
    })
    .methods(vec![Method::Post])
    .permission("models.change_widget");

    HandlerConfig::new().action(toggle)
}
