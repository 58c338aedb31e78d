//! Generic CRUD handler
//!
//! A [`Handler`] serves one registered model: it lists, creates,
//! retrieves, updates and destroys records, answers metadata requests and
//! runs extra actions. Every action is authorized through the configured
//! access policies, and every write is recorded in the audit log.

pub mod actions;
pub mod config;
mod crud;
mod metadata;
pub mod pagination;

pub use actions::{ActionCallback, ExtraAction};
pub use config::{HandlerConfig, QuerySet};

use std::sync::Arc;

use tracing::debug;

use crate::audit::{ActionFlag, AuditEntry, AuditLog, ChangeMessage};
use crate::config::Settings;
use crate::error::{AdminError, AdminResult};
use crate::http::{Request, Response};
use crate::models::{Model, ModelMeta};
use crate::permission::{
    self, default_permission_map, PermissionMap, PermissionRule, METADATA_ACTION,
};
use crate::schema::Schema;
use crate::storage::Store;

/// Request handler for one model
pub struct Handler<R: Model> {
    meta: ModelMeta,
    config: HandlerConfig<R>,
    store: Arc<dyn Store<R>>,
    audit: Arc<dyn AuditLog>,
    settings: Settings,
    doc: String,
}

impl<R: Model> Handler<R> {
    pub fn new(
        store: Arc<dyn Store<R>>,
        audit: Arc<dyn AuditLog>,
        settings: Settings,
        config: HandlerConfig<R>,
    ) -> Self {
        Self {
            meta: R::meta(),
            config,
            store,
            audit,
            settings,
            doc: String::new(),
        }
    }

    /// Attach the documentation returned by metadata requests
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub(crate) fn set_doc(&mut self, doc: String) {
        self.doc = doc;
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn config(&self) -> &HandlerConfig<R> {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn Store<R>> {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fill unset queryset and schema with the model defaults
    pub(crate) fn finalize(&mut self) {
        if self.config.queryset.is_none() {
            self.config.queryset = Some(QuerySet::all());
        }
        if self.config.schema.is_none() {
            self.config.schema = Some(Schema::for_model(&self.meta));
        }
    }

    pub fn get_queryset(&self) -> QuerySet<R> {
        self.config.queryset.clone().unwrap_or_else(QuerySet::all)
    }

    /// Schema used for list output
    pub fn get_schema(&self) -> Schema {
        self.config
            .schema
            .clone()
            .unwrap_or_else(|| Schema::for_model(&self.meta))
    }

    /// Schema used for single-record operations
    pub fn get_single_schema(&self) -> Schema {
        self.config
            .single_schema
            .clone()
            .unwrap_or_else(|| self.get_schema())
    }

    /// Effective permission map: defaults overlaid with handler overrides
    pub fn permission_map(&self) -> PermissionMap<R> {
        let mut map = default_permission_map(&self.meta);
        for (action, rule) in &self.config.permission_map {
            map.insert(action.clone(), rule.clone());
        }
        map
    }

    pub fn extra_action(&self, name: &str) -> Option<&ExtraAction<R>> {
        self.config.extra_actions.iter().find(|a| a.name == name)
    }

    /// Decide whether the request may perform `action`, optionally on `obj`
    pub fn has_perm_action(&self, action: &str, request: &Request, obj: Option<&R>) -> bool {
        let mut map = self.permission_map();
        if let Some(extra) = self.extra_action(action) {
            let rule = extra.permission.clone().unwrap_or_else(superuser_only);
            map.insert(action.to_string(), rule);
        }
        permission::resolve(
            self,
            &map,
            action,
            request,
            obj,
            self.settings.not_found_permission_default,
        )
    }

    /// Run the collection-level check of every access policy
    pub fn check_permissions(&self, action: &str, request: &Request) -> AdminResult<()> {
        for policy in &self.config.permission_classes {
            if !policy.has_permission(request, self, action) {
                debug!(
                    model = %self.meta.label(),
                    action,
                    user = %request.user,
                    "permission denied"
                );
                return Err(AdminError::PermissionDenied);
            }
        }
        Ok(())
    }

    /// Run the object-level check of every access policy
    pub fn check_object_permissions(
        &self,
        action: &str,
        request: &Request,
        obj: &R,
    ) -> AdminResult<()> {
        for policy in &self.config.permission_classes {
            if !policy.has_object_permission(request, self, action, obj) {
                debug!(
                    model = %self.meta.label(),
                    action,
                    pk = obj.pk(),
                    user = %request.user,
                    "object permission denied"
                );
                return Err(AdminError::PermissionDenied);
            }
        }
        Ok(())
    }

    /// Fetch the record addressed by `pk` and check object permissions
    ///
    /// Unparseable keys, missing records and records outside the queryset
    /// are all reported as not found.
    pub fn get_object(&self, action: &str, request: &Request, pk: &str) -> AdminResult<R> {
        let not_found = || AdminError::record_not_found(&self.meta.object_name, pk);

        let id = pk.trim().parse().map_err(|_| not_found())?;
        let record = self.store.get(id)?.ok_or_else(not_found)?;
        if !self.get_queryset().contains(&record) {
            return Err(not_found());
        }

        self.check_object_permissions(action, request, &record)?;
        Ok(record)
    }

    /// Route path of one record, under the site mount point
    pub fn detail_url(&self, pk: impl std::fmt::Display) -> String {
        format!("{}{}/{}/", self.settings.mount_point(), self.meta.model_name, pk)
    }

    /// Run `action` for the request after the collection-level check
    ///
    /// `pk` is the captured key for detail routes.
    pub fn dispatch(
        &self,
        action: &str,
        pk: Option<&str>,
        request: &Request,
    ) -> AdminResult<Response> {
        debug!(
            model = %self.meta.label(),
            action,
            method = %request.method,
            pk = ?pk,
            "dispatching"
        );

        self.check_permissions(action, request)?;

        match action {
            "list" => self.list(request),
            "create" => self.create(request),
            "retrieve" => self.retrieve(request, self.require_pk(pk)?),
            "update" => self.update(request, self.require_pk(pk)?, false),
            "partial_update" => self.update(request, self.require_pk(pk)?, true),
            "destroy" => self.destroy(request, self.require_pk(pk)?),
            METADATA_ACTION => self.metadata(request, pk),
            other => {
                let extra = self
                    .extra_action(other)
                    .ok_or_else(|| AdminError::route_not_found(&request.path))?;
                let obj = if extra.detail {
                    Some(self.get_object(other, request, self.require_pk(pk)?)?)
                } else {
                    None
                };
                extra.call(self, request, obj)
            }
        }
    }

    fn require_pk<'a>(&self, pk: Option<&'a str>) -> AdminResult<&'a str> {
        pk.ok_or_else(|| AdminError::record_not_found(&self.meta.object_name, ""))
    }

    /// Record the creation of `obj`
    pub fn log_addition(
        &self,
        request: &Request,
        obj: &R,
        message: Vec<ChangeMessage>,
    ) -> AdminResult<AuditEntry> {
        self.write_entry(AuditEntry::new(
            ActionFlag::Addition,
            request.user.id,
            &self.meta,
            obj.pk().to_string(),
            obj.to_string(),
            message,
        ))
    }

    /// Record a change to `obj`, with an optional field diff summary
    pub fn log_change(
        &self,
        request: &Request,
        obj: &R,
        message: Vec<ChangeMessage>,
        diff_summary: Option<String>,
    ) -> AdminResult<AuditEntry> {
        let entry = AuditEntry::new(
            ActionFlag::Change,
            request.user.id,
            &self.meta,
            obj.pk().to_string(),
            obj.to_string(),
            message,
        )
        .with_diff_summary(diff_summary);
        self.write_entry(entry)
    }

    /// Record the deletion of `obj`; called while the record still exists
    pub fn log_deletion(
        &self,
        request: &Request,
        obj: &R,
        object_repr: &str,
        message: Vec<ChangeMessage>,
    ) -> AdminResult<AuditEntry> {
        self.write_entry(AuditEntry::new(
            ActionFlag::Deletion,
            request.user.id,
            &self.meta,
            obj.pk().to_string(),
            object_repr,
            message,
        ))
    }

    fn write_entry(&self, entry: AuditEntry) -> AdminResult<AuditEntry> {
        self.audit.log(&entry)?;
        Ok(entry)
    }
}

/// Rule for an extra action declared without a permission
fn superuser_only<R: Model>() -> PermissionRule<R> {
    PermissionRule::predicate(|_, _, request, _| {
        request.user.is_active && request.user.is_superuser
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use crate::http::Method;
    use crate::models::{User, Widget};
    use crate::permission::{IsAdminUser, PermissionRule};
    use crate::storage::Repository;
    use serde_json::json;

    pub(crate) struct Fixture {
        pub handler: Handler<Widget>,
        pub store: Arc<Repository<Widget>>,
        pub audit: Arc<MemoryAuditLog>,
    }

    pub(crate) fn fixture_with(config: HandlerConfig<Widget>) -> Fixture {
        let store = Arc::new(Repository::<Widget>::in_memory());
        let audit = Arc::new(MemoryAuditLog::new());
        let handler = Handler::new(store.clone(), audit.clone(), Settings::default(), config);
        Fixture { handler, store, audit }
    }

    pub(crate) fn fixture() -> Fixture {
        fixture_with(HandlerConfig::default())
    }

    pub(crate) fn editor() -> User {
        User::new(7, "editor").with_permissions([
            "models.view_widget",
            "models.add_widget",
            "models.change_widget",
            "models.delete_widget",
        ])
    }

    #[test]
    fn test_has_perm_action_uses_default_codes() {
        let f = fixture();
        let viewer = Request::get("/api/widget/")
            .with_user(User::new(1, "v").with_permission("models.view_widget"));

        assert!(f.handler.has_perm_action("list", &viewer, None));
        assert!(!f.handler.has_perm_action("create", &viewer, None));
    }

    #[test]
    fn test_unmapped_action_uses_setting_default() {
        let f = fixture();
        let request = Request::get("/api/widget/").with_user(User::superuser(1, "root"));

        assert!(!f.handler.has_perm_action("archive", &request, None));
        assert!(!f.handler.has_perm_action("", &request, None));
    }

    #[test]
    fn test_options_always_allowed() {
        let f = fixture();
        assert!(f.handler.has_perm_action("create", &Request::options("/api/widget/"), None));
        assert!(f.handler.has_perm_action(METADATA_ACTION, &Request::get("/api/widget/"), None));
    }

    #[test]
    fn test_override_and_predicate_rules() {
        let config = HandlerConfig::<Widget>::new().permission("list", true).permission(
            "retrieve",
            PermissionRule::<Widget>::predicate(|_, _, _, obj: Option<&Widget>| {
                obj.map_or(true, |w| w.active)
            }),
        );
        let f = fixture_with(config);
        let anonymous = Request::get("/api/widget/");

        assert!(f.handler.has_perm_action("list", &anonymous, None));

        let mut widget = Widget::new("gear");
        assert!(f.handler.has_perm_action("retrieve", &anonymous, Some(&widget)));
        widget.active = false;
        assert!(!f.handler.has_perm_action("retrieve", &anonymous, Some(&widget)));
    }

    #[test]
    fn test_extra_action_permission_wins() {
        let action =
            ExtraAction::<Widget>::new("archive", true, |_, _, _| Ok(Response::no_content()))
                .methods(vec![Method::Post])
                .permission(true);
        let config = HandlerConfig::new().permission("archive", false).action(action);
        let f = fixture_with(config);

        assert!(f.handler.has_perm_action("archive", &Request::post("/x", json!({})), None));
    }

    #[test]
    fn test_extra_action_without_permission_is_superuser_only() {
        let action =
            ExtraAction::<Widget>::new("purge", false, |_, _, _| Ok(Response::no_content()));
        let config = HandlerConfig::new().permission("purge", true).action(action);
        let settings = Settings {
            not_found_permission_default: true,
            ..Settings::default()
        };
        let handler = Handler::new(
            Arc::new(Repository::<Widget>::in_memory()),
            Arc::new(MemoryAuditLog::new()),
            settings,
            config,
        );

        let root = Request::get("/api/widget/purge/").with_user(User::superuser(1, "root"));
        let staff = Request::get("/api/widget/purge/").with_user(editor().staff());
        let mut retired = User::superuser(2, "retired");
        retired.is_active = false;
        let retired = Request::get("/api/widget/purge/").with_user(retired);

        assert!(handler.has_perm_action("purge", &root, None));
        assert!(!handler.has_perm_action("purge", &staff, None));
        assert!(!handler.has_perm_action("purge", &retired, None));
    }

    #[test]
    fn test_dispatch_denied_without_permission() {
        let f = fixture();
        let err = f
            .handler
            .dispatch("create", None, &Request::post("/api/widget/", json!({"name": "gear"})))
            .unwrap_err();

        assert!(matches!(err, AdminError::PermissionDenied));
        assert_eq!(f.store.count().unwrap(), 0);
        assert!(f.audit.is_empty());
    }

    #[test]
    fn test_admin_policy_requires_staff() {
        let config = HandlerConfig::<Widget>::new().permission_classes(vec![Arc::new(IsAdminUser)]);
        let f = fixture_with(config);

        let plain = Request::get("/api/widget/").with_user(editor());
        assert!(f.handler.dispatch("list", None, &plain).is_err());

        let staff = Request::get("/api/widget/").with_user(User::new(2, "staff").staff());
        assert!(f.handler.dispatch("list", None, &staff).is_ok());
    }

    #[test]
    fn test_get_object_outside_queryset() {
        let f =
            fixture_with(HandlerConfig::new().queryset(QuerySet::filter(|w: &Widget| w.active)));
        let mut hidden = Widget::new("hidden");
        hidden.active = false;
        let hidden = f.store.insert(hidden).unwrap();

        let request = Request::get("/api/widget/1/").with_user(editor());
        let err = f.handler.get_object("retrieve", &request, &hidden.pk().to_string()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_object_bad_key() {
        let f = fixture();
        let request = Request::get("/api/widget/abc/").with_user(editor());
        assert!(f.handler.get_object("retrieve", &request, "abc").unwrap_err().is_not_found());
    }

    #[test]
    fn test_detail_action_receives_record() {
        let action = ExtraAction::<Widget>::new("name", true, |_, _, obj: Option<Widget>| {
            Ok(Response::ok(json!({ "name": obj.map(|w| w.name) })))
        })
        .permission(true);
        let f = fixture_with(HandlerConfig::new().action(action));
        let widget = f.store.insert(Widget::new("gear")).unwrap();

        let request = Request::get("/api/widget/1/name/").with_user(editor());
        let response = f
            .handler
            .dispatch("name", Some(&widget.pk().to_string()), &request)
            .unwrap();
        assert_eq!(response.data, Some(json!({"name": "gear"})));
    }

    #[test]
    fn test_detail_url() {
        let f = fixture();
        assert_eq!(f.handler.detail_url(3), "/api/widget/3/");
    }
}
