//! Full request flows through an admin site

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use restful_admin::audit::{AuditLog, MemoryAuditLog};
use restful_admin::config::Settings;
use restful_admin::handler::{ExtraAction, HandlerConfig, QuerySet};
use restful_admin::http::{Request, Response};
use restful_admin::models::{FieldKind, FieldSpec, Model, ModelMeta, RecordId, User, Widget};
use restful_admin::permission::{AccessPolicy, IsAdminUser, PermissionRule};
use restful_admin::site::{AdminRouter, AdminSite};
use restful_admin::storage::{Repository, Store};

struct Harness {
    router: AdminRouter,
    widgets: Arc<Repository<Widget>>,
    audit: Arc<MemoryAuditLog>,
}

fn harness_with(config: HandlerConfig<Widget>, settings: Settings) -> Harness {
    let widgets = Arc::new(Repository::<Widget>::in_memory());
    let audit = Arc::new(MemoryAuditLog::new());

    let mut site = AdminSite::new(settings, audit.clone());
    site.register_with::<Widget>(widgets.clone(), config).unwrap();

    Harness {
        router: site.into_router(),
        widgets,
        audit,
    }
}

fn harness() -> Harness {
    harness_with(HandlerConfig::default(), Settings::default())
}

fn adder() -> User {
    User::new(1, "adder").with_permission("models.add_widget")
}

fn editor() -> User {
    User::new(2, "editor").with_permissions([
        "models.view_widget",
        "models.change_widget",
        "models.delete_widget",
    ])
}

#[test]
fn create_with_add_permission_logs_one_addition() {
    let h = harness();

    let response = h
        .router
        .handle(&Request::post("/api/widget/", json!({"name": "gear"})).with_user(adder()))
        .unwrap();

    assert_eq!(response.status, 201);
    let entries = h.audit.read_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_addition());
    assert_eq!(entries[0].content_type, "models.widget");
    assert_eq!(entries[0].change_message[0].to_sentence(), "Added widget \"gear\".");
}

#[test]
fn create_without_permission_is_forbidden_and_leaves_no_trace() {
    let h = harness();
    let user = User::new(3, "viewer").with_permission("models.view_widget");

    let response = h
        .router
        .handle(&Request::post("/api/widget/", json!({"name": "gear"})).with_user(user))
        .unwrap();

    assert_eq!(response.status, 403);
    assert_eq!(
        response.data,
        Some(json!({"detail": "You do not have permission to perform this action."}))
    );
    assert!(h.audit.is_empty());
    assert_eq!(h.widgets.count().unwrap(), 0);
}

#[test]
fn partial_update_records_changed_fields() {
    let h = harness();
    h.widgets.insert(Widget::new("x")).unwrap();

    let response = h
        .router
        .handle(&Request::patch("/api/widget/1/", json!({"name": "y"})).with_user(editor()))
        .unwrap();

    assert_eq!(response.status, 200);
    let entries = h.audit.read_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_change());
    assert_eq!(entries[0].changed_fields(), vec!["name".to_string()]);
}

#[test]
fn unchanged_update_records_empty_field_list() {
    let h = harness();
    h.widgets.insert(Widget::new("x")).unwrap();

    h.router
        .handle(&Request::patch("/api/widget/1/", json!({"name": "x"})).with_user(editor()))
        .unwrap();

    let entries = h.audit.read_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].changed_fields().is_empty());
    assert_eq!(entries[0].diff_summary, None);
}

#[test]
fn delete_missing_record_is_not_found() {
    let h = harness();

    let response = h
        .router
        .handle(&Request::delete("/api/widget/42/").with_user(editor()))
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.data, Some(json!({"detail": "Not found."})));
    assert!(h.audit.is_empty());
}

#[test]
fn delete_logs_deletion_with_captured_identity() {
    let h = harness();
    h.widgets.insert(Widget::new("gear")).unwrap();

    let response = h
        .router
        .handle(&Request::delete("/api/widget/1/").with_user(editor()))
        .unwrap();

    assert_eq!(response.status, 204);
    assert!(h.widgets.get(1).unwrap().is_none());

    let entries = h.audit.read_all().unwrap();
    assert!(entries[0].is_deletion());
    assert_eq!(entries[0].object_id, "1");
    assert_eq!(entries[0].object_repr, "gear");
}

#[test]
fn options_is_allowed_for_anyone() {
    let h = harness();

    let response = h.router.handle(&Request::options("/api/widget/")).unwrap();
    assert_eq!(response.status, 200);

    let response = h.router.handle(&Request::options("/api/widget/7/")).unwrap();
    assert_eq!(response.status, 200);
}

#[test]
fn validation_errors_are_reported_per_field() {
    let h = harness();

    let response = h
        .router
        .handle(&Request::post("/api/widget/", json!({"name": ""})).with_user(adder()))
        .unwrap();

    assert_eq!(response.status, 400);
    assert_eq!(response.data, Some(json!({"name": ["This field may not be blank."]})));
    assert!(h.audit.is_empty());
}

#[test]
fn fixed_rule_opens_listing_to_anonymous_callers() {
    let h = harness_with(
        HandlerConfig::new().permission("list", true),
        Settings::default(),
    );
    h.widgets.insert(Widget::new("gear")).unwrap();

    let response = h.router.handle(&Request::get("/api/widget/")).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data.unwrap()[0]["name"], json!("gear"));

    let response = h.router.handle(&Request::get("/api/widget/1/")).unwrap();
    assert_eq!(response.status, 403);
}

#[test]
fn predicate_rule_sees_the_record() {
    let config = HandlerConfig::<Widget>::new().permission(
        "retrieve",
        PermissionRule::<Widget>::predicate(|_, _, request, obj: Option<&Widget>| match obj {
            Some(widget) => widget.active || request.user.is_superuser,
            None => true,
        }),
    );
    let h = harness_with(config, Settings::default());
    let mut hidden = Widget::new("hidden");
    hidden.active = false;
    h.widgets.insert(hidden).unwrap();
    h.widgets.insert(Widget::new("shown")).unwrap();

    let user = User::new(5, "anyone");
    let hidden = h.router.handle(&Request::get("/api/widget/1/").with_user(user.clone())).unwrap();
    let shown = h.router.handle(&Request::get("/api/widget/2/").with_user(user)).unwrap();

    assert_eq!(hidden.status, 403);
    assert_eq!(shown.status, 200);
}

#[test]
fn action_without_permission_needs_superuser() {
    let settings = Settings {
        not_found_permission_default: true,
        ..Settings::default()
    };
    let config = HandlerConfig::<Widget>::new().action(ExtraAction::<Widget>::new(
        "count",
        false,
        |handler, _, _| Ok(Response::ok(json!(handler.store().count()?))),
    ));
    let h = harness_with(config, settings);
    h.widgets.insert(Widget::new("gear")).unwrap();

    let anonymous = h.router.handle(&Request::get("/api/widget/count/")).unwrap();
    assert_eq!(anonymous.status, 403);

    let response = h
        .router
        .handle(&Request::get("/api/widget/count/").with_user(User::superuser(1, "root")))
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data, Some(json!(1)));
}

#[test]
fn action_permission_opens_it_to_anyone() {
    let config = HandlerConfig::<Widget>::new().action(
        ExtraAction::<Widget>::new("count", false, |handler, _, _| {
            Ok(Response::ok(json!(handler.store().count()?)))
        })
        .permission(true),
    );
    let h = harness_with(config, Settings::default());

    let response = h.router.handle(&Request::get("/api/widget/count/")).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data, Some(json!(0)));
}

#[test]
fn queryset_hides_records_from_every_action() {
    let config = HandlerConfig::<Widget>::new().queryset(QuerySet::filter(|w: &Widget| w.active));
    let h = harness_with(config, Settings::default());
    let mut hidden = Widget::new("hidden");
    hidden.active = false;
    h.widgets.insert(hidden).unwrap();

    let list = h.router.handle(&Request::get("/api/widget/").with_user(editor())).unwrap();
    assert_eq!(list.data, Some(json!([])));

    let delete = h.router.handle(&Request::delete("/api/widget/1/").with_user(editor())).unwrap();
    assert_eq!(delete.status, 404);
    assert!(h.widgets.get(1).unwrap().is_some());
}

#[test]
fn admin_policy_replaces_permission_map() {
    let admin_only: Arc<dyn AccessPolicy<Widget>> = Arc::new(IsAdminUser);
    let config = HandlerConfig::<Widget>::new().permission_classes(vec![admin_only]);
    let h = harness_with(config, Settings::default());

    let staff = User::new(9, "staff").staff();
    let response = h
        .router
        .handle(&Request::post("/api/widget/", json!({"name": "gear"})).with_user(staff))
        .unwrap();
    assert_eq!(response.status, 201);

    let response = h
        .router
        .handle(&Request::post("/api/widget/", json!({"name": "gear"})).with_user(adder()))
        .unwrap();
    assert_eq!(response.status, 403);
}

#[test]
fn paginated_listing_with_prefix() {
    let settings = Settings {
        page_size: Some(2),
        url_prefix: "admin/".into(),
        ..Settings::default()
    };
    let h = harness_with(HandlerConfig::default(), settings);
    for name in ["a", "b", "c"] {
        h.widgets.insert(Widget::new(name)).unwrap();
    }

    let data = h
        .router
        .handle(&Request::get("/admin/widget/").with_user(editor()))
        .unwrap()
        .data
        .unwrap();
    assert_eq!(data["count"], json!(3));
    assert_eq!(data["next"], json!("/admin/widget/?page=2"));

    let response = h
        .router
        .handle(&Request::get("/admin/widget/?page=9").with_user(editor()))
        .unwrap();
    assert_eq!(response.status, 404);
}

#[test]
fn encoded_filter_values_match() {
    let h = harness();
    h.widgets.insert(Widget::new("big gear")).unwrap();
    h.widgets.insert(Widget::new("gear")).unwrap();
    let root = User::superuser(1, "root");

    for path in ["/api/widget/?name=big%20gear", "/api/widget/?name=big+gear"] {
        let data = h
            .router
            .handle(&Request::get(path).with_user(root.clone()))
            .unwrap()
            .data
            .unwrap();
        assert_eq!(data.as_array().unwrap().len(), 1, "{}", path);
        assert_eq!(data[0]["name"], json!("big gear"));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Note {
    #[serde(default)]
    id: RecordId,
    body: String,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "note {}", self.id)
    }
}

impl Model for Note {
    fn meta() -> ModelMeta {
        ModelMeta::new("journal", "Note")
            .field(FieldSpec::primary_key("id"))
            .field(FieldSpec::new("body", FieldKind::Text).required())
    }

    fn pk(&self) -> RecordId {
        self.id
    }

    fn set_pk(&mut self, pk: RecordId) {
        self.id = pk;
    }
}

#[test]
fn two_models_share_one_audit_log() {
    let audit = Arc::new(MemoryAuditLog::new());
    let mut site = AdminSite::new(Settings::default(), audit.clone());
    site.register::<Widget>(Arc::new(Repository::<Widget>::in_memory())).unwrap();
    site.register::<Note>(Arc::new(Repository::<Note>::in_memory())).unwrap();
    let router = site.into_router();

    let root = router.handle(&Request::get("/api/")).unwrap();
    assert_eq!(
        root.data,
        Some(json!({"widget": "/api/widget/", "note": "/api/note/"}))
    );

    let user = User::superuser(1, "root");
    router
        .handle(&Request::post("/api/note/", json!({"body": "hello"})).with_user(user.clone()))
        .unwrap();
    router
        .handle(&Request::post("/api/widget/", json!({"name": "gear"})).with_user(user))
        .unwrap();

    let types: Vec<String> = audit
        .read_all()
        .unwrap()
        .into_iter()
        .map(|e| e.content_type)
        .collect();
    assert_eq!(types, vec!["journal.note".to_string(), "models.widget".to_string()]);
}

static PART_CACHE_CLEARS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    id: RecordId,
    name: String,
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Model for Part {
    fn meta() -> ModelMeta {
        ModelMeta::new("inventory", "Part")
            .field(FieldSpec::primary_key("id"))
            .field(FieldSpec::char("name", 50).required())
    }

    fn pk(&self) -> RecordId {
        self.id
    }

    fn set_pk(&mut self, pk: RecordId) {
        self.id = pk;
    }

    fn clear_related_cache(&mut self) {
        PART_CACHE_CLEARS.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn updates_clear_related_cache() {
    let parts = Arc::new(Repository::<Part>::in_memory());
    let mut site = AdminSite::new(Settings::default(), Arc::new(MemoryAuditLog::new()));
    site.register::<Part>(parts.clone()).unwrap();
    let router = site.into_router();
    let root = User::superuser(1, "root");

    router
        .handle(&Request::post("/api/part/", json!({"name": "axle"})).with_user(root.clone()))
        .unwrap();
    router.handle(&Request::get("/api/part/1/").with_user(root.clone())).unwrap();
    assert_eq!(PART_CACHE_CLEARS.load(Ordering::SeqCst), 0);

    router
        .handle(&Request::patch("/api/part/1/", json!({"name": "hub"})).with_user(root.clone()))
        .unwrap();
    assert_eq!(PART_CACHE_CLEARS.load(Ordering::SeqCst), 1);

    let response = router
        .handle(&Request::put("/api/part/1/", json!({"name": "spoke"})).with_user(root))
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(PART_CACHE_CLEARS.load(Ordering::SeqCst), 2);
}
