//! Standard CRUD actions
//!
//! Collection permissions have already been checked by `dispatch` when these
//! run; detail actions re-check against the fetched record.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::audit::{snapshot, summarize, ChangeMessage, ModelDiff, Snapshot};
use crate::error::AdminResult;
use crate::http::{Request, Response};
use crate::models::Model;
use crate::schema::ValidationErrors;

use super::pagination::{Page, PAGE_PARAM, PAGE_SIZE_PARAM};
use super::Handler;

/// Query parameter selecting the sort field; `-` prefix for descending
pub const ORDERING_PARAM: &str = "ordering";

impl<R: Model> Handler<R> {
    pub(crate) fn list(&self, request: &Request) -> AdminResult<Response> {
        let schema = self.get_schema();
        let records = self.filter_queryset(request)?;

        let Some(size) = self.page_size(request) else {
            let rendered = records
                .iter()
                .map(|record| schema.to_representation(record))
                .collect::<AdminResult<Vec<_>>>()?;
            return Ok(Response::ok(Value::Array(rendered)));
        };

        let page = Page::select(records.len(), size, request.query_param(PAGE_PARAM))?;
        let rendered = records[page.range()]
            .iter()
            .map(|record| schema.to_representation(record))
            .collect::<AdminResult<Vec<_>>>()?;
        Ok(Response::ok(page.envelope(&request.path, &request.query, rendered)))
    }

    pub(crate) fn create(&self, request: &Request) -> AdminResult<Response> {
        let schema = self.get_single_schema();
        let mut validated = schema.validate(&request.data, false)?;
        validated.insert(self.meta.pk_name().to_string(), Value::from(0));

        let record = self.build_record(validated)?;
        let instance = self.store.insert(record)?;

        self.log_addition(
            request,
            &instance,
            vec![ChangeMessage::added(&self.meta, instance.to_string())],
        )?;

        let location = self.detail_url(instance.pk());
        let body = schema.to_representation(&instance)?;
        Ok(Response::created(body).with_header("Location", location))
    }

    pub(crate) fn retrieve(&self, request: &Request, pk: &str) -> AdminResult<Response> {
        let instance = self.get_object("retrieve", request, pk)?;
        Ok(Response::ok(self.get_single_schema().to_representation(&instance)?))
    }

    pub(crate) fn update(
        &self,
        request: &Request,
        pk: &str,
        partial: bool,
    ) -> AdminResult<Response> {
        let action = if partial { "partial_update" } else { "update" };
        let instance = self.get_object(action, request, pk)?;
        let schema = self.get_single_schema();
        let validated = schema.validate(&request.data, partial)?;

        let mut tracker = ModelDiff::new(&instance)?;

        let mut merged = match serde_json::to_value(&instance)? {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        merged.extend(validated);

        let mut record = self.build_record(merged)?;
        record.set_pk(instance.pk());
        let mut saved = self.store.update(record)?;

        tracker.record_updated(&saved)?;
        self.log_change(
            request,
            &saved,
            vec![ChangeMessage::changed(
                &self.meta,
                saved.to_string(),
                tracker.changed_fields(),
            )],
            summarize(tracker.diff()),
        )?;

        saved.clear_related_cache();
        Ok(Response::ok(schema.to_representation(&saved)?))
    }

    pub(crate) fn destroy(&self, request: &Request, pk: &str) -> AdminResult<Response> {
        let instance = self.get_object("destroy", request, pk)?;
        let object_repr = instance.to_string();

        self.log_deletion(
            request,
            &instance,
            &object_repr,
            vec![ChangeMessage::deleted(&self.meta, object_repr.clone())],
        )?;
        self.store.delete(instance.pk())?;

        Ok(Response::no_content())
    }

    /// Records of the queryset matching the request's field filters, in the
    /// requested order
    fn filter_queryset(&self, request: &Request) -> AdminResult<Vec<R>> {
        let queryset = self.get_queryset();

        let filters: Vec<(&str, &str)> = request
            .query
            .iter()
            .filter(|(key, _)| self.meta.get_field(key).is_some())
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        let ordering = request.query_param(ORDERING_PARAM).and_then(|raw| {
            let (field, descending) = match raw.strip_prefix('-') {
                Some(field) => (field, true),
                None => (raw, false),
            };
            self.meta.get_field(field).map(|_| (field, descending))
        });

        let mut rows: Vec<(R, Snapshot)> = Vec::new();
        for record in self.store.all()? {
            if !queryset.contains(&record) {
                continue;
            }
            let snap = snapshot(&record)?;
            let matched = filters.iter().all(|(field, expected)| {
                snap.get(*field).is_some_and(|v| value_matches(v, expected))
            });
            if matched {
                rows.push((record, snap));
            }
        }

        if let Some((field, descending)) = ordering {
            rows.sort_by(|(_, a), (_, b)| {
                let ord = compare_values(a.get(field), b.get(field));
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        Ok(rows.into_iter().map(|(record, _)| record).collect())
    }

    /// Page size for a list request, `None` when pagination is off
    fn page_size(&self, request: &Request) -> Option<usize> {
        let base = self.config.page_size.or(self.settings.page_size)?;
        let requested = request
            .query_param(PAGE_SIZE_PARAM)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|size| *size > 0);
        Some(requested.map_or(base, |size| size.min(self.settings.max_page_size)))
    }

    fn build_record(&self, data: Map<String, Value>) -> AdminResult<R> {
        serde_json::from_value(Value::Object(data))
            .map_err(|err| ValidationErrors::non_field(err.to_string()).into())
    }
}

/// Whether a stored value equals a query parameter
fn value_matches(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Bool(b) => match expected.to_ascii_lowercase().as_str() {
            "true" | "1" => *b,
            "false" | "0" => !*b,
            _ => false,
        },
        Value::Number(n) => match (n.as_f64(), expected.trim().parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => n.to_string() == expected,
        },
        Value::Null => expected.is_empty() || expected.eq_ignore_ascii_case("null"),
        other => other.to_string() == expected,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), Some(v)) if !v.is_null() => Ordering::Less,
        (Some(v), None | Some(Value::Null)) if !v.is_null() => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
