//! Table endpoint (`/rest/v1/:table`)

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::MockState;

type Params = Vec<(String, String)>;

const CONTROL_PARAMS: [&str; 3] = ["select", "order", "limit"];

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `eq.<v>` and `in.("a","b")` filters
fn matches(row: &Value, params: &Params) -> bool {
    params
        .iter()
        .filter(|(k, _)| !CONTROL_PARAMS.contains(&k.as_str()))
        .all(|(column, filter)| {
            let actual = row.get(column).map(text).unwrap_or_default();
            if let Some(expected) = filter.strip_prefix("eq.") {
                actual == expected
            } else if let Some(list) = filter
                .strip_prefix("in.(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                list.split(',')
                    .map(|item| item.trim().trim_matches('"'))
                    .any(|item| item == actual)
            } else {
                false
            }
        })
}

fn sort_and_limit(rows: &mut Vec<Value>, params: &Params) {
    if let Some((column, direction)) = param(params, "order").and_then(|o| o.split_once('.')) {
        rows.sort_by(|a, b| {
            let a = a.get(column).map(text).unwrap_or_default();
            let b = b.get(column).map(text).unwrap_or_default();
            let ord = a.cmp(&b);
            if direction == "desc" {
                ord.reverse()
            } else {
                ord
            }
        });
    }
    if let Some(limit) = param(params, "limit").and_then(|l| l.parse().ok()) {
        rows.truncate(limit);
    }
}

/// Attach embedded relations named in `select`
fn embed(state: &MockState, mut row: Value, params: &Params) -> Value {
    let select = param(params, "select").unwrap_or("*");
    if select.contains("profiles(") {
        let profile = row
            .get("user_id")
            .map_or(Value::Null, |user_id| state.profile(user_id));
        row["profiles"] = profile;
    }
    if select.contains("blog_post_tags(") {
        let post_id = row.get("id").cloned().unwrap_or(Value::Null);
        let tags = state.rows("tags");
        let links: Vec<Value> = state
            .rows("blog_post_tags")
            .into_iter()
            .filter(|link| link.get("blog_post_id") == Some(&post_id))
            .filter_map(|link| {
                let tag_id = link.get("tag_id")?;
                tags.iter().find(|t| t.get("id") == Some(tag_id)).cloned()
            })
            .map(|tag| json!({ "tags": tag }))
            .collect();
        row["blog_post_tags"] = Value::Array(links);
    }
    row
}

/// Row-level check: rows owned by a user are writable by that user only
fn writable(row: &Value, caller: Option<&str>) -> bool {
    match row.get("user_id") {
        Some(owner) => caller.is_some_and(|caller| text(owner) == caller),
        None => true,
    }
}

fn rls_violation() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy",
            "details": null,
            "hint": null
        })),
    )
        .into_response()
}

fn wants_representation(headers: &HeaderMap) -> bool {
    headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("return=representation"))
}

pub(super) async fn select(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    state.record("GET", &table);
    if state.failing_tables.lock().contains(&table) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "database unavailable"})),
        )
            .into_response();
    }

    let mut rows: Vec<Value> = state
        .rows(&table)
        .into_iter()
        .filter(|row| matches(row, &params))
        .collect();
    sort_and_limit(&mut rows, &params);
    let rows: Vec<Value> = rows
        .into_iter()
        .map(|row| embed(&state, row, &params))
        .collect();
    Json(rows).into_response()
}

pub(super) async fn insert(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", &table);
    let caller = MockState::caller(&headers).map(|id| id.to_string());

    let incoming = match body {
        Value::Array(rows) => rows,
        row => vec![row],
    };
    let mut stored = Vec::with_capacity(incoming.len());
    for mut row in incoming {
        if !row.is_object() {
            return (StatusCode::BAD_REQUEST, Json(json!({"message": "expected object"})))
                .into_response();
        }
        if !writable(&row, caller.as_deref()) {
            return rls_violation();
        }
        if row.get("id").is_none() {
            row["id"] = json!(Uuid::new_v4());
        }
        if row.get("created_at").is_none() {
            row["created_at"] = json!(Utc::now().to_rfc3339());
        }
        stored.push(row);
    }

    state.insert_rows(&table, stored.clone());
    if table == "messages" {
        for row in &stored {
            let _ = state.inserts.send(row.clone());
        }
    }

    if wants_representation(&headers) {
        let rows: Vec<Value> = stored
            .into_iter()
            .map(|row| embed(&state, row, &params))
            .collect();
        (StatusCode::CREATED, Json(rows)).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

pub(super) async fn update(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    state.record("PATCH", &table);
    let caller = MockState::caller(&headers).map(|id| id.to_string());
    let Some(patch) = patch.as_object() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "expected object"})))
            .into_response();
    };

    let mut updated = Vec::new();
    {
        let mut tables = state.tables.lock();
        for row in tables.entry(table.clone()).or_default().iter_mut() {
            if !matches(row, &params) || !writable(row, caller.as_deref()) {
                continue;
            }
            for (column, value) in patch {
                row[column] = value.clone();
            }
            if row.get("updated_at").is_some() || table == "blog_posts" {
                row["updated_at"] = json!(Utc::now().to_rfc3339());
            }
            updated.push(row.clone());
        }
    }

    if wants_representation(&headers) {
        let rows: Vec<Value> = updated
            .into_iter()
            .map(|row| embed(&state, row, &params))
            .collect();
        Json(rows).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

pub(super) async fn remove(
    State(state): State<Arc<MockState>>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
) -> Response {
    state.record("DELETE", &table);
    let caller = MockState::caller(&headers).map(|id| id.to_string());

    if let Some(rows) = state.tables.lock().get_mut(&table) {
        rows.retain(|row| !(matches(row, &params) && writable(row, caller.as_deref())));
    }
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_filters() {
        let row = json!({"id": "a", "channel_id": "c1", "n": 3});
        assert!(matches(&row, &params(&[("channel_id", "eq.c1"), ("select", "*")])));
        assert!(!matches(&row, &params(&[("channel_id", "eq.c2")])));
        assert!(matches(&row, &params(&[("id", "in.(\"b\",\"a\")")])));
        assert!(matches(&row, &params(&[("n", "eq.3")])));
    }

    #[test]
    fn test_order_desc_and_limit() {
        let mut rows = vec![json!({"t": "1"}), json!({"t": "3"}), json!({"t": "2"})];
        sort_and_limit(&mut rows, &params(&[("order", "t.desc"), ("limit", "2")]));
        assert_eq!(rows, vec![json!({"t": "3"}), json!({"t": "2"})]);
    }

    #[test]
    fn test_writable() {
        let row = json!({"user_id": "u1"});
        assert!(writable(&row, Some("u1")));
        assert!(!writable(&row, Some("u2")));
        assert!(!writable(&row, None));
        assert!(writable(&json!({"name": "general"}), None));
    }
}
