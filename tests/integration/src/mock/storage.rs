//! Storage endpoint (`/storage/v1/object/...`)

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::{MockState, StoredObject};

fn not_found(key: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"statusCode": "404", "error": "not_found", "message": format!("Object not found: {key}")})),
    )
        .into_response()
}

/// `<bucket>/<path>` with the optional `public/` prefix removed
fn object_key(path: &str) -> &str {
    path.strip_prefix("public/").unwrap_or(path)
}

pub(super) async fn upload(
    State(state): State<Arc<MockState>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = object_key(&path).to_string();
    state.record("POST", &format!("object:{key}"));

    let upsert = headers
        .get("x-upsert")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true");
    let mut objects = state.objects.lock();
    if objects.contains_key(&key) && !upsert {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"statusCode": "409", "error": "Duplicate", "message": "The resource already exists"})),
        )
            .into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    objects.insert(
        key.clone(),
        StoredObject {
            bytes: body.to_vec(),
            content_type,
        },
    );
    Json(json!({"Key": key})).into_response()
}

pub(super) async fn download(
    State(state): State<Arc<MockState>>,
    Path(path): Path<String>,
) -> Response {
    let key = object_key(&path);
    state.record("GET", &format!("object:{key}"));

    match state.objects.lock().get(key) {
        Some(object) => (
            [(header::CONTENT_TYPE, object.content_type.clone())],
            object.bytes.clone(),
        )
            .into_response(),
        None => not_found(key),
    }
}
