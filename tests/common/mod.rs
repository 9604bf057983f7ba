#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use instant_api::{Actions, MemoryStore, ResourceState};

/// A single CRUD resource mounted at `/{collection}`, backed by a fresh
/// in-memory store. Clones of the returned router share state.
pub fn resource_app(collection: &str) -> Router {
    let store = MemoryStore::new();
    let state = ResourceState::new(store.open_repository(collection), collection, false);
    Router::new().nest(&format!("/{collection}"), Actions::router(state))
}

/// Drive one request through the router in-process and collect the
/// response pieces.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Bytes) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request build"))
        .await
        .expect("router never errors");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collect");
    (status, headers, bytes)
}

pub fn json(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).expect("response is JSON")
}
