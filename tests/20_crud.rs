mod common;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use std::sync::Arc;

use instant_api::{
    Actions, Document, Repository, ResourceState, StorageError,
};

#[tokio::test]
async fn create_then_read_by_id_returns_the_exact_document() -> Result<()> {
    let app = common::resource_app("users");

    let (status, _, bytes) =
        common::send(&app, "POST", "/users", &[], Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::OK);
    let created = common::json(&bytes);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "x");

    let (status, _, bytes) = common::send(&app, "GET", &format!("/users/{id}"), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&bytes), created);
    Ok(())
}

#[tokio::test]
async fn find_by_id_miss_is_an_empty_404() -> Result<()> {
    let app = common::resource_app("users");
    let (status, _, bytes) = common::send(&app, "GET", "/users/missing-id", &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(bytes.is_empty(), "404 body must be empty, got {bytes:?}");
    Ok(())
}

#[tokio::test]
async fn find_returns_ok_with_an_empty_collection() -> Result<()> {
    let app = common::resource_app("users");
    let (status, _, bytes) = common::send(&app, "GET", "/users", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&bytes), json!([]));
    Ok(())
}

#[tokio::test]
async fn find_filters_on_query_parameters() -> Result<()> {
    let app = common::resource_app("users");
    for name in ["a", "b"] {
        common::send(&app, "POST", "/users", &[], Some(json!({ "name": name }))).await;
    }

    let (status, _, bytes) = common::send(&app, "GET", "/users?name=a", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let found = common::json(&bytes);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "a");
    Ok(())
}

#[tokio::test]
async fn find_one_returns_404_when_nothing_matches() -> Result<()> {
    let app = common::resource_app("users");
    common::send(&app, "POST", "/users", &[], Some(json!({ "name": "a" }))).await;

    let (status, _, bytes) = common::send(&app, "GET", "/users/one?name=a", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&bytes)["name"], "a");

    let (status, _, bytes) = common::send(&app, "GET", "/users/one?name=zzz", &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_many_responds_ok_with_every_created_document() -> Result<()> {
    let app = common::resource_app("users");
    let (status, _, bytes) = common::send(
        &app,
        "POST",
        "/users/many",
        &[],
        Some(json!([{ "name": "a" }, { "name": "b" }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&bytes).as_array().unwrap().len(), 2);

    let (_, _, bytes) = common::send(&app, "GET", "/users", &[], None).await;
    assert_eq!(common::json(&bytes).as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn create_with_id_uses_the_path_id() -> Result<()> {
    let app = common::resource_app("users");
    let (status, _, bytes) = common::send(
        &app,
        "POST",
        "/users/fixed-id",
        &[],
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&bytes)["id"], "fixed-id");

    // Duplicate creation surfaces through the error path, not a panic.
    let (status, _, bytes) = common::send(
        &app,
        "POST",
        "/users/fixed-id",
        &[],
        Some(json!({ "name": "y" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(common::json(&bytes)["error"], true);
    Ok(())
}

#[tokio::test]
async fn update_hits_and_misses() -> Result<()> {
    let app = common::resource_app("users");
    let (_, _, bytes) =
        common::send(&app, "POST", "/users", &[], Some(json!({ "name": "x" }))).await;
    let id = common::json(&bytes)["id"].as_str().unwrap().to_string();

    let (status, _, bytes) = common::send(
        &app,
        "PUT",
        &format!("/users/{id}"),
        &[],
        Some(json!({ "name": "y" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&bytes)["name"], "y");

    let (status, _, bytes) = common::send(
        &app,
        "PUT",
        "/users/missing-id",
        &[],
        Some(json!({ "name": "z" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn upsert_creates_then_updates_by_query() -> Result<()> {
    let app = common::resource_app("pages");

    let (status, _, bytes) = common::send(
        &app,
        "PUT",
        "/pages?slug=home",
        &[],
        Some(json!({ "title": "Home" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let first = common::json(&bytes);
    assert_eq!(first["slug"], "home");

    let (status, _, bytes) = common::send(
        &app,
        "PUT",
        "/pages?slug=home",
        &[],
        Some(json!({ "title": "Welcome" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second = common::json(&bytes);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["title"], "Welcome");

    let (_, _, bytes) = common::send(&app, "GET", "/pages", &[], None).await;
    assert_eq!(common::json(&bytes).as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn delete_returns_the_document_then_404s() -> Result<()> {
    let app = common::resource_app("users");
    let (_, _, bytes) =
        common::send(&app, "POST", "/users", &[], Some(json!({ "name": "x" }))).await;
    let id = common::json(&bytes)["id"].as_str().unwrap().to_string();

    let (status, _, bytes) = common::send(&app, "DELETE", &format!("/users/{id}"), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::json(&bytes)["name"], "x");

    let (status, _, bytes) = common::send(&app, "DELETE", &format!("/users/{id}"), &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn non_object_create_body_is_a_validation_error() -> Result<()> {
    let app = common::resource_app("users");
    let (status, _, bytes) = common::send(&app, "POST", "/users", &[], Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(common::json(&bytes)["code"], "VALIDATION_ERROR");
    Ok(())
}

/// Collaborator whose every operation fails, for exercising the error path.
struct FailingRepository;

#[async_trait]
impl Repository for FailingRepository {
    async fn create(&self, _: Document) -> Result<Document, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn create_with_id(&self, _: &str, _: Document) -> Result<Document, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn create_many(&self, _: Vec<Document>) -> Result<Vec<Document>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn find(
        &self,
        _: &instant_api::crud::QueryParams,
    ) -> Result<Vec<Document>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn find_one(
        &self,
        _: &instant_api::crud::QueryParams,
    ) -> Result<Option<Document>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn find_by_id(&self, _: &str) -> Result<Option<Document>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn update(&self, _: &str, _: Document) -> Result<Option<Document>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn update_or_create(
        &self,
        _: &instant_api::crud::QueryParams,
        _: Document,
    ) -> Result<Option<Document>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
    async fn delete(&self, _: &str) -> Result<Option<Document>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
}

#[tokio::test]
async fn storage_errors_become_500s_and_the_router_keeps_serving() -> Result<()> {
    let state = ResourceState::new(Arc::new(FailingRepository), "users", false);
    let app = Router::new().nest("/users", Actions::router(state));

    let (status, _, bytes) = common::send(&app, "GET", "/users", &[], None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::json(&bytes);
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("backend offline"));

    // The failure is contained per-request: the next request is served too.
    let (status, _, _) =
        common::send(&app, "POST", "/users", &[], Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn storage_error_detail_is_redacted_when_configured() -> Result<()> {
    let state = ResourceState::new(Arc::new(FailingRepository), "users", true);
    let app = Router::new().nest("/users", Actions::router(state));

    let (status, _, bytes) = common::send(&app, "GET", "/users", &[], None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = common::json(&bytes)["message"].as_str().unwrap().to_string();
    assert!(!message.contains("backend offline"), "detail leaked: {message}");
    Ok(())
}
