use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::crud::controller::Controller;
use crate::crud::repository::{Document, Repository};
use crate::crud::request::{CrudRequest, QueryParams};
use crate::crud::validation::Validation;
use crate::error::{ApiError, StorageError, ValidationFailure};
use crate::response::Reply;

/// Per-resource handler state: the controller chain, the validation hook,
/// and the error-redaction policy for this deployment.
#[derive(Clone)]
pub struct ResourceState {
    controller: Arc<Controller>,
    validation: Arc<Validation>,
    collection: Arc<str>,
    redact_errors: bool,
}

impl ResourceState {
    pub fn new(
        repository: Arc<dyn Repository>,
        collection: impl Into<String>,
        redact_errors: bool,
    ) -> Self {
        Self {
            controller: Arc::new(Controller::new(repository)),
            validation: Arc::new(Validation::none()),
            collection: collection.into().into(),
            redact_errors,
        }
    }

    /// Attach a request-validation hook: a single validator or an ordered
    /// sequence, run before any handler executes.
    pub fn with_validation(mut self, validation: impl Into<Validation>) -> Self {
        self.validation = Arc::new(validation.into());
        self
    }

    /// Storage errors never propagate past the Action layer: log, then
    /// serialize. In production the detail is redacted from the response.
    fn storage_error(&self, operation: &str, err: StorageError) -> ApiError {
        tracing::error!(
            collection = %self.collection,
            operation,
            error = %err,
            "storage operation failed"
        );
        if self.redact_errors {
            ApiError::internal("an error occurred while processing the request")
        } else {
            ApiError::internal(err.to_string())
        }
    }
}

/// HTTP-facing layer of the CRUD chain. `router` mounts the conventional
/// REST surface for one resource:
///
/// - `POST /` create, `POST /many` createMany, `POST /:id` createWithId
/// - `GET /` find, `GET /one` findOne, `GET /:id` findById
/// - `PUT /:id` update, `PUT /` query-based upsert
/// - `DELETE /:id` delete
pub struct Actions;

impl Actions {
    pub fn router(state: ResourceState) -> Router {
        Router::new()
            .route("/", post(create).get(find).put(update_or_create))
            .route("/many", post(create_many))
            .route("/one", get(find_one))
            .route(
                "/:id",
                post(create_with_id)
                    .get(find_by_id)
                    .put(update)
                    .delete(delete),
            )
            .with_state(state)
    }
}

fn object_body(body: &Value) -> Result<Document, ApiError> {
    match body {
        Value::Object(map) => Ok(map.clone()),
        _ => Err(ApiError::validation(vec![ValidationFailure::new(
            "body",
            "",
            "expected a JSON object",
        )])),
    }
}

fn array_body(body: &Value) -> Result<Vec<Document>, ApiError> {
    let Value::Array(items) = body else {
        return Err(ApiError::validation(vec![ValidationFailure::new(
            "body",
            "",
            "expected a JSON array of objects",
        )]));
    };
    items.iter().map(object_body).collect()
}

fn documents_payload(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(Value::Object).collect())
}

async fn create(
    State(state): State<ResourceState>,
    Query(query): Query<QueryParams>,
    Json(body): Json<Value>,
) -> Response {
    let request = CrudRequest::new(None, query, body);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    let attributes = match object_body(&request.body) {
        Ok(attributes) => attributes,
        Err(err) => return err.into_response(),
    };
    match state.controller.create(attributes).await {
        Ok(document) => Reply::ok(Value::Object(document)).into_response(),
        Err(err) => state.storage_error("create", err).into_response(),
    }
}

async fn create_with_id(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    Query(query): Query<QueryParams>,
    Json(body): Json<Value>,
) -> Response {
    let request = CrudRequest::new(Some(id.clone()), query, body);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    let attributes = match object_body(&request.body) {
        Ok(attributes) => attributes,
        Err(err) => return err.into_response(),
    };
    match state.controller.create_with_id(&id, attributes).await {
        Ok(document) => Reply::ok(Value::Object(document)).into_response(),
        Err(err) => state.storage_error("createWithId", err).into_response(),
    }
}

async fn create_many(
    State(state): State<ResourceState>,
    Query(query): Query<QueryParams>,
    Json(body): Json<Value>,
) -> Response {
    let request = CrudRequest::new(None, query, body);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    let items = match array_body(&request.body) {
        Ok(items) => items,
        Err(err) => return err.into_response(),
    };
    match state.controller.create_many(items).await {
        Ok(documents) => Reply::ok(documents_payload(documents)).into_response(),
        Err(err) => state.storage_error("createMany", err).into_response(),
    }
}

/// Collection-level absence is not 404: an empty result set is still ok.
async fn find(State(state): State<ResourceState>, Query(query): Query<QueryParams>) -> Response {
    let request = CrudRequest::new(None, query, Value::Null);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    match state.controller.find(&request.query).await {
        Ok(documents) => Reply::ok(documents_payload(documents)).into_response(),
        Err(err) => state.storage_error("find", err).into_response(),
    }
}

async fn find_one(
    State(state): State<ResourceState>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = CrudRequest::new(None, query, Value::Null);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    match state.controller.find_one(&request.query).await {
        Ok(Some(document)) => Reply::ok(Value::Object(document)).into_response(),
        Ok(None) => Reply::not_found().into_response(),
        Err(err) => state.storage_error("findOne", err).into_response(),
    }
}

async fn find_by_id(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = CrudRequest::new(Some(id.clone()), query, Value::Null);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    match state.controller.find_by_id(&id).await {
        Ok(Some(document)) => Reply::ok(Value::Object(document)).into_response(),
        Ok(None) => Reply::not_found().into_response(),
        Err(err) => state.storage_error("findById", err).into_response(),
    }
}

async fn update(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    Query(query): Query<QueryParams>,
    Json(body): Json<Value>,
) -> Response {
    let request = CrudRequest::new(Some(id.clone()), query, body);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    let attributes = match object_body(&request.body) {
        Ok(attributes) => attributes,
        Err(err) => return err.into_response(),
    };
    match state.controller.update(&id, attributes).await {
        Ok(Some(document)) => Reply::ok(Value::Object(document)).into_response(),
        Ok(None) => Reply::not_found().into_response(),
        Err(err) => state.storage_error("update", err).into_response(),
    }
}

async fn update_or_create(
    State(state): State<ResourceState>,
    Query(query): Query<QueryParams>,
    Json(body): Json<Value>,
) -> Response {
    let request = CrudRequest::new(None, query, body);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    let attributes = match object_body(&request.body) {
        Ok(attributes) => attributes,
        Err(err) => return err.into_response(),
    };
    match state
        .controller
        .update_or_create(&request.query, attributes)
        .await
    {
        Ok(Some(document)) => Reply::ok(Value::Object(document)).into_response(),
        Ok(None) => Reply::not_found().into_response(),
        Err(err) => state.storage_error("updateOrCreate", err).into_response(),
    }
}

async fn delete(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    Query(query): Query<QueryParams>,
) -> Response {
    let request = CrudRequest::new(Some(id.clone()), query, Value::Null);
    if let Err(err) = state.validation.run(&request) {
        return err.into_response();
    }
    match state.controller.delete(&id).await {
        Ok(Some(document)) => Reply::ok(Value::Object(document)).into_response(),
        Ok(None) => Reply::not_found().into_response(),
        Err(err) => state.storage_error("delete", err).into_response(),
    }
}
