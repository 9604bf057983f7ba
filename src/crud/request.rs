use serde_json::Value;
use std::collections::BTreeMap;

/// Query-string parameters, ordered for deterministic matching.
pub type QueryParams = BTreeMap<String, String>;

/// Per-request envelope assembled by the Action layer before validation
/// runs. Local to one request; discarded once the response is sent.
#[derive(Debug, Clone)]
pub struct CrudRequest {
    /// The `:id` path parameter, when the route has one.
    pub id: Option<String>,
    pub query: QueryParams,
    /// Request body as parsed JSON; `Value::Null` for body-less requests.
    pub body: Value,
}

impl CrudRequest {
    pub fn new(id: Option<String>, query: QueryParams, body: Value) -> Self {
        Self { id, query, body }
    }
}
