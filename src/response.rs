use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

/// Response envelope produced by the Action layer. Exactly one status kind
/// is chosen per request; errors go through `ApiError` instead.
#[derive(Debug)]
pub enum Reply {
    /// 200 with the payload exactly as the layer below returned it.
    Ok(Value),
    /// 204 with no body.
    NoContent,
    /// 404 with no body: how absence is signaled, never an error object.
    NotFound,
}

impl Reply {
    pub fn ok(payload: impl Into<Value>) -> Self {
        Reply::Ok(payload.into())
    }

    pub fn no_content() -> Self {
        Reply::NoContent
    }

    pub fn not_found() -> Self {
        Reply::NotFound
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
            Reply::NoContent => StatusCode::NO_CONTENT.into_response(),
            Reply::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}
