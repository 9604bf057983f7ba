use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;

/// Authenticated user context injected into request extensions on success.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub name: String,
}

/// HTTP Basic authentication middleware backed by a static user map.
pub async fn basic_auth_middleware(
    State(users): State<Arc<HashMap<String, String>>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &users) {
        Ok(name) => {
            request.extensions_mut().insert(AuthUser { name });
            next.run(request).await
        }
        Err(message) => challenge(message),
    }
}

fn authenticate(
    headers: &HeaderMap,
    users: &HashMap<String, String>,
) -> Result<String, &'static str> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing Authorization header")?;
    let value = header.to_str().map_err(|_| "invalid Authorization header")?;
    let encoded = value
        .strip_prefix("Basic ")
        .ok_or("Authorization header must use the Basic scheme")?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| "credentials are not valid base64")?;
    let decoded = String::from_utf8(decoded).map_err(|_| "credentials are not valid UTF-8")?;
    let (name, password) = decoded
        .split_once(':')
        .ok_or("credentials must be user:password")?;

    match users.get(name) {
        Some(expected) if expected == password => Ok(name.to_string()),
        _ => Err("invalid credentials"),
    }
}

fn challenge(message: &'static str) -> Response {
    let mut response = ApiError::unauthorized(message).into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"instant-api\""),
    );
    response
}
