use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::crud::Document;
use crate::session::{cookie_value, set_cookie, Session, SessionOptions};

/// Client-side sessions: the whole payload travels in the cookie as
/// base64 JSON plus a keyed SHA-256 digest. Tampered or unsigned cookies
/// silently start a fresh session.
#[derive(Debug)]
pub struct CookieSessions {
    options: SessionOptions,
    secret: String,
}

impl CookieSessions {
    pub fn new(options: SessionOptions, secret: String) -> Self {
        Self { options, secret }
    }

    fn sign(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b".");
        hasher.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    fn encode(&self, data: &Document) -> Option<String> {
        let json = serde_json::to_vec(data).ok()?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = self.sign(&payload);
        Some(format!("{}.{}", payload, signature))
    }

    fn decode(&self, value: &str) -> Option<Document> {
        let (payload, signature) = value.rsplit_once('.')?;
        if self.sign(payload) != signature {
            tracing::warn!("session cookie failed signature check; starting a fresh session");
            return None;
        }
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

pub async fn session_middleware(
    State(sessions): State<Arc<CookieSessions>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = cookie_value(request.headers(), &sessions.options.name)
        .and_then(|value| sessions.decode(&value));

    let fresh = existing.is_none();
    let session = existing.map(Session::from_document).unwrap_or_default();

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if fresh || session.is_dirty() {
        if let Some(encoded) = sessions.encode(&session.snapshot()) {
            set_cookie(response.headers_mut(), &sessions.options, &encoded);
        }
    }
    response
}
