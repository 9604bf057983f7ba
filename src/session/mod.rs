// Session strategies, selected by name at startup.
pub mod cookie;
pub mod server;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    middleware, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::crud::Document;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Strategy name: `"server"` (default, server-side store keyed by a
    /// session-id cookie) or `"cookie"` (signed client-side payload).
    #[serde(rename = "type")]
    pub kind: String,
    pub options: SessionOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            kind: "server".to_string(),
            options: SessionOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub name: String,
    /// Signing secret; required by the cookie strategy.
    pub secret: Option<String>,
    pub max_age_secs: Option<u64>,
    pub http_only: bool,
    pub secure: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            name: "instant.sid".to_string(),
            secret: None,
            max_age_secs: None,
            http_only: true,
            secure: false,
        }
    }
}

/// Mutable per-request session handle, shared with handlers through
/// request extensions.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    data: Mutex<Document>,
    dirty: AtomicBool,
}

impl Session {
    fn from_document(data: Document) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                data: Mutex::new(data),
                dirty: AtomicBool::new(false),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.lock().insert(key.into(), value);
        self.inner.dirty.store(true, Ordering::SeqCst);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let removed = self.lock().remove(key);
        if removed.is_some() {
            self.inner.dirty.store(true, Ordering::SeqCst);
        }
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Document {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Document> {
        match self.inner.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Resolved session strategy. Unknown kinds are a fatal `ConfigError`.
#[derive(Clone, Debug)]
pub enum SessionStrategy {
    Server(Arc<server::ServerSessions>),
    Cookie(Arc<cookie::CookieSessions>),
}

pub fn resolve(config: &SessionConfig) -> Result<SessionStrategy, ConfigError> {
    match config.kind.as_str() {
        "" | "server" => {
            tracing::info!("using session type: server");
            Ok(SessionStrategy::Server(Arc::new(server::ServerSessions::new(
                config.options.clone(),
            ))))
        }
        "cookie" => {
            tracing::info!("using session type: cookie");
            let secret = config
                .options
                .secret
                .clone()
                .ok_or(ConfigError::MissingSessionSecret)?;
            Ok(SessionStrategy::Cookie(Arc::new(
                cookie::CookieSessions::new(config.options.clone(), secret),
            )))
        }
        other => Err(ConfigError::UnknownSessionKind(other.to_string())),
    }
}

impl SessionStrategy {
    pub fn apply(&self, router: Router) -> Router {
        match self {
            SessionStrategy::Server(sessions) => router.layer(middleware::from_fn_with_state(
                sessions.clone(),
                server::session_middleware,
            )),
            SessionStrategy::Cookie(sessions) => router.layer(middleware::from_fn_with_state(
                sessions.clone(),
                cookie::session_middleware,
            )),
        }
    }
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub(crate) fn set_cookie(headers: &mut HeaderMap, options: &SessionOptions, value: &str) {
    let mut cookie = format!("{}={}; Path=/", options.name, value);
    if let Some(age) = options.max_age_secs {
        cookie.push_str(&format!("; Max-Age={}", age));
    }
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    if let Ok(header_value) = HeaderValue::from_str(&cookie) {
        headers.append(header::SET_COOKIE, header_value);
    }
}
