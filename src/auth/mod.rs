// Authentication strategies, selected by name at startup.
pub mod basic;

use axum::{middleware, Router};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigError;

pub use basic::AuthUser;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Strategy name: `"none"` (default) or `"basic"`.
    pub method: String,
    /// Username to password map for the basic strategy.
    pub users: HashMap<String, String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            method: "none".to_string(),
            users: HashMap::new(),
        }
    }
}

/// Resolved authentication strategy. Resolution happens exactly once at
/// startup; an unknown method name is a fatal `ConfigError`, not a runtime
/// lookup failure.
#[derive(Clone, Debug)]
pub enum AuthStrategy {
    None,
    Basic { users: Arc<HashMap<String, String>> },
}

pub fn resolve(config: &AuthConfig) -> Result<AuthStrategy, ConfigError> {
    match config.method.as_str() {
        "" | "none" => {
            tracing::info!("using auth method: none");
            Ok(AuthStrategy::None)
        }
        "basic" => {
            tracing::info!("using auth method: basic");
            if config.users.is_empty() {
                tracing::warn!("basic auth configured with no users; every request will be rejected");
            }
            Ok(AuthStrategy::Basic {
                users: Arc::new(config.users.clone()),
            })
        }
        other => Err(ConfigError::UnknownAuthMethod(other.to_string())),
    }
}

impl AuthStrategy {
    /// Wrap a router with this strategy's middleware. The `none` strategy
    /// leaves the router untouched.
    pub fn apply(&self, router: Router) -> Router {
        match self {
            AuthStrategy::None => router,
            AuthStrategy::Basic { users } => router.layer(middleware::from_fn_with_state(
                users.clone(),
                basic::basic_auth_middleware,
            )),
        }
    }
}
