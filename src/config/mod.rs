use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::auth::AuthConfig;
use crate::cors::CorsConfig;
use crate::credentials::CredentialsConfig;
use crate::logging::LoggingConfig;
use crate::routes::RoutesConfig;
use crate::session::SessionConfig;

/// Top-level configuration for `initialize`.
///
/// The environment is an explicit value here rather than ambient process
/// state, so initialization stays deterministic under test.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    pub routes: RoutesConfig,
    pub credentials: Option<CredentialsConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    /// Read the environment from `APP_ENV`, defaulting to development.
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl AppConfig {
    /// Build a config for the reference server binary from environment
    /// variables. Embedding hosts usually construct `AppConfig` directly
    /// or deserialize it from a config file instead.
    pub fn from_env() -> Self {
        let mut config = AppConfig {
            environment: Environment::from_env(),
            ..AppConfig::default()
        };

        if let Ok(path) = env::var("INSTANT_ROUTES_PATH") {
            config.routes.path = PathBuf::from(path);
        }
        if let Ok(base) = env::var("INSTANT_ROUTES_BASE") {
            config.routes.base = Some(PathBuf::from(base));
        }
        if let Ok(prefix) = env::var("INSTANT_ROUTES_PREFIX") {
            config.routes.prefix = Some(prefix);
        }
        if let Ok(method) = env::var("INSTANT_AUTH_METHOD") {
            config.auth.method = method;
        }
        if let Ok(secret) = env::var("INSTANT_SESSION_SECRET") {
            config.session.options.secret = Some(secret);
        }

        config
    }
}
