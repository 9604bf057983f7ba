//! Convention-based REST API scaffolding for axum.
//!
//! `initialize` wires the configured subsystems together: it installs
//! logging, resolves the auth and session strategies (failing fast on
//! unknown names), loads credentials for the host's document client, and
//! auto-discovers CRUD resource routes from a directory tree.

pub mod auth;
pub mod config;
pub mod cors;
pub mod credentials;
pub mod crud;
pub mod error;
pub mod logging;
pub mod response;
pub mod routes;
pub mod session;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use crate::config::{AppConfig, Environment};
pub use crate::credentials::CredentialStore;
pub use crate::crud::{
    Actions, Controller, Document, MemoryRepository, MemoryStore, Repository, RepositoryProvider,
    ResourceState, Validation, Validator,
};
pub use crate::error::{ApiError, ConfigError, StorageError, ValidationFailure};
pub use crate::response::Reply;
pub use crate::routes::{DiscoveryContext, RoutesConfig};
pub use crate::session::Session;

use crate::auth::AuthStrategy;
use crate::logging::LogGuards;
use crate::session::SessionStrategy;

/// The wired-together subsystems, returned by [`initialize`] for the host
/// to mount. `into_router` composes them in the conventional order;
/// hosts with their own layering pull the parts out individually.
#[derive(Debug)]
pub struct Api {
    /// Auto-discovered CRUD resource routes.
    pub routes: Router,
    pub cors: CorsLayer,
    /// Loaded credentials for the host's storage client, when configured.
    pub credentials: Option<CredentialStore>,
    auth: AuthStrategy,
    session: SessionStrategy,
    logging: LogGuards,
}

impl Api {
    /// Compose the parts into one router: routes wrapped by auth, session,
    /// CORS, and request logging, innermost to outermost. Returns the
    /// logging guards alongside; they must be held for the process
    /// lifetime.
    pub fn into_router(self) -> (Router, LogGuards) {
        let Api {
            routes,
            cors,
            auth,
            session,
            logging: guards,
            ..
        } = self;

        let router = session
            .apply(auth.apply(routes))
            .layer(cors)
            .layer(logging::request_layer());
        (router, guards)
    }
}

/// Validate the configuration, install logging, and discover routes.
///
/// Every configuration problem surfaces here as a [`ConfigError`] before
/// the first request is accepted; nothing is resolved lazily at request
/// time.
pub fn initialize(
    config: AppConfig,
    provider: Arc<dyn RepositoryProvider>,
) -> Result<Api, ConfigError> {
    let logging = logging::init(&config.logging, config.environment);
    tracing::info!(environment = ?config.environment, "initializing instant-api");

    let auth = auth::resolve(&config.auth)?;
    let session = session::resolve(&config.session)?;
    let credentials = match &config.credentials {
        Some(credentials_config) => Some(credentials::load(credentials_config)?),
        None => None,
    };
    let cors = cors::layer(&config.cors);

    let ctx = DiscoveryContext::new(provider).redact_errors(config.environment.is_production());
    let routes = routes::discover(&config.routes, &ctx);

    Ok(Api {
        routes,
        cors,
        credentials,
        auth,
        session,
        logging,
    })
}
