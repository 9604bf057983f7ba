use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use instant_api::{AppConfig, MemoryStore, RepositoryProvider};

/// Reference server: discovers routes from the configured directory and
/// serves them against the in-memory document store.
#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up APP_ENV, INSTANT_ROUTES_PATH, etc.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();
    let provider: Arc<dyn RepositoryProvider> = Arc::new(MemoryStore::new());

    let api = match instant_api::initialize(config, provider) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    let (app, _log_guards) = api.into_router();
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(app);

    let port = std::env::var("INSTANT_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("instant-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "instant-api",
        "version": version,
        "description": "Convention-based REST API scaffolding for axum",
        "endpoints": {
            "home": "/",
            "health": "/health",
            "resources": "/{prefix}/{segment} (discovered from the routes directory)",
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
