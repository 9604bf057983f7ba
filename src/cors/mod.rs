use axum::http::{HeaderName, HeaderValue, Method};
use serde::Deserialize;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

/// CORS options, forwarded essentially verbatim to `tower_http`. An empty
/// config yields a permissive layer, matching the behavior of spreading an
/// empty options object into the upstream middleware.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: Option<u64>,
}

pub fn layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    // Credentials cannot be combined with wildcard origins; requesting both
    // keeps the wildcard and drops credentials with a warning.
    let credentials = config.allow_credentials && !config.allowed_origins.is_empty();
    if config.allow_credentials && !credentials {
        tracing::warn!("allow_credentials ignored: no explicit allowed_origins configured");
    }

    layer = if config.allowed_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "skipping unparseable CORS origin");
                    None
                }
            })
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    };

    layer = if config.allowed_methods.is_empty() {
        if credentials {
            layer.allow_methods(AllowMethods::list([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ]))
        } else {
            layer.allow_methods(Any)
        }
    } else {
        let methods: Vec<Method> = config
            .allowed_methods
            .iter()
            .filter_map(|method| Method::from_bytes(method.as_bytes()).ok())
            .collect();
        layer.allow_methods(AllowMethods::list(methods))
    };

    layer = if config.allowed_headers.is_empty() {
        if credentials {
            layer.allow_headers(AllowHeaders::list([
                HeaderName::from_static("content-type"),
                HeaderName::from_static("authorization"),
            ]))
        } else {
            layer.allow_headers(Any)
        }
    } else {
        let headers: Vec<HeaderName> = config
            .allowed_headers
            .iter()
            .filter_map(|header| HeaderName::from_bytes(header.as_bytes()).ok())
            .collect();
        layer.allow_headers(AllowHeaders::list(headers))
    };

    if credentials {
        layer = layer.allow_credentials(true);
    }
    if let Some(secs) = config.max_age_secs {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    layer
}
