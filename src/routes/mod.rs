// Convention-based route discovery: the directory tree is the route table.
use axum::Router;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::crud::{Actions, RepositoryProvider, ResourceState, Validation};

/// Route discovery configuration.
///
/// With `base` set, each subdirectory of `base` is treated as an API
/// version and resources are discovered under `<version>/<path>`, mounted
/// as `/{prefix/}{version}/{segment}`. Without `base`, resources are
/// discovered directly under `path`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub base: Option<PathBuf>,
    pub path: PathBuf,
    pub prefix: Option<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            base: None,
            path: PathBuf::from("routes"),
            prefix: None,
        }
    }
}

/// Everything discovery needs besides the directory layout: the storage
/// collaborator factory, optional per-segment validation hooks, and the
/// error-redaction policy handed down to each resource.
pub struct DiscoveryContext {
    pub provider: Arc<dyn RepositoryProvider>,
    pub validators: HashMap<String, Validation>,
    pub redact_errors: bool,
}

impl DiscoveryContext {
    pub fn new(provider: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            provider,
            validators: HashMap::new(),
            redact_errors: false,
        }
    }

    pub fn with_validators(mut self, validators: HashMap<String, Validation>) -> Self {
        self.validators = validators;
        self
    }

    pub fn redact_errors(mut self, redact: bool) -> Self {
        self.redact_errors = redact;
        self
    }
}

/// Walk the configured directories and mount one CRUD resource router per
/// discovered module file. Runs once at startup, before any request is
/// accepted. A missing or empty directory logs an error and yields zero
/// routes; the host still starts.
pub fn discover(config: &RoutesConfig, ctx: &DiscoveryContext) -> Router {
    let mut router = Router::new();

    if let Some(base) = &config.base {
        let versions = subdirectories(base);
        if versions.is_empty() {
            tracing::error!(path = %base.display(), "no API versions detected");
            return router;
        }
        for version in versions {
            let prefix = match &config.prefix {
                Some(prefix) => format!("{}/{}", prefix, version),
                None => version.clone(),
            };
            router = mount(router, &base.join(&version).join(&config.path), Some(prefix), ctx);
        }
    } else {
        router = mount(router, &config.path, config.prefix.clone(), ctx);
    }

    router
}

fn mount(mut router: Router, dir: &Path, prefix: Option<String>, ctx: &DiscoveryContext) -> Router {
    let segments = route_segments(dir);
    if segments.is_empty() {
        tracing::error!(path = %dir.display(), "no API routes detected");
        return router;
    }

    for segment in segments {
        let route = match &prefix {
            Some(prefix) => format!("/{}/{}", prefix, segment),
            None => format!("/{}", segment),
        };
        tracing::info!(route = %route, "adding route");

        let mut state = ResourceState::new(
            ctx.provider.open(&segment),
            segment.clone(),
            ctx.redact_errors,
        );
        if let Some(validation) = ctx.validators.get(&segment) {
            state = state.with_validation(validation.clone());
        }
        router = router.nest(&route, Actions::router(state));
    }

    router
}

/// List the URL segments under a routes directory: the file stem of every
/// regular, non-hidden file, sorted for deterministic mount order and
/// deduplicated (directory enumeration order is not stable across
/// platforms, so the listing is never trusted as-is).
fn route_segments(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::error!(path = %dir.display(), error = %err, "failed to read routes directory");
            return Vec::new();
        }
    };

    let mut segments: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_owned)
        })
        .filter(|segment| !segment.is_empty() && !segment.starts_with('.'))
        .collect();

    segments.sort();
    segments.dedup_by(|later, earlier| {
        let duplicate = later == earlier;
        if duplicate {
            tracing::warn!(segment = %later, "duplicate route module ignored");
        }
        duplicate
    });
    segments
}

fn subdirectories(base: &Path) -> Vec<String> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::error!(path = %base.display(), error = %err, "failed to read routes base directory");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}
