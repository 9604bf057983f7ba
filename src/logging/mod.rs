use serde::Deserialize;
use std::path::{Path, PathBuf};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Environment;

/// Logging output configuration. File transports are only attached in
/// production; development keeps everything on the console at debug level.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub error: Option<LogFileConfig>,
    pub combined: Option<LogFileConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogFileConfig {
    pub filename: PathBuf,
}

/// Keeps the non-blocking file writers alive. Dropping this flushes and
/// stops file logging, so hold it for the process lifetime.
#[derive(Debug)]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Install the global tracing subscriber. Verbosity branches on the
/// explicit environment value, with `RUST_LOG` taking precedence when set.
/// Calling this twice keeps the first subscriber.
pub fn init(config: &LoggingConfig, environment: Environment) -> LogGuards {
    let default_level = if environment.is_production() {
        "info"
    } else {
        "debug"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let mut guards = Vec::new();

    let error_layer = config
        .error
        .as_ref()
        .filter(|_| environment.is_production())
        .map(|file| {
            let (writer, guard) = file_writer(&file.filename);
            guards.push(guard);
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(LevelFilter::ERROR)
        });

    let combined_layer = config
        .combined
        .as_ref()
        .filter(|_| environment.is_production())
        .map(|file| {
            let (writer, guard) = file_writer(&file.filename);
            guards.push(guard);
            fmt::layer().with_writer(writer).with_ansi(false)
        });

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(error_layer)
        .with(combined_layer)
        .try_init();
    if result.is_err() {
        tracing::debug!("logging already initialized; keeping the existing subscriber");
    }

    LogGuards { _guards: guards }
}

/// Per-request logging layer, applied around the whole router.
pub fn request_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

fn file_writer(path: &Path) -> (NonBlocking, WorkerGuard) {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "combined.log".into());
    let appender = tracing_appender::rolling::never(dir, name);
    tracing_appender::non_blocking(appender)
}
