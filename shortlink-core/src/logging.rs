//! Logging setup for the console.
//!
//! Built on the `tracing` ecosystem: a stdout layer (text or JSON), an
//! optional daily-rolling file layer and a Sentry layer that turns error
//! events into tracked issues once [`crate::error_tracking`] is initialised.

use crate::config::LoggingConfig;
use crate::error::{CoreError, LoggingError};
use crate::utils;

use once_cell::sync::Lazy;
use std::io::stdout;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initializes a minimal logging setup, directing messages to `stderr`.
///
/// Meant for tests and early startup before configuration is loaded. Honours
/// `RUST_LOG`, defaulting to "info". Errors (e.g. a logger already set) are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

/// Creates a file logging layer with a daily rolling appender.
///
/// Ensures the parent directory exists. `format` is "json" or anything else for text.
fn create_file_layer(log_path: &Path, format: &str) -> Result<(BoxedLayer, WorkerGuard), CoreError> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            utils::fs::ensure_dir_exists(parent)?;
        }
    }

    let file_appender = tracing_appender::rolling::daily(
        log_path.parent().unwrap_or_else(|| Path::new(".")),
        log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("console.log")),
    );

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let layer = match format.to_lowercase().as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .boxed(),
        _ => fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .boxed(),
    };
    Ok((layer, guard))
}

/// Keeps the file writer's guard alive so buffered lines are flushed on exit.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

fn parse_level(level: &str) -> Result<Level, CoreError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        invalid_level => Err(CoreError::Logging(LoggingError::InitializationFailure(format!(
            "Invalid log level in config: {}",
            invalid_level
        )))),
    }
}

/// Builds every layer described by `config` without installing them.
fn build_layers(config: &LoggingConfig) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>), CoreError> {
    let level = parse_level(&config.level)?;

    let stdout_layer = match config.format.to_lowercase().as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(stdout)
            .with_ansi(false)
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed(),
        _ => fmt::layer()
            .with_writer(stdout)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed(),
    };

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer];
    let mut file_guard = None;

    if let Some(log_path) = &config.file_path {
        let (file_layer, guard) = create_file_layer(log_path, &config.format)?;
        layers.push(file_layer.with_filter(EnvFilter::new(level.to_string())).boxed());
        file_guard = Some(guard);
    }

    // No-op until a Sentry client is bound.
    layers.push(sentry_tracing::layer::<Registry>().boxed());

    Ok((layers, file_guard))
}

/// Initializes the global logging system from a [`LoggingConfig`].
///
/// With `is_reload == false` an already installed subscriber is an error;
/// with `is_reload == true` it is reported and tolerated.
///
/// # Errors
///
/// Returns [`LoggingError::InitializationFailure`] (wrapped in [`CoreError::Logging`])
/// for an invalid level or when the global subscriber cannot be installed.
pub fn init_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), CoreError> {
    let (layers, new_file_guard) = build_layers(config)?;

    let result = Registry::default().with(layers).try_init();

    match LOG_WORKER_GUARD.lock() {
        Ok(mut guard_slot) => {
            // The previous guard is dropped here, flushing its writer.
            *guard_slot = new_file_guard;
        }
        Err(e) => {
            eprintln!("[ERROR] Failed to lock LOG_WORKER_GUARD to update: {}. Log flushing may be affected.", e);
        }
    }

    match result {
        Ok(()) => {
            tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
            Ok(())
        }
        Err(e) if is_reload => {
            eprintln!("[INFO] Re-initializing logging configuration attempted. Previous logger may persist. Error: {}", e);
            Ok(())
        }
        Err(e) => Err(CoreError::Logging(LoggingError::InitializationFailure(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_init_minimal_logging_runs_twice_without_panic() {
        init_minimal_logging();
        init_minimal_logging();
        tracing::info!("Minimal logging test message");
    }

    #[rstest]
    #[case("text")]
    #[case("json")]
    fn test_create_file_layer_formats(#[case] format: &str) {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join(format!("test_{}.log", format));

        let result = create_file_layer(&log_path, format);
        assert!(result.is_ok(), "create_file_layer failed for {}: {:?}", format, result.err());
    }

    #[test]
    fn test_create_file_layer_ensures_parent_dir_exists() {
        let temp_dir = TempDir::new().unwrap();
        let nested_log_path = temp_dir.path().join("new_parent_dir/nested_log.log");
        assert!(!nested_log_path.parent().unwrap().exists());

        let (_layer, _guard) = create_file_layer(&nested_log_path, "text").unwrap();
        assert!(nested_log_path.parent().unwrap().exists(), "Parent directory was not created");
    }

    #[rstest]
    #[case("TRACE", Level::TRACE)]
    #[case("debug", Level::DEBUG)]
    #[case("Info", Level::INFO)]
    #[case("warn", Level::WARN)]
    #[case("error", Level::ERROR)]
    fn test_parse_level_is_case_insensitive(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(parse_level(input).unwrap(), expected);
    }

    #[test]
    fn test_build_layers_includes_file_layer_and_guard() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            file_path: Some(temp_dir.path().join("console.log")),
            format: "json".to_string(),
        };
        let (layers, guard) = build_layers(&config).unwrap();
        // stdout + file + sentry
        assert_eq!(layers.len(), 3);
        assert!(guard.is_some());
    }

    #[test]
    fn test_build_layers_console_only() {
        let (layers, guard) = build_layers(&LoggingConfig::default()).unwrap();
        assert_eq!(layers.len(), 2);
        assert!(guard.is_none());
    }

    #[test]
    fn test_init_logging_invalid_level_returns_error() {
        let config = LoggingConfig {
            level: "supertrace".to_string(),
            file_path: None,
            format: "text".to_string(),
        };
        match init_logging(&config, false) {
            Err(CoreError::Logging(LoggingError::InitializationFailure(msg))) => {
                assert!(msg.contains("Invalid log level in config: supertrace"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }
}
