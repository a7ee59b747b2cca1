//! Configuration Data Structures.
//!
//! These structs are populated by deserializing the TOML configuration file.
//! Missing values fall back to the functions in [`super::defaults`], and
//! unknown fields are rejected via `#[serde(deny_unknown_fields)]`.

use serde::Deserialize;
use std::path::PathBuf;
use super::defaults;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use shortlink_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let default_log_config = LoggingConfig::default();
/// assert_eq!(default_log_config.level, "info");
/// assert_eq!(default_log_config.file_path, None);
/// assert_eq!(default_log_config.format, "text");
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/shortlink/console.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/shortlink/console.log")));
/// assert_eq!(log_config.format, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level: "trace", "debug", "info", "warn" or "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the application's state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_core_logging_config()
    }
}

/// Settings for the Sentry error-tracking client.
///
/// Without a DSN, error tracking stays disabled and captured errors are only logged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorTrackingConfig {
    #[serde(default)]
    pub sentry_dsn: Option<String>,
    #[serde(default)]
    pub sentry_environment: Option<String>,
    #[serde(default)]
    pub sentry_release: Option<String>,
}

impl Default for ErrorTrackingConfig {
    fn default() -> Self {
        defaults::default_error_tracking_config()
    }
}

/// Which key-value backend persists the notification collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackendKind {
    /// Process-local only; nothing survives a restart.
    Memory,
    /// One file per key under `storage_dir`.
    #[default]
    File,
}

/// Settings for the notification store's persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    #[serde(default = "defaults::default_storage_backend")]
    pub storage: StorageBackendKind,
    /// Directory for the file backend. Defaults to the application data directory.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    /// Upper bound on the bytes the backend accepts, emulating a browser storage quota.
    #[serde(default)]
    pub storage_quota_bytes: Option<usize>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        defaults::default_notifications_config()
    }
}

/// Root configuration structure for the console.
///
/// ```
/// use shortlink_core::config::CoreConfig;
///
/// let toml_str = r#"
/// [logging]
/// level = "warn"
///
/// [notifications]
/// storage = "memory"
/// "#;
/// let loaded: CoreConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(loaded.logging.level, "warn");
/// assert_eq!(loaded.logging.format, "text");
/// assert!(loaded.error_tracking.sentry_dsn.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_core_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_error_tracking_config")]
    pub error_tracking: ErrorTrackingConfig,
    #[serde(default = "defaults::default_notifications_config")]
    pub notifications: NotificationsConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_core_logging_config(),
            error_tracking: defaults::default_error_tracking_config(),
            notifications: defaults::default_notifications_config(),
        }
    }
}
