//! Default configuration values.
//!
//! Used by `serde`'s `default` attribute on the configuration structures when
//! a value is absent from the configuration file.

use crate::config::{ErrorTrackingConfig, LoggingConfig, NotificationsConfig, StorageBackendKind};
use std::path::PathBuf;

/// Returns the default `LoggingConfig`.
pub(super) fn default_core_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// `"info"`
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// No log file by default.
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// `"text"`
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

/// Error tracking is disabled unless a DSN is configured.
pub(super) fn default_error_tracking_config() -> ErrorTrackingConfig {
    ErrorTrackingConfig {
        sentry_dsn: None,
        sentry_environment: None,
        sentry_release: None,
    }
}

pub(super) fn default_notifications_config() -> NotificationsConfig {
    NotificationsConfig {
        storage: default_storage_backend(),
        storage_dir: None,
        storage_quota_bytes: None,
    }
}

/// Notifications survive restarts by default.
pub(super) fn default_storage_backend() -> StorageBackendKind {
    StorageBackendKind::File
}
