//! Configuration Loading.
//!
//! [`ConfigLoader`] locates, parses, merges and validates the [`CoreConfig`].
//!
//! ## Configuration File Location
//!
//! Two TOML files are considered, both optional:
//!
//! 1. The system file, `/etc/shortlink/config.toml` unless overridden by the
//!    `SHORTLINK_SYSTEM_CONFIG_PATH` environment variable.
//! 2. The user file, `config.toml` in the application configuration directory.
//!
//! User values override system values table by table. When neither file
//! exists the defaults are used.
//!
//! ## Validation
//!
//! - Log level and format are normalised to lowercase and checked.
//! - Relative log file paths are resolved against the application state
//!   directory and their parent directories are created.
//! - Relative notification storage directories are resolved against the
//!   application data directory.
//! - A configured storage quota must be non-zero.

use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

use crate::config::CoreConfig;
use crate::error::{CoreError, ConfigError};
use crate::utils::fs as console_fs;
use crate::utils::paths::{get_app_config_dir, get_app_data_dir, get_app_state_dir, get_system_config_path_with_override};

/// Namespace for configuration loading; the entry point is [`ConfigLoader::load`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates the `CoreConfig` from the standard locations.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReadError`] when a file exists but cannot be read.
    /// - [`ConfigError::ParseError`] when a file is not valid TOML or violates the schema.
    /// - [`ConfigError::ValidationError`] / [`CoreError::Filesystem`] from validation.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let system_config_path = get_system_config_path_with_override()?;
        let user_config_path = get_app_config_dir()?.join("config.toml");
        Self::load_from_paths(Some(&system_config_path), &user_config_path)
    }

    /// Loads and validates the configuration from explicit file locations.
    pub fn load_from_paths(system_path: Option<&Path>, user_path: &Path) -> Result<CoreConfig, CoreError> {
        let system_toml_value = match system_path {
            Some(path) => Self::read_toml_value(path)?,
            None => None,
        };
        let user_toml_value = Self::read_toml_value(user_path)?;

        let mut final_config: CoreConfig = match Self::merge_toml_values(system_toml_value, user_toml_value) {
            Some(value) => value
                .try_into()
                .map_err(|e| CoreError::Config(ConfigError::ParseError(e)))?,
            None => CoreConfig::default(),
        };

        Self::validate_config(&mut final_config)?;
        tracing::debug!(
            level = %final_config.logging.level,
            storage = ?final_config.notifications.storage,
            "Configuration loaded"
        );
        Ok(final_config)
    }

    /// Reads a TOML file. Missing or blank files yield `None`.
    fn read_toml_value(path: &Path) -> Result<Option<Value>, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => content
                .parse::<Value>()
                .map(Some)
                .map_err(|e| CoreError::Config(ConfigError::ParseError(e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })),
        }
    }

    /// Merges two optional TOML values. `override_val` takes precedence.
    fn merge_toml_values(base: Option<Value>, override_val: Option<Value>) -> Option<Value> {
        match (base, override_val) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(Value::Table(mut base_table)), Some(Value::Table(override_table))) => {
                Self::merge_toml_tables(&mut base_table, &override_table);
                Some(Value::Table(base_table))
            }
            (_, Some(o)) => Some(o),
        }
    }

    /// Recursively merges `override_table` into `base_table`.
    fn merge_toml_tables(base_table: &mut toml::map::Map<String, Value>, override_table: &toml::map::Map<String, Value>) {
        for (key, override_item) in override_table {
            match base_table.get_mut(key) {
                Some(base_item) => {
                    if let (Value::Table(bt), Value::Table(ot)) = (&mut *base_item, override_item) {
                        Self::merge_toml_tables(bt, ot);
                    } else {
                        *base_item = override_item.clone();
                    }
                }
                None => {
                    base_table.insert(key.clone(), override_item.clone());
                }
            }
        }
    }

    fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                config.logging.level = level_lower;
            }
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))));
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => {
                config.logging.format = format_lower;
            }
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))));
            }
        }

        if let Some(log_path) = config.logging.file_path.take() {
            let absolute_path = Self::resolve_against(log_path, get_app_state_dir)?;
            if let Some(parent_dir) = absolute_path.parent() {
                if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                    console_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute_path);
        }

        if let Some(storage_dir) = config.notifications.storage_dir.take() {
            config.notifications.storage_dir = Some(Self::resolve_against(storage_dir, get_app_data_dir)?);
        }

        if config.notifications.storage_quota_bytes == Some(0) {
            return Err(CoreError::Config(ConfigError::ValidationError(
                "notifications.storage_quota_bytes must be greater than zero.".to_string(),
            )));
        }

        if let Some(dsn) = &config.error_tracking.sentry_dsn {
            if dsn.trim().is_empty() {
                config.error_tracking.sentry_dsn = None;
            }
        }

        Ok(())
    }

    fn resolve_against(path: PathBuf, base: fn() -> Result<PathBuf, CoreError>) -> Result<PathBuf, CoreError> {
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(base()?.join(path))
        }
    }
}
