//! XDG Base Directory and Application-Specific Path Resolution.
//!
//! Resolves the directories the console uses for configuration, persisted
//! data (the notification store lives here by default) and state (log files).
//! It relies on the `directories-next` crate.
//!
//! All functions return `Result<PathBuf, CoreError>`, yielding
//! [`CoreError::Config(ConfigError::DirectoryUnavailable)`] if a required
//! directory cannot be determined (e.g. when no HOME directory is set).

use std::path::PathBuf;
use directories_next::{BaseDirs, ProjectDirs};
use crate::error::{CoreError, ConfigError};

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "Shortlink";
const APPLICATION: &str = "Console";

/// Environment variable overriding the location of the system-wide configuration file.
pub const SYSTEM_CONFIG_PATH_ENV: &str = "SHORTLINK_SYSTEM_CONFIG_PATH";

const DEFAULT_SYSTEM_CONFIG_PATH: &str = "/etc/shortlink/config.toml";

/// Returns the base directory for user-specific state files.
///
/// On Linux this honours `$XDG_STATE_HOME` and falls back to `~/.local/state`;
/// elsewhere the local data directory is used.
pub fn get_state_base_dir() -> Result<PathBuf, CoreError> {
    BaseDirs::new()
        .map(|dirs| {
            #[cfg(target_os = "linux")]
            {
                match std::env::var("XDG_STATE_HOME") {
                    Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
                    _ => dirs.home_dir().join(".local/state"),
                }
            }
            #[cfg(not(target_os = "linux"))]
            {
                dirs.data_local_dir().to_path_buf()
            }
        })
        .ok_or_else(|| CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "State Base".to_string()
        }))
}

/// Returns the application-specific configuration directory,
/// e.g. `~/.config/console` on Linux.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "App Config".to_string()
        }))
}

/// Returns the application-specific data directory,
/// e.g. `~/.local/share/console` on Linux.
///
/// The file-backed notification storage defaults to this directory.
pub fn get_app_data_dir() -> Result<PathBuf, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "App Data".to_string()
        }))
}

/// Returns the application-specific state directory
/// (`<state base>/Shortlink/Console`). Relative log file paths resolve here.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    get_state_base_dir().map(|base_state| base_state.join(ORGANIZATION).join(APPLICATION))
}

/// Returns the system-wide configuration file path.
///
/// [`SYSTEM_CONFIG_PATH_ENV`] takes precedence when set to a non-empty value.
pub fn get_system_config_path_with_override() -> Result<PathBuf, ConfigError> {
    match std::env::var(SYSTEM_CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(PathBuf::from(DEFAULT_SYSTEM_CONFIG_PATH)),
    }
}
