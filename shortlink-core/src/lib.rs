//! # Shortlink Core Library (`shortlink-core`)
//!
//! Infrastructure shared by the Shortlink admin console crates:
//!
//! - **Error Handling**: [`CoreError`] and the more specific [`ConfigError`]
//!   and [`LoggingError`].
//! - **Configuration Management**: TOML configuration with defaults and
//!   validation, loaded by [`ConfigLoader`] into a [`CoreConfig`].
//! - **Logging**: `tracing` subscribers for console and rolling file output.
//! - **Error Tracking**: Sentry integration for failures that are recovered
//!   locally but should still reach operators.
//! - **Utilities**: filesystem helpers and XDG path resolution.
//!
//! ```rust,ignore
//! use shortlink_core::config::ConfigLoader;
//! use shortlink_core::error_tracking::init_error_tracking;
//! use shortlink_core::logging::init_logging;
//! use shortlink_core::error::CoreError;
//!
//! fn main() -> Result<(), CoreError> {
//!     let config = ConfigLoader::load()?;
//!     init_logging(&config.logging, false)?;
//!     init_error_tracking(&config.error_tracking)?;
//!     tracing::info!("Shortlink console core initialized.");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod config;
pub mod logging;
pub mod error_tracking;
pub mod utils;

pub use error::{CoreError, ConfigError, LoggingError};
pub use config::{
    ConfigLoader, CoreConfig, ErrorTrackingConfig, LoggingConfig, NotificationsConfig, StorageBackendKind,
};
pub use logging::{init_logging, init_minimal_logging};
pub use error_tracking::{capture_error, init_error_tracking};
