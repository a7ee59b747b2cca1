//! Configuration Management.
//!
//! - [`types`]: the configuration schema ([`CoreConfig`] and its sections).
//! - [`defaults`]: default values used when a field is missing.
//! - [`loader`]: [`ConfigLoader`], which reads, merges and validates the TOML files.
//!
//! # Examples
//!
//! ```rust,ignore
//! use shortlink_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("Notification storage: {:?}", config.notifications.storage),
//!     Err(e) => {
//!         shortlink_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration error: {}", e);
//!     }
//! }
//! ```

pub mod defaults;
pub mod types;
pub mod loader;

pub use types::{CoreConfig, ErrorTrackingConfig, LoggingConfig, NotificationsConfig, StorageBackendKind};
pub use loader::ConfigLoader;
