//! General utilities for the Shortlink core layer.
//!
//! # Submodules
//!
//! - [`fs`]: Filesystem helpers (ensuring directories exist, reading and
//!   writing whole files) that map I/O failures into [`crate::error::CoreError`].
//! - [`paths`]: XDG base directories and application-specific paths.

pub mod fs;
pub mod paths;

pub use fs::{ensure_dir_exists, read_to_string, write_string_to_file};
