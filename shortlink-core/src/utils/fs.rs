//! Filesystem Utilities.
//!
//! Helpers for the handful of filesystem operations the console needs. They
//! return [`CoreError::Filesystem`] so callers keep the offending path.

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Ensures that a directory exists at the given path, creating it and any
/// missing parents.
///
/// Fails if the path exists but is not a directory, or if creation fails.
///
/// # Examples
///
/// ```no_run
/// # use shortlink_core::utils::fs::ensure_dir_exists;
/// # use tempfile::tempdir;
/// let temp_dir = tempdir().unwrap();
/// let dir_path = temp_dir.path().join("console_data");
/// ensure_dir_exists(&dir_path).unwrap();
/// assert!(dir_path.is_dir());
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if !path.is_dir() {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads the entire contents of a file into a string.
pub fn read_to_string(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file to string".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes a string to a file, creating it if needed and truncating it otherwise.
///
/// The parent directory must already exist.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<(), CoreError> {
    fs::write(path, content).map_err(|e| CoreError::Filesystem {
        message: "Failed to write string to file".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_nested_dirs() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("a/b/c");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent on an existing directory.
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_exists_rejects_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("occupied");
        fs::write(&file_path, "x").unwrap();

        match ensure_dir_exists(&file_path) {
            Err(CoreError::Filesystem { path, .. }) => assert_eq!(path, file_path),
            other => panic!("Expected Filesystem error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_read_string() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("note.txt");
        write_string_to_file(&file_path, "hello console").unwrap();
        assert_eq!(read_to_string(&file_path).unwrap(), "hello console");
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let err = read_to_string(&temp_dir.path().join("missing.txt")).unwrap_err();
        assert!(err.is_not_found());
    }
}
