use shortlink_core::CoreError;
use thiserror::Error;

/// Failures raised by a [`crate::storage::KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded while writing key '{key}': {attempted_bytes} bytes requested, {quota_bytes} allowed")]
    QuotaExceeded {
        key: String,
        attempted_bytes: usize,
        quota_bytes: usize,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage backend failure for key '{key}': {source}")]
    Backend {
        key: String,
        #[source]
        source: CoreError,
    },
}

#[derive(Debug, Error)]
pub enum NotificationError {
    /// The store handle was requested outside an active provider scope.
    #[error("use_notifications must be used within a NotificationsProvider")]
    OutsideProvider,

    #[error("Failed to deserialize persisted notifications under key '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize notifications for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Persistence error during operation '{operation}': {source}")]
    Storage {
        operation: String,
        #[source]
        source: StorageError,
    },
}

impl NotificationError {
    pub fn storage(operation: impl Into<String>, source: StorageError) -> Self {
        NotificationError::Storage {
            operation: operation.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::path::PathBuf;

    #[test]
    fn test_error_messages_display() {
        assert_eq!(
            NotificationError::OutsideProvider.to_string(),
            "use_notifications must be used within a NotificationsProvider"
        );

        let quota = StorageError::QuotaExceeded {
            key: "notifications".to_string(),
            attempted_bytes: 2048,
            quota_bytes: 1024,
        };
        assert_eq!(
            quota.to_string(),
            "Storage quota exceeded while writing key 'notifications': 2048 bytes requested, 1024 allowed"
        );

        let err = NotificationError::storage("save_history", quota);
        assert!(err.to_string().starts_with("Persistence error during operation 'save_history': Storage quota exceeded"));
        assert!(err.source().unwrap().is::<StorageError>());
    }

    #[test]
    fn test_backend_error_keeps_core_source() {
        let core = CoreError::Filesystem {
            message: "Failed to read file to string".to_string(),
            path: PathBuf::from("/data/notifications.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let err = StorageError::Backend { key: "notifications".to_string(), source: core };
        assert!(err.to_string().contains("Storage backend failure for key 'notifications'"));
        assert!(err.source().unwrap().is::<CoreError>());
    }

    #[test]
    fn test_deserialize_error_message() {
        let source = serde_json::from_str::<Vec<i32>>("{").unwrap_err();
        let err = NotificationError::Deserialize { key: "notifications".to_string(), source };
        assert!(err.to_string().starts_with("Failed to deserialize persisted notifications under key 'notifications'"));
    }
}
