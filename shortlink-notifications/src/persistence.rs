use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::NotificationError;
use crate::persistence_iface::NotificationHistoryProvider;
use crate::reporting::{ErrorReporter, TracingErrorReporter};
use crate::storage::KeyValueStore;
use crate::types::Notification;

/// Key under which the serialized notification history is stored.
pub const NOTIFICATIONS_STORAGE_KEY: &str = "notifications";

/// Persists the notification history as a JSON array in a [`KeyValueStore`].
///
/// `try_load`/`try_save` return the failure; `load`/`save` report it and
/// degrade to an empty history or a skipped write.
pub struct LocalStorageHistoryProvider {
    store: Arc<dyn KeyValueStore>,
    key: String,
    reporter: Arc<dyn ErrorReporter>,
}

impl LocalStorageHistoryProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, NOTIFICATIONS_STORAGE_KEY, Arc::new(TracingErrorReporter))
    }

    pub fn with_reporter(store: Arc<dyn KeyValueStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self::with_key(store, NOTIFICATIONS_STORAGE_KEY, reporter)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { store, key: key.into(), reporter }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn try_load(&self) -> Result<Vec<Notification>, NotificationError> {
        debug!("Loading notification history from key '{}'", self.key);
        let raw = self
            .store
            .get_item(&self.key)
            .map_err(|e| NotificationError::storage("load_history", e))?;

        let Some(raw) = raw else {
            info!("No notification history under key '{}'. Starting empty.", self.key);
            return Ok(Vec::new());
        };

        // Invalid JSON and JSON of the wrong shape both surface here.
        let history: Vec<Notification> = serde_json::from_str(&raw)
            .map_err(|source| NotificationError::Deserialize { key: self.key.clone(), source })?;
        debug!("Loaded {} notifications from key '{}'", history.len(), self.key);
        Ok(history)
    }

    pub fn try_save(&self, notifications: &[Notification]) -> Result<(), NotificationError> {
        debug!("Saving {} notifications to key '{}'", notifications.len(), self.key);
        let payload = serde_json::to_string(notifications)
            .map_err(|source| NotificationError::Serialize { key: self.key.clone(), source })?;
        self.store
            .set_item(&self.key, &payload)
            .map_err(|e| NotificationError::storage("save_history", e))
    }

    /// Never fails: any error is reported and an empty history returned.
    pub fn load(&self) -> Vec<Notification> {
        match self.try_load() {
            Ok(history) => history,
            Err(e) => {
                self.report(&e, "load_history");
                Vec::new()
            }
        }
    }

    /// Never fails: any error is reported and the write skipped.
    pub fn save(&self, notifications: &[Notification]) {
        if let Err(e) = self.try_save(notifications) {
            self.report(&e, "save_history");
        }
    }

    fn report(&self, error: &NotificationError, context: &str) {
        warn!("Notification history {} failed for key '{}': {}", context, self.key, error);
        let reporter = &self.reporter;
        if panic::catch_unwind(AssertUnwindSafe(|| reporter.report(error, context))).is_err() {
            warn!("Error reporter panicked while reporting a {} failure", context);
        }
    }
}

impl NotificationHistoryProvider for LocalStorageHistoryProvider {
    /// Failures are reported here before being returned.
    fn load_history(&self) -> Result<Vec<Notification>, NotificationError> {
        self.try_load().map_err(|e| {
            self.report(&e, "load_history");
            e
        })
    }

    fn save_history(&self, notifications: &[Notification]) -> Result<(), NotificationError> {
        self.try_save(notifications).map_err(|e| {
            self.report(&e, "save_history");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageError;
    use crate::reporting::RecordingErrorReporter;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::error::Error;
    use tempfile::TempDir;

    fn sample(title: &str) -> Notification {
        Notification::new(title, format!("{} message", title))
    }

    fn provider_with(store: Arc<dyn KeyValueStore>) -> (LocalStorageHistoryProvider, Arc<RecordingErrorReporter>) {
        let reporter = Arc::new(RecordingErrorReporter::new());
        (LocalStorageHistoryProvider::with_reporter(store, reporter.clone()), reporter)
    }

    #[test]
    fn absent_key_loads_empty_without_report() {
        let (provider, reporter) = provider_with(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(provider.load_history().unwrap(), Vec::<Notification>::new());
        assert!(reporter.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (provider, reporter) = provider_with(Arc::new(MemoryKeyValueStore::new()));
        let mut read = sample("Second");
        read.mark_as_read();
        let history = vec![read, sample("First")];

        provider.save_history(&history).unwrap();
        assert_eq!(provider.load_history().unwrap(), history);
        assert!(reporter.is_empty());
    }

    #[test]
    fn saves_a_json_array_under_the_fixed_key() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (provider, _) = provider_with(store.clone());
        provider.save(&[]);
        assert_eq!(store.get_item(NOTIFICATIONS_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[rstest]
    #[case::invalid_json("{not json")]
    #[case::object_instead_of_array(r#"{"id":"1"}"#)]
    #[case::array_of_wrong_shape(r#"[{"title":"missing fields"}]"#)]
    #[case::array_of_numbers("[1,2,3]")]
    fn unreadable_payload_loads_empty_and_reports(#[case] payload: &str) {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set_item(NOTIFICATIONS_STORAGE_KEY, payload).unwrap();
        let (provider, reporter) = provider_with(store);

        assert!(matches!(provider.try_load(), Err(NotificationError::Deserialize { .. })));
        assert_eq!(provider.load(), Vec::<Notification>::new());

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].context, "load_history");
    }

    #[test]
    fn quota_exceeded_is_reported_and_swallowed() {
        let store = Arc::new(MemoryKeyValueStore::with_quota(32));
        let (provider, reporter) = provider_with(store.clone());

        provider.save(&[sample("Too large for the quota")]);

        assert_eq!(store.get_item(NOTIFICATIONS_STORAGE_KEY).unwrap(), None);
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].context, "save_history");
        assert!(reports[0].message.contains("Storage quota exceeded"));
    }

    #[test]
    fn failed_save_keeps_previous_payload() {
        let store = Arc::new(MemoryKeyValueStore::with_quota(400));
        let (provider, _) = provider_with(store);
        let small = vec![sample("Small")];
        provider.save(&small);

        let large: Vec<Notification> = (0..20).map(|i| sample(&format!("Title {}", i))).collect();
        let err = provider.try_save(&large).unwrap_err();
        match &err {
            NotificationError::Storage { operation, .. } => assert_eq!(operation, "save_history"),
            other => panic!("Expected Storage error, got {:?}", other),
        }
        assert!(err.source().unwrap().is::<StorageError>());
        assert_eq!(provider.load(), small);
    }

    #[test]
    fn panicking_reporter_does_not_escape() {
        struct PanickingReporter;
        impl ErrorReporter for PanickingReporter {
            fn report(&self, _error: &(dyn Error + 'static), _context: &str) {
                panic!("reporter is broken");
            }
        }

        let store = Arc::new(MemoryKeyValueStore::new());
        store.set_item(NOTIFICATIONS_STORAGE_KEY, "garbage").unwrap();
        let provider = LocalStorageHistoryProvider::with_reporter(store, Arc::new(PanickingReporter));
        assert!(provider.load().is_empty());
    }

    #[test]
    fn file_backed_history_survives_new_provider() {
        let temp_dir = TempDir::new().unwrap();
        let history = vec![sample("Persisted")];
        {
            let store = Arc::new(FileKeyValueStore::new(temp_dir.path()).unwrap());
            LocalStorageHistoryProvider::new(store).save(&history);
        }
        let store = Arc::new(FileKeyValueStore::new(temp_dir.path()).unwrap());
        assert_eq!(LocalStorageHistoryProvider::new(store).load(), history);
    }
}
