//! Access boundary binding one [`NotificationStore`] to a scope.
//!
//! Code running inside [`NotificationsProvider::scope`] reaches the store via
//! [`use_notifications`]. Scopes nest per thread; the innermost wins.

use std::cell::RefCell;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use shortlink_core::utils::paths;
use shortlink_core::{CoreError, NotificationsConfig, StorageBackendKind};
use tracing::{debug, info, warn};

use crate::errors::NotificationError;
use crate::persistence::LocalStorageHistoryProvider;
use crate::persistence_iface::NotificationHistoryProvider;
use crate::reporting::{ErrorReporter, TracingErrorReporter};
use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use crate::store::NotificationStore;

thread_local! {
    static ACTIVE_STORES: RefCell<Vec<NotificationsHandle>> = RefCell::new(Vec::new());
}

/// Shared handle to a provider's store.
#[derive(Clone, Debug)]
pub struct NotificationsHandle {
    store: Arc<NotificationStore>,
}

impl NotificationsHandle {
    /// Whether both handles point at the same store.
    pub fn ptr_eq(&self, other: &NotificationsHandle) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }
}

impl Deref for NotificationsHandle {
    type Target = NotificationStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Pops the scope's handle when the scope ends, unwinding included.
struct ActiveScope;

impl Drop for ActiveScope {
    fn drop(&mut self) {
        ACTIVE_STORES.with(|stores| {
            stores.borrow_mut().pop();
        });
    }
}

pub struct NotificationsProvider {
    handle: NotificationsHandle,
}

impl NotificationsProvider {
    pub fn new(store: NotificationStore) -> Self {
        Self { handle: NotificationsHandle { store: Arc::new(store) } }
    }

    pub fn with_history(history: Arc<dyn NotificationHistoryProvider>) -> Self {
        Self::new(NotificationStore::new(history))
    }

    /// A provider whose history lives only in process memory.
    pub fn in_memory() -> Self {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        Self::with_history(Arc::new(LocalStorageHistoryProvider::new(storage)))
    }

    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self::from_config_with_reporter(config, Arc::new(TracingErrorReporter))
    }

    /// Builds storage, adapter and store from configuration.
    ///
    /// If the file backend cannot be opened the provider falls back to memory
    /// storage and reports the failure.
    pub fn from_config_with_reporter(config: &NotificationsConfig, reporter: Arc<dyn ErrorReporter>) -> Self {
        let storage = match build_storage(config) {
            Ok(storage) => storage,
            Err(e) => {
                warn!("Falling back to in-memory notification storage: {}", e);
                reporter.report(&e, "open_storage");
                memory_storage(config.storage_quota_bytes)
            }
        };
        Self::with_history(Arc::new(LocalStorageHistoryProvider::with_reporter(storage, reporter)))
    }

    pub fn handle(&self) -> NotificationsHandle {
        self.handle.clone()
    }

    /// Runs `f` with this provider's store active on the current thread.
    ///
    /// The first scope hydrates the store from persistence.
    pub fn scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.handle.hydrate();
        ACTIVE_STORES.with(|stores| stores.borrow_mut().push(self.handle.clone()));
        let _active = ActiveScope;
        f()
    }
}

impl std::fmt::Debug for NotificationsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationsProvider").field("store", &*self.handle.store).finish()
    }
}

fn memory_storage(quota_bytes: Option<usize>) -> Arc<dyn KeyValueStore> {
    match quota_bytes {
        Some(quota) => Arc::new(MemoryKeyValueStore::with_quota(quota)),
        None => Arc::new(MemoryKeyValueStore::new()),
    }
}

fn build_storage(config: &NotificationsConfig) -> Result<Arc<dyn KeyValueStore>, CoreError> {
    match config.storage {
        StorageBackendKind::Memory => {
            debug!("Using in-memory notification storage");
            Ok(memory_storage(config.storage_quota_bytes))
        }
        StorageBackendKind::File => {
            let dir: PathBuf = match &config.storage_dir {
                Some(dir) => dir.clone(),
                None => paths::get_app_data_dir()?,
            };
            info!("Using file notification storage at {}", dir.display());
            let store = FileKeyValueStore::new(dir)?.with_quota(config.storage_quota_bytes);
            Ok(Arc::new(store))
        }
    }
}

/// Returns the innermost active store, or [`NotificationError::OutsideProvider`].
pub fn try_use_notifications() -> Result<NotificationsHandle, NotificationError> {
    ACTIVE_STORES
        .with(|stores| stores.borrow().last().cloned())
        .ok_or(NotificationError::OutsideProvider)
}

/// Returns the innermost active store.
///
/// # Panics
///
/// Panics when called outside [`NotificationsProvider::scope`].
#[track_caller]
pub fn use_notifications() -> NotificationsHandle {
    match try_use_notifications() {
        Ok(handle) => handle,
        Err(e) => panic!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::NOTIFICATIONS_STORAGE_KEY;
    use crate::reporting::RecordingErrorReporter;
    use std::panic::{self, AssertUnwindSafe};
    use tempfile::TempDir;

    #[test]
    #[should_panic(expected = "use_notifications must be used within a NotificationsProvider")]
    fn use_outside_scope_panics() {
        use_notifications();
    }

    #[test]
    fn try_use_outside_scope_errors() {
        assert!(matches!(try_use_notifications(), Err(NotificationError::OutsideProvider)));
    }

    #[test]
    fn scope_exposes_store_and_hydrates() {
        let provider = NotificationsProvider::in_memory();
        assert!(provider.handle().is_loading());

        provider.scope(|| {
            let notifications = use_notifications();
            assert!(notifications.ptr_eq(&provider.handle()));
            assert!(!notifications.is_loading());
            notifications.add_notification("Inside", "scope");
        });

        assert_eq!(provider.handle().unread_count(), 1);
        assert!(try_use_notifications().is_err());
    }

    #[test]
    fn nested_scopes_shadow_and_restore() {
        let outer = NotificationsProvider::in_memory();
        let inner = NotificationsProvider::in_memory();

        outer.scope(|| {
            inner.scope(|| {
                assert!(use_notifications().ptr_eq(&inner.handle()));
            });
            assert!(use_notifications().ptr_eq(&outer.handle()));
        });
    }

    #[test]
    fn scope_is_released_on_panic() {
        let provider = NotificationsProvider::in_memory();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            provider.scope(|| panic!("render failure"));
        }));
        assert!(result.is_err());
        assert!(try_use_notifications().is_err());
    }

    #[test]
    fn scope_is_per_thread() {
        let provider = NotificationsProvider::in_memory();
        provider.scope(|| {
            let outside = std::thread::spawn(|| try_use_notifications().is_err()).join().unwrap();
            assert!(outside);
        });
    }

    #[test]
    fn from_config_file_backend_persists_under_storage_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = NotificationsConfig {
            storage: StorageBackendKind::File,
            storage_dir: Some(temp_dir.path().join("notifications")),
            storage_quota_bytes: None,
        };

        let provider = NotificationsProvider::from_config(&config);
        provider.scope(|| {
            use_notifications().add_notification("Saved", "to disk");
        });

        let file = temp_dir.path().join("notifications").join(format!("{}.json", NOTIFICATIONS_STORAGE_KEY));
        assert!(file.is_file());
    }

    #[test]
    fn from_config_falls_back_to_memory_when_dir_unusable() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let config = NotificationsConfig {
            storage: StorageBackendKind::File,
            storage_dir: Some(blocker),
            storage_quota_bytes: None,
        };
        let reporter = Arc::new(RecordingErrorReporter::new());

        let provider = NotificationsProvider::from_config_with_reporter(&config, reporter.clone());
        provider.scope(|| {
            use_notifications().add_notification("Kept", "in memory");
        });

        assert_eq!(provider.handle().notifications().len(), 1);
        assert_eq!(reporter.reports()[0].context, "open_storage");
    }
}
