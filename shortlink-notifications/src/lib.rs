//! # Shortlink Notifications (`shortlink-notifications`)
//!
//! The console's notification core: a bounded, newest-first collection of
//! alerts that survives reloads through a key-value store and keeps working
//! when that store fails.
//!
//! - [`NotificationStore`] owns the collection and applies mutations as pure
//!   transforms, persisting after each call.
//! - [`LocalStorageHistoryProvider`] reads and writes the JSON history and
//!   reports, rather than returns, persistence failures.
//! - [`NotificationsProvider`] scopes a store to a region of code; inside it
//!   [`use_notifications`] returns the active store.
//!
//! ```rust
//! use shortlink_notifications::{use_notifications, NotificationsProvider};
//!
//! let provider = NotificationsProvider::in_memory();
//! provider.scope(|| {
//!     let notifications = use_notifications();
//!     notifications.add_notification("Link created", "short.ly/q3 is live");
//!     assert_eq!(notifications.unread_count(), 1);
//! });
//! ```

pub mod collection;
pub mod errors;
pub mod events;
pub mod persistence;
pub mod persistence_iface;
pub mod provider;
pub mod reporting;
pub mod storage;
pub mod store;
pub mod time_format;
pub mod types;

pub use collection::{NotificationCollection, NotificationMutation};
pub use errors::{NotificationError, StorageError};
pub use events::{NotificationEvent, SubscriptionId};
pub use persistence::{LocalStorageHistoryProvider, NOTIFICATIONS_STORAGE_KEY};
pub use persistence_iface::NotificationHistoryProvider;
pub use provider::{try_use_notifications, use_notifications, NotificationsHandle, NotificationsProvider};
pub use reporting::{ErrorReporter, RecordingErrorReporter, TracingErrorReporter};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use store::{NotificationBatch, NotificationStore};
pub use types::{Notification, NotificationId, MAX_NOTIFICATIONS, VISIBLE_NOTIFICATIONS};
