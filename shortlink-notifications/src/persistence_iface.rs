use crate::errors::NotificationError;
use crate::types::Notification;

/// Loads and saves the notification history.
///
/// Implementations report their own failures; the store treats an `Err` from
/// either call as "nothing loaded" or "not saved" and carries on.
pub trait NotificationHistoryProvider: Send + Sync {
    /// Returns the persisted notifications, newest first. An absent history
    /// is `Ok(vec![])`.
    fn load_history(&self) -> Result<Vec<Notification>, NotificationError>;

    /// Replaces the persisted history with `notifications`.
    fn save_history(&self, notifications: &[Notification]) -> Result<(), NotificationError>;
}
