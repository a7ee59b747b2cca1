use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::time_format;

/// Maximum number of notifications retained; older entries are evicted.
pub const MAX_NOTIFICATIONS: usize = 100;

/// Number of newest notifications shown in the compact panel.
pub const VISIBLE_NOTIFICATIONS: usize = 4;

/// Label stored in [`Notification::time`] at creation.
pub const JUST_NOW_LABEL: &str = "Just now";

/// Identifier of a notification.
///
/// Generated ids are hyphenated UUIDv7 strings, which sort in creation order
/// within one process. Hydrated ids are kept verbatim whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().hyphenated().to_string())
    }

    /// The UUID behind a generated id, if this id is one.
    pub fn as_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single user-facing alert.
///
/// The serialized field names are part of the persisted format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    /// Relative label computed once at creation. Never refreshed by the store.
    pub time: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    /// Creates an unread notification stamped with the current time.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::created_at(title, message, Utc::now())
    }

    pub fn created_at(title: impl Into<String>, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        let timestamp = now.timestamp_millis();
        Self {
            id: NotificationId::generate(),
            title: title.into(),
            message: message.into(),
            time: JUST_NOW_LABEL.to_string(),
            timestamp,
            read: false,
        }
    }

    pub fn mark_as_read(&mut self) {
        self.read = true;
    }

    /// The creation instant, if `timestamp` is representable.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// A relative label ("5 minutes ago") derived from `timestamp` at `now`.
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        time_format::relative_label(self.timestamp, now)
    }
}
