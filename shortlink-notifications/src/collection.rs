//! The bounded, newest-first notification collection and its pure transforms.

use crate::types::{Notification, NotificationId, MAX_NOTIFICATIONS, VISIBLE_NOTIFICATIONS};

/// Ordered notifications, index 0 being the newest.
///
/// Never holds more than [`MAX_NOTIFICATIONS`] entries. Transforms consume the
/// collection and return the next value; they never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationCollection {
    entries: Vec<Notification>,
}

impl NotificationCollection {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a collection from entries already in newest-first order,
    /// evicting from the tail beyond capacity.
    pub fn from_entries(mut entries: Vec<Notification>) -> Self {
        entries.truncate(MAX_NOTIFICATIONS);
        Self { entries }
    }

    pub fn as_slice(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.entries.iter()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.get(id).is_some()
    }

    /// The first `min(VISIBLE_NOTIFICATIONS, len)` entries.
    pub fn visible(&self) -> &[Notification] {
        &self.entries[..self.entries.len().min(VISIBLE_NOTIFICATIONS)]
    }

    pub fn has_more(&self) -> bool {
        self.entries.len() > VISIBLE_NOTIFICATIONS
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn into_vec(self) -> Vec<Notification> {
        self.entries
    }

    /// Inserts at the head. An existing entry with the same id is replaced.
    pub fn with_added(mut self, notification: Notification) -> Self {
        self.entries.retain(|n| n.id != notification.id);
        self.entries.insert(0, notification);
        self.entries.truncate(MAX_NOTIFICATIONS);
        self
    }

    pub fn with_read(mut self, id: &NotificationId) -> Self {
        if let Some(n) = self.entries.iter_mut().find(|n| &n.id == id) {
            n.mark_as_read();
        }
        self
    }

    pub fn with_all_read(mut self) -> Self {
        self.entries.iter_mut().for_each(Notification::mark_as_read);
        self
    }

    pub fn without(mut self, id: &NotificationId) -> Self {
        self.entries.retain(|n| &n.id != id);
        self
    }

    pub fn cleared(self) -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A single change to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationMutation {
    Add(Notification),
    MarkAsRead(NotificationId),
    MarkAllAsRead,
    Remove(NotificationId),
    Clear,
}

impl NotificationMutation {
    pub fn apply(self, collection: NotificationCollection) -> NotificationCollection {
        match self {
            NotificationMutation::Add(notification) => collection.with_added(notification),
            NotificationMutation::MarkAsRead(id) => collection.with_read(&id),
            NotificationMutation::MarkAllAsRead => collection.with_all_read(),
            NotificationMutation::Remove(id) => collection.without(&id),
            NotificationMutation::Clear => collection.cleared(),
        }
    }
}

/// Applies `mutations` left to right, each seeing the previous result.
pub fn apply_all<I>(collection: NotificationCollection, mutations: I) -> NotificationCollection
where
    I: IntoIterator<Item = NotificationMutation>,
{
    mutations.into_iter().fold(collection, |acc, mutation| mutation.apply(acc))
}
