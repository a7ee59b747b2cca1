use std::fmt;
use std::sync::Arc;

use crate::types::NotificationId;

/// Emitted by the store after a mutating call has been applied and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Added { id: NotificationId },
    MarkedRead { id: NotificationId },
    /// `count` is the number of entries that were unread before the call.
    AllMarkedRead { count: usize },
    Removed { id: NotificationId },
    Cleared,
    Hydrated { count: usize },
    Batch { mutations: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

pub type Listener = Arc<dyn Fn(&NotificationEvent) + Send + Sync>;
