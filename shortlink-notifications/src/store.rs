//! The notification store: sole owner and mutator of the collection.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::{debug, trace, warn};

use crate::collection::{apply_all, NotificationCollection, NotificationMutation};
use crate::events::{Listener, NotificationEvent, SubscriptionId};
use crate::persistence_iface::NotificationHistoryProvider;
use crate::types::{Notification, NotificationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hydration {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug)]
struct StoreState {
    collection: NotificationCollection,
    is_loading: bool,
    hydration: Hydration,
    /// Bumped by every mutation.
    generation: u64,
    /// Generation of the last collection handed to the history provider.
    saved_generation: u64,
}

impl StoreState {
    fn replace(&mut self, update: impl FnOnce(NotificationCollection) -> NotificationCollection) {
        let current = std::mem::take(&mut self.collection);
        self.collection = update(current);
        self.generation += 1;
    }

    fn has_unsaved(&self) -> bool {
        self.hydration == Hydration::Done && self.generation != self.saved_generation
    }

    /// The collection to save next, if a mutation since hydration is unsaved.
    fn unsaved(&self) -> Option<(u64, Vec<Notification>)> {
        self.has_unsaved()
            .then(|| (self.generation, self.collection.as_slice().to_vec()))
    }
}

/// Mutations queued by [`NotificationStore::batch`].
///
/// Queued mutations are applied in order, each seeing the previous result.
#[derive(Debug, Default)]
pub struct NotificationBatch {
    mutations: Vec<NotificationMutation>,
    taken_ids: HashSet<NotificationId>,
}

impl NotificationBatch {
    fn new(taken_ids: HashSet<NotificationId>) -> Self {
        Self { mutations: Vec::new(), taken_ids }
    }

    pub fn add_notification(&mut self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        let mut notification = Notification::new(title, message);
        while self.taken_ids.contains(&notification.id) {
            notification.id = NotificationId::generate();
        }
        let id = notification.id.clone();
        self.taken_ids.insert(id.clone());
        self.mutations.push(NotificationMutation::Add(notification));
        id
    }

    pub fn mark_as_read(&mut self, id: &NotificationId) {
        self.mutations.push(NotificationMutation::MarkAsRead(id.clone()));
    }

    pub fn mark_all_as_read(&mut self) {
        self.mutations.push(NotificationMutation::MarkAllAsRead);
    }

    pub fn remove_notification(&mut self, id: &NotificationId) {
        self.mutations.push(NotificationMutation::Remove(id.clone()));
    }

    pub fn clear_all_notifications(&mut self) {
        self.mutations.push(NotificationMutation::Clear);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Owns the ordered, bounded notification collection.
///
/// Every mutating call is applied under the state lock, so concurrent callers
/// never lose each other's updates. The history provider is called with no
/// state lock held, one writer at a time, always with the newest collection;
/// a provider (or its error reporter) may therefore read or mutate the store.
/// Nothing is saved before hydration, so early mutations cannot overwrite the
/// persisted history. Persistence failures are handled by the history
/// provider; no store operation returns an error.
pub struct NotificationStore {
    state: Mutex<StoreState>,
    /// Held by the one caller currently writing to the history provider.
    persist_gate: Mutex<()>,
    history: Arc<dyn NotificationHistoryProvider>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl NotificationStore {
    /// Creates an empty store. It reports `is_loading() == true` until
    /// [`hydrate`](Self::hydrate) has run.
    pub fn new(history: Arc<dyn NotificationHistoryProvider>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                collection: NotificationCollection::new(),
                is_loading: true,
                hydration: Hydration::Pending,
                generation: 0,
                saved_generation: 0,
            }),
            persist_gate: Mutex::new(()),
            history,
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the collection with the persisted history. Runs once; later
    /// calls, and calls made while loading is underway, do nothing.
    ///
    /// Mutations made before hydration completes are neither saved nor kept.
    pub fn hydrate(&self) {
        {
            let mut state = self.state();
            if state.hydration != Hydration::Pending {
                trace!("Notification store already hydrated");
                return;
            }
            state.hydration = Hydration::InProgress;
            state.is_loading = true;
        }

        let loaded = self.history.load_history().unwrap_or_else(|e| {
            debug!("Hydrating with an empty collection after load failure: {}", e);
            Vec::new()
        });

        let count = {
            let mut state = self.state();
            state.collection = NotificationCollection::from_entries(loaded);
            state.is_loading = false;
            state.hydration = Hydration::Done;
            state.saved_generation = state.generation;
            state.collection.len()
        };
        debug!("Notification store hydrated with {} entries", count);
        self.emit(&NotificationEvent::Hydrated { count });
    }

    /// Saves the newest collection until no unsaved mutation remains.
    ///
    /// If another caller holds the gate (another thread, or a provider
    /// re-entering the store from inside `save_history`), that caller picks
    /// up the newer generation before it releases the gate.
    fn persist(&self) {
        loop {
            let gate = match self.persist_gate.try_lock() {
                Ok(gate) => gate,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };

            loop {
                let pending = self.state().unsaved();
                let Some((generation, snapshot)) = pending else { break };
                if let Err(e) = self.history.save_history(&snapshot) {
                    debug!("Notification history not saved: {}", e);
                }
                let mut state = self.state();
                state.saved_generation = state.saved_generation.max(generation);
            }
            drop(gate);

            // A mutation may have landed between the last check and the release.
            if !self.state().has_unsaved() {
                return;
            }
        }
    }

    fn commit(&self, mutations: Vec<NotificationMutation>, event: NotificationEvent) {
        self.state().replace(|current| apply_all(current, mutations));
        self.persist();
        self.emit(&event);
    }

    /// Adds an unread notification at the head and returns its id.
    pub fn add_notification(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        let mut notification = Notification::new(title, message);
        let id = {
            let mut state = self.state();
            while state.collection.contains(&notification.id) {
                notification.id = NotificationId::generate();
            }
            let id = notification.id.clone();
            debug!(id = %id, title = %notification.title, "Adding notification");
            state.replace(|current| current.with_added(notification));
            id
        };
        self.persist();
        self.emit(&NotificationEvent::Added { id: id.clone() });
        id
    }

    pub fn mark_as_read(&self, id: &NotificationId) {
        trace!(id = %id, "Marking notification as read");
        self.commit(
            vec![NotificationMutation::MarkAsRead(id.clone())],
            NotificationEvent::MarkedRead { id: id.clone() },
        );
    }

    pub fn mark_all_as_read(&self) {
        let count = {
            let mut state = self.state();
            let count = state.collection.unread_count();
            state.replace(NotificationCollection::with_all_read);
            count
        };
        self.persist();
        debug!("Marked {} notifications as read", count);
        self.emit(&NotificationEvent::AllMarkedRead { count });
    }

    pub fn remove_notification(&self, id: &NotificationId) {
        trace!(id = %id, "Removing notification");
        self.commit(
            vec![NotificationMutation::Remove(id.clone())],
            NotificationEvent::Removed { id: id.clone() },
        );
    }

    /// Empties the collection. The persisted key stays present as `[]`.
    pub fn clear_all_notifications(&self) {
        debug!("Clearing all notifications");
        self.commit(vec![NotificationMutation::Clear], NotificationEvent::Cleared);
    }

    /// Queues several mutations and applies them as one step: one save, one
    /// [`NotificationEvent::Batch`]. An empty batch does nothing.
    pub fn batch<F>(&self, build: F)
    where
        F: FnOnce(&mut NotificationBatch),
    {
        let taken_ids = self.state().collection.iter().map(|n| n.id.clone()).collect();
        let mut batch = NotificationBatch::new(taken_ids);
        build(&mut batch);

        if batch.is_empty() {
            trace!("Empty notification batch ignored");
            return;
        }
        let mutations = batch.mutations.len();
        debug!("Applying batch of {} notification mutations", mutations);
        self.commit(batch.mutations, NotificationEvent::Batch { mutations });
    }

    /// The full collection, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state().collection.as_slice().to_vec()
    }

    pub fn visible_notifications(&self) -> Vec<Notification> {
        self.state().collection.visible().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.state().collection.unread_count()
    }

    pub fn has_more_notifications(&self) -> bool {
        self.state().collection.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn snapshot(&self) -> NotificationCollection {
        self.state().collection.clone()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&NotificationEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn emit(&self, event: &NotificationEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!(?event, "Notification listener panicked");
            }
        }
    }
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("NotificationStore")
            .field("len", &state.collection.len())
            .field("is_loading", &state.is_loading)
            .field("hydration", &state.hydration)
            .finish()
    }
}
