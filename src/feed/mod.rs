pub mod memory;

use tokio::sync::mpsc;

use crate::models::approval::Approval;
use crate::models::group::Group;
use crate::models::participant::Participant;

use self::memory::MemoryStore;

/// One ordered change delivered by a live collection feed. New
/// subscribers first receive the current contents as `Added` events,
/// then live changes.
#[derive(Debug, Clone)]
pub enum ChangeEvent<T> {
    Added(T),
    Modified(T),
    Removed(String),
}

impl<T> ChangeEvent<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Added(_) => "added",
            ChangeEvent::Modified(_) => "modified",
            ChangeEvent::Removed(_) => "removed",
        }
    }
}

/// Cancellation hook for a live subscription. Fires at most once:
/// explicit disposal wins, otherwise drop runs it.
pub struct Disposer {
    hook: Option<Box<dyn FnOnce() + Send>>,
}

impl Disposer {
    pub fn new(hook: impl FnOnce() + Send + 'static) -> Self {
        Self {
            hook: Some(Box::new(hook)),
        }
    }

    pub fn dispose(&mut self) {
        if let Some(hook) = self.hook.take() {
            hook();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A live subscription to one collection: an event receiver paired with
/// the disposer that tears delivery down.
pub struct FeedSubscription<T> {
    events: mpsc::Receiver<ChangeEvent<T>>,
    disposer: Disposer,
}

impl<T> FeedSubscription<T> {
    pub fn new(events: mpsc::Receiver<ChangeEvent<T>>, disposer: Disposer) -> Self {
        Self { events, disposer }
    }

    pub async fn next(&mut self) -> Option<ChangeEvent<T>> {
        self.events.recv().await
    }

    /// Stops delivery. Safe to call more than once; the disposer itself
    /// fires exactly once.
    pub fn cancel(&mut self) {
        self.disposer.dispose();
        self.events.close();
    }
}

/// Owner of the three live subscriptions the dashboard runs on.
/// Replaces ad-hoc global subscription handles: `resubscribe` cancels
/// every prior subscription before acquiring replacements, so a store
/// handle change never leaks listeners or doubles delivery.
pub struct FeedHandles {
    pub groups: FeedSubscription<Group>,
    pub participants: FeedSubscription<Participant>,
    pub approvals: FeedSubscription<Approval>,
}

impl FeedHandles {
    pub fn subscribe(store: &MemoryStore) -> Self {
        Self {
            groups: store.subscribe_groups(),
            participants: store.subscribe_participants(),
            approvals: store.subscribe_approvals(),
        }
    }

    pub fn resubscribe(&mut self, store: &MemoryStore) {
        self.groups.cancel();
        self.participants.cancel();
        self.approvals.cancel();

        self.groups = store.subscribe_groups();
        self.participants = store.subscribe_participants();
        self.approvals = store.subscribe_approvals();
    }
}
