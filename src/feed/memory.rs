use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use crate::feed::{ChangeEvent, Disposer, FeedSubscription};
use crate::models::approval::Approval;
use crate::models::group::Group;
use crate::models::participant::Participant;

/// The in-process document store. Holds the `groups` and `participants`
/// collections plus the change-only `approvals` stream, and fans every
/// mutation out to live subscribers.
pub struct MemoryStore {
    groups: DashMap<String, Group>,
    participants: DashMap<String, Participant>,
    operators: DashSet<String>,
    seen_approvals: DashSet<String>,
    groups_tx: broadcast::Sender<ChangeEvent<Group>>,
    participants_tx: broadcast::Sender<ChangeEvent<Participant>>,
    approvals_tx: broadcast::Sender<ChangeEvent<Approval>>,
    active_subscriptions: Arc<AtomicUsize>,
    buffer: usize,
}

impl MemoryStore {
    pub fn new(buffer: usize) -> Self {
        let (groups_tx, _) = broadcast::channel(buffer);
        let (participants_tx, _) = broadcast::channel(buffer);
        let (approvals_tx, _) = broadcast::channel(buffer);

        Self {
            groups: DashMap::new(),
            participants: DashMap::new(),
            operators: DashSet::new(),
            seen_approvals: DashSet::new(),
            groups_tx,
            participants_tx,
            approvals_tx,
            active_subscriptions: Arc::new(AtomicUsize::new(0)),
            buffer,
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Live subscriptions currently attached across all three feeds.
    pub fn subscriber_count(&self) -> usize {
        self.active_subscriptions.load(Ordering::SeqCst)
    }

    pub fn upsert_group(&self, group: Group) -> Group {
        let event = match self.groups.insert(group.id.clone(), group.clone()) {
            Some(_) => ChangeEvent::Modified(group.clone()),
            None => ChangeEvent::Added(group.clone()),
        };
        let _ = self.groups_tx.send(event);
        group
    }

    pub fn remove_group(&self, id: &str) -> bool {
        let removed = self.groups.remove(id).is_some();
        if removed {
            let _ = self.groups_tx.send(ChangeEvent::Removed(id.to_string()));
        }
        removed
    }

    pub fn upsert_participant(&self, participant: Participant) -> Participant {
        let event = match self
            .participants
            .insert(participant.username.clone(), participant.clone())
        {
            Some(_) => ChangeEvent::Modified(participant.clone()),
            None => ChangeEvent::Added(participant.clone()),
        };
        let _ = self.participants_tx.send(event);
        participant
    }

    pub fn remove_participant(&self, username: &str) -> bool {
        let removed = self.participants.remove(username).is_some();
        if removed {
            let _ = self
                .participants_tx
                .send(ChangeEvent::Removed(username.to_string()));
        }
        removed
    }

    /// Publishes an approval request. The first submission of an id is an
    /// `Added` change; resubmissions of the same id are `Modified`.
    pub fn submit_approval(&self, approval: Approval) -> Approval {
        let event = if self.seen_approvals.insert(approval.id.clone()) {
            ChangeEvent::Added(approval.clone())
        } else {
            ChangeEvent::Modified(approval.clone())
        };
        let _ = self.approvals_tx.send(event);
        approval
    }

    pub fn register_operator(&self, email: &str) {
        self.operators.insert(email.to_string());
    }

    /// The entire authorization model: the privileged document either
    /// exists or it does not.
    pub fn is_operator(&self, email: &str) -> bool {
        self.operators.contains(email)
    }

    pub fn subscribe_groups(&self) -> FeedSubscription<Group> {
        let snapshot = self
            .groups
            .iter()
            .map(|entry| ChangeEvent::Added(entry.value().clone()))
            .collect();
        self.attach("groups", snapshot, &self.groups_tx)
    }

    pub fn subscribe_participants(&self) -> FeedSubscription<Participant> {
        let snapshot = self
            .participants
            .iter()
            .map(|entry| ChangeEvent::Added(entry.value().clone()))
            .collect();
        self.attach("participants", snapshot, &self.participants_tx)
    }

    pub fn subscribe_approvals(&self) -> FeedSubscription<Approval> {
        // Change-only collection: no snapshot replay.
        self.attach("approvals", Vec::new(), &self.approvals_tx)
    }

    fn attach<T: Clone + Send + 'static>(
        &self,
        feed: &'static str,
        snapshot: Vec<ChangeEvent<T>>,
        tx: &broadcast::Sender<ChangeEvent<T>>,
    ) -> FeedSubscription<T> {
        // The live receiver attaches before the snapshot is sent, so a
        // write racing the subscription surfaces as a redundant change
        // rather than a gap. Views absorb redundant changes; most recent
        // write wins.
        let mut live = tx.subscribe();
        let (out_tx, out_rx) = mpsc::channel(self.buffer);

        self.active_subscriptions.fetch_add(1, Ordering::SeqCst);
        let active = self.active_subscriptions.clone();

        let forwarder = tokio::spawn(async move {
            for event in snapshot {
                if out_tx.send(event).await.is_err() {
                    return;
                }
            }
            loop {
                match live.recv().await {
                    Ok(event) => {
                        if out_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(feed, skipped, "feed subscriber lagged; view may be stale");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let disposer = Disposer::new(move || {
            forwarder.abort();
            active.fetch_sub(1, Ordering::SeqCst);
        });

        FeedSubscription::new(out_rx, disposer)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::MemoryStore;
    use crate::feed::{ChangeEvent, FeedHandles};
    use crate::models::approval::Approval;
    use crate::models::group::Group;

    fn group(id: &str, name: &str) -> Group {
        Group {
            id: id.to_string(),
            name: name.to_string(),
            current_location: None,
            direction: None,
            race_completed: false,
            start_time: None,
            end_time: None,
            challenges_skipped: 0,
            bonus_completed: 0,
        }
    }

    #[tokio::test]
    async fn subscriber_replays_snapshot_then_live_changes() {
        let store = MemoryStore::new(64);
        store.upsert_group(group("1", "Otters"));

        let mut subscription = store.subscribe_groups();

        let first = subscription.next().await.expect("snapshot event");
        assert!(matches!(first, ChangeEvent::Added(ref g) if g.id == "1"));

        store.upsert_group(group("1", "Otters Renamed"));
        let second = subscription.next().await.expect("live event");
        assert!(matches!(second, ChangeEvent::Modified(ref g) if g.name == "Otters Renamed"));

        store.remove_group("1");
        let third = subscription.next().await.expect("removal event");
        assert!(matches!(third, ChangeEvent::Removed(ref id) if id == "1"));
    }

    #[tokio::test]
    async fn approval_resubmission_is_modified_not_added() {
        let store = MemoryStore::new(64);
        let mut subscription = store.subscribe_approvals();

        store.submit_approval(Approval {
            id: "a1".to_string(),
            content: "approve me".to_string(),
        });
        store.submit_approval(Approval {
            id: "a1".to_string(),
            content: "approve me again".to_string(),
        });

        let first = subscription.next().await.expect("first event");
        let second = subscription.next().await.expect("second event");
        assert_eq!(first.kind(), "added");
        assert_eq!(second.kind(), "modified");
    }

    #[tokio::test]
    async fn resubscribe_disposes_before_reattaching() {
        let store = MemoryStore::new(64);
        let mut handles = FeedHandles::subscribe(&store);
        assert_eq!(store.subscriber_count(), 3);

        handles.resubscribe(&store);

        // Dispose hooks run synchronously: each prior subscription
        // released its slot exactly once and exactly one replacement per
        // feed is attached.
        assert_eq!(store.subscriber_count(), 3);

        store.upsert_group(group("1", "Otters"));
        let event = handles.groups.next().await.expect("single delivery");
        assert!(matches!(event, ChangeEvent::Added(_)));

        drop(handles);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn participant_count_tracks_upserts_and_removals() {
        use crate::models::participant::{GeoPoint, Participant};

        let store = MemoryStore::new(64);
        store.upsert_participant(Participant {
            username: "alice".to_string(),
            group_id: "1".to_string(),
            location: GeoPoint { lat: 1.0, lng: 2.0 },
            last_update: Utc::now(),
            registered: true,
        });
        assert_eq!(store.participant_count(), 1);

        assert!(store.remove_participant("alice"));
        assert!(!store.remove_participant("alice"));
        assert_eq!(store.participant_count(), 0);
    }
}
