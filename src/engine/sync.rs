use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::engine::leaderboard::{compute_leaderboard, compute_markers};
use crate::feed::{ChangeEvent, FeedHandles};
use crate::models::approval::{Approval, PLACEHOLDER_APPROVAL_ID};
use crate::models::group::Group;
use crate::models::participant::Participant;
use crate::state::{AppState, DashboardEvent, Views};

/// Reconciles the three live feeds into the derived dashboard views.
///
/// Single task, no locking beyond the view cell: feed deliveries are the
/// only suspension points, and each one applies the change to the raw
/// mirrors then recomputes both views from scratch. A feed whose channel
/// closes is logged and left stale; the loop keeps serving the others.
pub async fn run_sync_engine(state: Arc<AppState>, mut feeds: FeedHandles) {
    info!("sync engine started");

    let mut groups = HashMap::new();
    let mut participants = HashMap::new();
    let mut notified: HashSet<String> = HashSet::new();

    let mut groups_open = true;
    let mut participants_open = true;
    let mut approvals_open = true;

    loop {
        tokio::select! {
            event = feeds.groups.next(), if groups_open => match event {
                Some(event) => {
                    state
                        .metrics
                        .feed_events_total
                        .with_label_values(&["groups", event.kind()])
                        .inc();
                    apply(&mut groups, event, |group| group.id.clone());
                    refresh_views(&state, &groups, &participants).await;
                }
                None => {
                    groups_open = false;
                    error!("group feed closed; leaderboard is now stale");
                }
            },
            event = feeds.participants.next(), if participants_open => match event {
                Some(event) => {
                    state
                        .metrics
                        .feed_events_total
                        .with_label_values(&["participants", event.kind()])
                        .inc();
                    apply(&mut participants, event, |participant| {
                        participant.username.clone()
                    });
                    refresh_views(&state, &groups, &participants).await;
                }
                None => {
                    participants_open = false;
                    error!("participant feed closed; markers are now stale");
                }
            },
            event = feeds.approvals.next(), if approvals_open => match event {
                Some(event) => {
                    state
                        .metrics
                        .feed_events_total
                        .with_label_values(&["approvals", event.kind()])
                        .inc();
                    if let Some(approval) = newly_added(&mut notified, &event) {
                        notify(&state, approval);
                    }
                }
                None => {
                    approvals_open = false;
                    error!("approval feed closed; notifications stopped");
                }
            },
            else => break,
        }
    }

    warn!("sync engine stopped: all feeds closed");
}

fn apply<T>(mirror: &mut HashMap<String, T>, event: ChangeEvent<T>, key: impl Fn(&T) -> String) {
    match event {
        ChangeEvent::Added(doc) | ChangeEvent::Modified(doc) => {
            mirror.insert(key(&doc), doc);
        }
        ChangeEvent::Removed(id) => {
            mirror.remove(&id);
        }
    }
}

async fn refresh_views(
    state: &AppState,
    groups: &HashMap<String, Group>,
    participants: &HashMap<String, Participant>,
) {
    let views = Views {
        markers: compute_markers(participants, groups, Utc::now()),
        leaderboard: compute_leaderboard(groups, state.route_locations),
    };

    *state.views.write().await = views.clone();
    let _ = state.updates_tx.send(DashboardEvent::Views(views));
}

/// An approval warrants a notification only on first addition, and never
/// for the placeholder document.
fn newly_added<'a>(
    notified: &mut HashSet<String>,
    event: &'a ChangeEvent<Approval>,
) -> Option<&'a Approval> {
    let ChangeEvent::Added(approval) = event else {
        return None;
    };
    if approval.id == PLACEHOLDER_APPROVAL_ID {
        return None;
    }
    if !notified.insert(approval.id.clone()) {
        return None;
    }
    Some(approval)
}

fn notify(state: &AppState, approval: &Approval) {
    state.metrics.approval_notifications_total.inc();
    info!(approval_id = %approval.id, "approval requested");
    let _ = state.updates_tx.send(DashboardEvent::Notification {
        id: approval.id.clone(),
        content: approval.content.clone(),
    });
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::newly_added;
    use crate::feed::ChangeEvent;
    use crate::models::approval::{Approval, PLACEHOLDER_APPROVAL_ID};

    fn approval(id: &str) -> Approval {
        Approval {
            id: id.to_string(),
            content: "Approve submission".to_string(),
        }
    }

    #[test]
    fn repeated_and_modified_events_notify_once() {
        let mut notified = HashSet::new();
        let events = [
            ChangeEvent::Added(approval("x")),
            ChangeEvent::Added(approval("x")),
            ChangeEvent::Modified(approval("x")),
        ];

        let count = events
            .iter()
            .filter(|event| newly_added(&mut notified, event).is_some())
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn placeholder_never_notifies() {
        let mut notified = HashSet::new();
        let event = ChangeEvent::Added(approval(PLACEHOLDER_APPROVAL_ID));
        assert!(newly_added(&mut notified, &event).is_none());
    }

    #[test]
    fn distinct_ids_each_notify() {
        let mut notified = HashSet::new();
        let first = ChangeEvent::Added(approval("x"));
        let second = ChangeEvent::Added(approval("y"));

        assert!(newly_added(&mut notified, &first).is_some());
        assert!(newly_added(&mut notified, &second).is_some());
    }

    #[test]
    fn removals_never_notify() {
        let mut notified = HashSet::new();
        let event: ChangeEvent<Approval> = ChangeEvent::Removed("x".to_string());
        assert!(newly_added(&mut notified, &event).is_none());
    }
}
