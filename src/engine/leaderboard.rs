use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::progress::{compute_progress, format_progress};
use crate::models::group::Group;
use crate::models::marker::Marker;
use crate::models::participant::Participant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub group_id: String,
    pub name: String,
    pub progress: i64,
    pub label: String,
}

/// Full leaderboard recomputation: progress descending, names ascending
/// on ties. Derived state is never patched incrementally.
pub fn compute_leaderboard(
    groups: &HashMap<String, Group>,
    number_locations: u32,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = groups
        .values()
        .map(|group| LeaderboardEntry {
            group_id: group.id.clone(),
            name: group.name.clone(),
            progress: compute_progress(group, number_locations),
            label: format_progress(group, number_locations),
        })
        .collect();

    entries.sort_by(|a, b| b.progress.cmp(&a.progress).then_with(|| a.name.cmp(&b.name)));
    entries
}

/// Full marker recomputation: one marker per participant, joined to its
/// group for the display name. A participant whose group record has not
/// arrived yet falls back to the raw group id.
pub fn compute_markers(
    participants: &HashMap<String, Participant>,
    groups: &HashMap<String, Group>,
    now: DateTime<Utc>,
) -> Vec<Marker> {
    let mut markers: Vec<Marker> = participants
        .values()
        .map(|participant| {
            let group_name = groups
                .get(&participant.group_id)
                .map(|group| group.name.as_str())
                .unwrap_or(participant.group_id.as_str());
            Marker::new(participant, group_name, now)
        })
        .collect();

    markers.sort_by(|a, b| a.id.cmp(&b.id));
    markers
}
