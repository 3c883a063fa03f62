use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::participant::{GeoPoint, Participant};

/// Render-ready map marker derived from a participant joined to its group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub position: GeoPoint,
    pub last_update: DateTime<Utc>,
    pub group_id: String,
    pub group_name: String,
    pub icon: String,
    pub age: String,
}

impl Marker {
    pub fn new(participant: &Participant, group_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: participant.username.clone(),
            position: participant.location,
            last_update: participant.last_update,
            group_id: participant.group_id.clone(),
            group_name: group_name.to_string(),
            icon: icon_path(&participant.group_id),
            age: humanize_since(participant.last_update, now),
        }
    }
}

pub fn icon_path(group_id: &str) -> String {
    format!("/assets/{group_id}.svg")
}

/// Humanized elapsed time for the marker info window. Coarse buckets down
/// to the hour, then minute/second resolution.
pub fn humanize_since(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - from).num_seconds().max(0);

    if seconds > 31_536_000 {
        return format!("{} years", seconds / 31_536_000);
    }
    if seconds > 2_592_000 {
        return format!("{} months", seconds / 2_592_000);
    }
    if seconds > 86_400 {
        return format!("{} days", seconds / 86_400);
    }
    if seconds > 3_600 {
        return format!("{} hours", seconds / 3_600);
    }
    if seconds > 60 {
        return format!("{}m {}s", seconds / 60, seconds % 60);
    }
    format!("{seconds}s")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::humanize_since;

    #[test]
    fn seconds_bucket() {
        let now = Utc::now();
        assert_eq!(humanize_since(now - Duration::seconds(42), now), "42s");
    }

    #[test]
    fn minutes_bucket_keeps_remainder_seconds() {
        let now = Utc::now();
        let then = now - Duration::seconds(3 * 60 + 7);
        assert_eq!(humanize_since(then, now), "3m 7s");
    }

    #[test]
    fn hours_and_days_buckets() {
        let now = Utc::now();
        assert_eq!(humanize_since(now - Duration::hours(5), now), "5 hours");
        assert_eq!(humanize_since(now - Duration::days(3), now), "3 days");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        let now = Utc::now();
        assert_eq!(humanize_since(now + Duration::seconds(30), now), "0s");
    }
}
