use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One live location record per participant, keyed by username.
/// Each update supersedes the previous record wholesale; there is no
/// versioning or merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub username: String,
    pub group_id: String,
    pub location: GeoPoint,
    pub last_update: DateTime<Utc>,
    #[serde(default)]
    pub registered: bool,
}
