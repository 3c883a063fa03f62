use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Route traversal code. `A*` routes run the course forward, `B*` routes
/// run it in reverse; the `*0` variants start one checkpoint in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    A1,
    A0,
    B1,
    B0,
}

impl Direction {
    pub fn is_reverse(self) -> bool {
        matches!(self, Direction::B1 | Direction::B0)
    }
}

/// One competing team. Mutated by the race backend as the team moves;
/// the view side only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub current_location: Option<u32>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub race_completed: bool,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub challenges_skipped: u32,
    #[serde(default)]
    pub bonus_completed: u32,
}
