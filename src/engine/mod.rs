pub mod leaderboard;
pub mod progress;
pub mod sync;
