use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::engine::leaderboard::LeaderboardEntry;
use crate::feed::memory::MemoryStore;
use crate::models::marker::Marker;
use crate::observability::metrics::Metrics;

/// The derived render state: everything the dashboard draws. Replaced
/// wholesale on every recomputation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Views {
    pub markers: Vec<Marker>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// One push to connected dashboard clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    Views(Views),
    Notification { id: String, content: String },
}

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub http: reqwest::Client,
    pub backend_url: String,
    pub route_locations: u32,
    pub views: RwLock<Views>,
    pub updates_tx: broadcast::Sender<DashboardEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<MemoryStore>,
        identity: Arc<dyn IdentityProvider>,
        http: reqwest::Client,
    ) -> Self {
        let (updates_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        Self {
            store,
            identity,
            http,
            backend_url: config.backend_url.clone(),
            route_locations: config.route_locations,
            views: RwLock::new(Views::default()),
            updates_tx,
            metrics: Metrics::new(),
        }
    }
}
