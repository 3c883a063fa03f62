use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::engine::leaderboard::LeaderboardEntry;
use crate::models::marker::Marker;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/markers", get(list_markers))
        .route("/leaderboard", get(leaderboard))
}

async fn list_markers(State(state): State<Arc<AppState>>) -> Json<Vec<Marker>> {
    Json(state.views.read().await.markers.clone())
}

async fn leaderboard(State(state): State<Arc<AppState>>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.views.read().await.leaderboard.clone())
}
