//! Write surface for the race backend. The dashboard views never write;
//! these endpoints are how group state, participant locations, and
//! approval requests reach the store.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::approval::Approval;
use crate::models::group::{Direction, Group};
use crate::models::participant::{GeoPoint, Participant};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/groups/:id", put(upsert_group).delete(remove_group))
        .route(
            "/participants/:username",
            put(upsert_participant).delete(remove_participant),
        )
        .route("/approvals", post(submit_approval))
}

#[derive(Deserialize)]
pub struct GroupUpsert {
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

#[derive(Deserialize)]
pub struct ParticipantUpsert {
    pub group_id: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub registered: bool,
}

#[derive(Deserialize)]
pub struct ApprovalRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
}

async fn upsert_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<GroupUpsert>,
) -> Result<Json<Group>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let group = state.store.upsert_group(Group {
        id,
        name: payload.name,
        current_location: payload.current_location,
        direction: payload.direction,
        race_completed: payload.race_completed,
        start_time: payload.start_time,
        end_time: payload.end_time,
        challenges_skipped: payload.challenges_skipped,
        bonus_completed: payload.bonus_completed,
    });

    Ok(Json(group))
}

async fn remove_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.store.remove_group(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("group {id} not found")))
    }
}

async fn upsert_participant(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(payload): Json<ParticipantUpsert>,
) -> Result<Json<Participant>, AppError> {
    if payload.group_id.trim().is_empty() {
        return Err(AppError::BadRequest("group_id cannot be empty".to_string()));
    }

    // last_update is always server-stamped; client clocks are not trusted.
    let participant = state.store.upsert_participant(Participant {
        username,
        group_id: payload.group_id,
        location: payload.location,
        last_update: Utc::now(),
        registered: payload.registered,
    });

    Ok(Json(participant))
}

async fn remove_participant(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.store.remove_participant(&username) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "participant {username} not found"
        )))
    }
}

async fn submit_approval(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ApprovalRequest>,
) -> Result<Json<Approval>, AppError> {
    let id = match payload.id {
        Some(id) if id.trim().is_empty() => {
            return Err(AppError::BadRequest("id cannot be empty".to_string()));
        }
        Some(id) => id,
        None => Uuid::new_v4().to_string(),
    };

    let approval = state.store.submit_approval(Approval {
        id,
        content: payload.content,
    });

    Ok(Json(approval))
}
