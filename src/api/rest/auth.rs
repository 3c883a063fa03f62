use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/auth/login", post(login))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub credential: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub email: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let result = auth::authorize(state.identity.as_ref(), &state.store, &payload.credential).await;

    let outcome = if result.is_ok() { "granted" } else { "denied" };
    state
        .metrics
        .auth_checks_total
        .with_label_values(&[outcome])
        .inc();

    let identity = result?;
    Ok(Json(LoginResponse {
        email: identity.email,
    }))
}
