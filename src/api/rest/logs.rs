use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/logs/err", get(error_log))
}

/// Fetches the backend's error-log blob on demand and relays it as-is.
async fn error_log(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let url = format!("{}/logs/err", state.backend_url);

    let response = state
        .http
        .get(&url)
        .send()
        .await
        .map_err(|err| AppError::Upstream(format!("log fetch failed: {err}")))?
        .error_for_status()
        .map_err(|err| AppError::Upstream(format!("log fetch failed: {err}")))?;

    let body = response
        .text()
        .await
        .map_err(|err| AppError::Upstream(format!("log fetch failed: {err}")))?;

    Ok(([("content-type", "text/plain; charset=utf-8")], body))
}
