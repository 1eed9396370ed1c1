//! Liveness, readiness and metrics endpoints.

use super::AppState;
use crate::domain::error::ApiError;
use axum::{extract::State, response::IntoResponse, Json};
use std::collections::BTreeMap;
use tracing::warn;

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /readyz`: ready when the store answers a ping.
pub async fn readyz(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.store.ping().await.map(|()| "ok").map_err(|e| {
        warn!(error = %e, "Readiness check failed");
        ApiError::unavailable(format!("store not ready: {e}"))
    })
}

/// `GET /metrics`: status code histogram, e.g. `{"200": 3, "429": 1}`.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot: BTreeMap<String, u64> = state
        .metrics
        .snapshot()
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();
    Json(snapshot)
}
