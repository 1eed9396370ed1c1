use super::AppState;
use crate::domain::error::ApiResult;
use axum::{extract::State, Json};
use nhd_store::FinancialsSummary;

/// `GET /financials/summary`
pub async fn get_summary(State(state): State<AppState>) -> ApiResult<Json<FinancialsSummary>> {
    Ok(Json(state.store.compute_financials_summary().await?))
}
