use super::{parse_json, AppState};
use crate::domain::error::ApiResult;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use nhd_store::Customer;
use serde_json::{json, Value};
use tracing::info;

/// `POST /customers`. Any client-supplied id is replaced by the store's.
pub async fn create_customer(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let customer: Customer = parse_json(&body)?;
    let customer_id = state.store.create_customer(customer).await?;
    info!(customer_id = %customer_id, "Customer created");
    Ok((StatusCode::CREATED, Json(json!({ "customer_id": customer_id }))))
}

/// `GET /customers`
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.store.list_customers().await?))
}
