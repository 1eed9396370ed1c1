//! Report-run handlers.
//!
//! Creation publishes the new id to the report worker's topic after the run is
//! stored. A failed publish is reported as `500` but the stored run remains.

use super::{parse_json, validate_amount, AppState};
use crate::domain::error::{ApiError, ApiResult};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use nhd_store::{Payment, PaymentStatus, ReportCost, ReportRun};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct NewReportRun {
    pub customer_id: String,
    pub property_address_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListReportRunsQuery {
    #[serde(default)]
    pub payment_status: String,
}

#[derive(Debug, Deserialize)]
pub struct CostInput {
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub amount_paid: f64,
    #[serde(default)]
    pub currency: String,
    pub status: PaymentStatus,
}

/// `POST /report-runs`
pub async fn create_report_run(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input: NewReportRun = parse_json(&body)?;
    let run = ReportRun::new(input.customer_id, input.property_address_id);
    let report_run_id = state.store.create_report_run(run).await?;

    let message_id = state
        .publisher
        .publish(&state.report_topic, report_run_id.clone().into_bytes())
        .await
        .map_err(|e| {
            error!(report_run_id = %report_run_id, error = %e, "Failed to publish report request");
            ApiError::internal("failed to queue report generation")
        })?;

    info!(
        report_run_id = %report_run_id,
        message_id = %message_id,
        topic = %state.report_topic,
        "Report run created"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "report_run_id": report_run_id })),
    ))
}

/// `GET /report-runs?payment_status=PAID`
pub async fn list_report_runs(
    State(state): State<AppState>,
    Query(query): Query<ListReportRunsQuery>,
) -> ApiResult<Json<Vec<ReportRun>>> {
    Ok(Json(state.store.list_report_runs(&query.payment_status).await?))
}

/// `PUT /report-runs/:id/cost` (admin)
pub async fn update_report_cost(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let input: CostInput = parse_json(&body)?;
    validate_amount("amount", input.amount)?;

    let cost = ReportCost {
        amount: input.amount,
        currency: input.currency,
        set_at: Utc::now(),
    };
    state.store.append_report_cost(&run_id, cost).await?;

    info!(report_run_id = %run_id, amount = input.amount, "Report cost appended");
    Ok(Json(json!({ "report_run_id": run_id })))
}

/// `POST /report-runs/:id/payment` (admin)
pub async fn record_report_payment(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let input: PaymentInput = parse_json(&body)?;
    validate_amount("amount_paid", input.amount_paid)?;

    let payment = Payment {
        amount_paid: input.amount_paid,
        currency: input.currency,
        status: input.status,
        paid_at: Utc::now(),
    };
    state.store.set_report_payment(&run_id, payment).await?;

    info!(
        report_run_id = %run_id,
        status = %input.status,
        amount_paid = input.amount_paid,
        "Report payment recorded"
    );
    Ok(Json(json!({ "report_run_id": run_id })))
}

/// `POST /report-runs/:id/resend-email` (authenticated). Email delivery lives elsewhere.
pub async fn resend_report_email(Path(run_id): Path<String>) -> ApiError {
    ApiError::not_implemented(format!("resending the report email for {run_id} is not supported"))
}
