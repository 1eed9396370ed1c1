//! HTTP route table.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | POST/GET | /customers | public |
//! | POST | /report-runs | public |
//! | GET | /report-runs?payment_status= | public |
//! | PUT | /report-runs/:id/cost | admin |
//! | POST | /report-runs/:id/payment | admin |
//! | POST | /report-runs/:id/resend-email | authenticated |
//! | GET | /financials/summary | public |
//! | POST | /users/register | admin |
//! | GET | /healthz, /readyz, /metrics | public |

pub mod customers;
pub mod financials;
pub mod health;
pub mod report_runs;
pub mod users;


use crate::domain::error::{ApiError, ApiResult};
use crate::middleware::{AuthLayer, RequireAdminLayer, StatusMetrics, METRICS_PATH};
use crate::ports::{IdentityVerifier, ReportPublisher};
use axum::{
    body::Bytes,
    routing::{get, post, put},
    Router,
};
use nhd_store::Datastore;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub publisher: Arc<dyn ReportPublisher>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub metrics: Arc<StatusMetrics>,
    /// Topic new report-run ids are published to
    pub report_topic: String,
}

/// Build the route table with per-route auth. Global stages are applied by `Pipeline`.
pub fn build_router(state: AppState) -> Router {
    let auth = AuthLayer::new(Arc::clone(&state.identity));
    let admin = RequireAdminLayer::new(auth.clone(), Arc::clone(&state.store));

    Router::new()
        .route(
            "/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route(
            "/report-runs",
            post(report_runs::create_report_run).get(report_runs::list_report_runs),
        )
        .route(
            "/report-runs/:id/cost",
            put(report_runs::update_report_cost).route_layer(admin.clone()),
        )
        .route(
            "/report-runs/:id/payment",
            post(report_runs::record_report_payment).route_layer(admin.clone()),
        )
        .route(
            "/report-runs/:id/resend-email",
            post(report_runs::resend_report_email).route_layer(auth),
        )
        .route("/financials/summary", get(financials::get_summary))
        .route("/users/register", post(users::register_user).route_layer(admin))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route(METRICS_PATH, get(health::metrics))
        .with_state(state)
}

/// Decode a JSON request body, mapping failures to `400`.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(ApiError::from)
}

/// Reject amounts that cannot be money.
fn validate_amount(field: &str, amount: f64) -> ApiResult<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "{field} must be a non-negative number"
        )))
    }
}
