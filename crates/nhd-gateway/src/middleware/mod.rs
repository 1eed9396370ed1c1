//! Middleware stack for the gateway.
//!
//! Global stage order, outermost first:
//!
//! Request → Logging → Metrics → RateLimit → Recover → Timeout → Cors → Router
//!
//! Authentication and the admin gate are attached per route (see `routes`).
//! The order lives in one [`Pipeline`] value so it can be inspected and
//! tested without building the routes.

pub mod admin;
pub mod auth;
pub mod cors;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod recover;
pub mod timeout;

pub use admin::{AdminGate, RequireAdminLayer};
pub use auth::{parse_bearer, verify_bearer, AuthLayer, AuthService, Principal};
pub use cors::create_cors_layer;
pub use logging::LoggingLayer;
pub use metrics::{MetricsLayer, StatusMetrics, METRICS_PATH};
pub use rate_limit::{RateLimitLayer, RateLimitState};
pub use recover::RecoverLayer;
pub use timeout::TimeoutLayer;

use crate::domain::config::GatewayConfig;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// One global middleware stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Logging,
    Metrics,
    RateLimit,
    Recover,
    Timeout,
    Cors,
}

/// Ordered set of global middleware stages.
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
    metrics: Arc<StatusMetrics>,
    rate_limit: RateLimitLayer,
    timeout: TimeoutLayer,
    cors: CorsLayer,
}

impl Pipeline {
    /// Standard order, outermost first.
    pub const STANDARD: [Stage; 6] = [
        Stage::Logging,
        Stage::Metrics,
        Stage::RateLimit,
        Stage::Recover,
        Stage::Timeout,
        Stage::Cors,
    ];

    /// Pipeline from gateway config, sharing `metrics` with the metrics endpoint.
    pub fn standard(config: &GatewayConfig, metrics: Arc<StatusMetrics>) -> Self {
        Self {
            stages: Self::STANDARD.to_vec(),
            metrics,
            rate_limit: RateLimitLayer::new(&config.rate_limit),
            timeout: TimeoutLayer::new(config.timeouts.request),
            cors: create_cors_layer(&config.cors),
        }
    }

    /// Replace the stage list. Stages not listed are not applied.
    pub fn with_stages(mut self, stages: impl Into<Vec<Stage>>) -> Self {
        self.stages = stages.into();
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn metrics(&self) -> Arc<StatusMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Wrap `router` so the first stage is outermost.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // Router::layer wraps everything added so far, so apply innermost first.
        self.stages
            .iter()
            .rev()
            .fold(router, |router, stage| match stage {
                Stage::Logging => router.layer(LoggingLayer::new()),
                Stage::Metrics => router.layer(MetricsLayer::new(Arc::clone(&self.metrics))),
                Stage::RateLimit => router.layer(self.rate_limit.clone()),
                Stage::Recover => router.layer(RecoverLayer::new()),
                Stage::Timeout => router.layer(self.timeout.clone()),
                Stage::Cors => router.layer(self.cors.clone()),
            })
    }
}
