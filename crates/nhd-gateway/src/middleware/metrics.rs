//! Status-code metrics.
//!
//! Counts every completed request by final HTTP status. Scrapes of the
//! metrics endpoint itself are not counted.

use axum::{body::Body, http::Request, response::Response};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::{Layer, Service};

/// Path of the metrics endpoint, excluded from counting.
pub const METRICS_PATH: &str = "/metrics";

/// Status code -> request count
#[derive(Debug, Default)]
pub struct StatusMetrics {
    counts: RwLock<BTreeMap<u16, u64>>,
}

impl StatusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request
    pub fn record(&self, status: u16) {
        *self.counts.write().entry(status).or_insert(0) += 1;
    }

    /// Copy of the current counts
    pub fn snapshot(&self) -> BTreeMap<u16, u64> {
        self.counts.read().clone()
    }

    /// Total number of recorded requests
    pub fn total(&self) -> u64 {
        self.counts.read().values().sum()
    }
}

/// Metrics layer
#[derive(Clone)]
pub struct MetricsLayer {
    metrics: Arc<StatusMetrics>,
}

impl MetricsLayer {
    pub fn new(metrics: Arc<StatusMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Metrics service
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    metrics: Arc<StatusMetrics>,
}

impl<S> Service<Request<Body>> for MetricsService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let metrics = Arc::clone(&self.metrics);
        let mut inner = self.inner.clone();
        let counted = req.uri().path() != METRICS_PATH;

        Box::pin(async move {
            let result = inner.call(req).await;
            if counted {
                if let Ok(response) = &result {
                    metrics.record(response.status().as_u16());
                }
            }
            result
        })
    }
}
