//! Gateway service: wires config, ports and the middleware pipeline into a
//! running HTTP server.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{Pipeline, StatusMetrics};
use crate::ports::{IdentityVerifier, ReportPublisher};
use crate::routes::{build_router, AppState};
use axum::Router;
use nhd_store::Datastore;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
    pipeline: Pipeline,
}

impl GatewayService {
    /// Create a new gateway service. Fails if the configuration is invalid.
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn Datastore>,
        publisher: Arc<dyn ReportPublisher>,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let metrics = Arc::new(StatusMetrics::new());
        let pipeline = Pipeline::standard(&config, Arc::clone(&metrics));
        let state = AppState {
            store,
            publisher,
            identity,
            metrics,
            report_topic: config.publisher.topic.clone(),
        };

        Ok(Self {
            config,
            state,
            pipeline,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<StatusMetrics> {
        Arc::clone(&self.state.metrics)
    }

    /// Routes wrapped in the global pipeline.
    pub fn router(&self) -> Router {
        self.pipeline.apply(build_router(self.state.clone()))
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
    }

    /// Serve on `listener` until `shutdown` resolves; in-flight requests are
    /// allowed to finish.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local: Option<SocketAddr> = listener.local_addr().ok();
        info!(
            addr = ?local,
            rate_limit_rps = self.config.rate_limit.requests_per_second,
            rate_limit_burst = self.config.rate_limit.burst_size,
            timeout_ms = self.config.timeouts.request.as_millis() as u64,
            "Starting HTTP server"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
