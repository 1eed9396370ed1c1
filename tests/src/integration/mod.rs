//! # Integration Tests
//!
//! Drive a fully assembled `GatewayService` (routes plus the global
//! pipeline) against a shared `MemStore`.

pub mod concurrency;
pub mod scenarios;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use nhd_gateway::{
    parse_static_tokens, GatewayConfig, GatewayService, InMemoryPublisher, StaticTokenVerifier,
};
use nhd_store::{Datastore, MemStore};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN: &str = "Bearer admin-tok";
pub const USER: &str = "Bearer user-tok";

/// Token table shared by every test gateway.
pub const TOKENS: &str = "admin-tok=admin-uid:admin,user-tok=user-uid";

/// A gateway and handles on its collaborators.
pub struct TestGateway {
    pub service: GatewayService,
    pub store: Arc<MemStore>,
    pub publisher: Arc<InMemoryPublisher>,
}

impl TestGateway {
    /// Default configuration with a rate limit loose enough to never trip.
    pub async fn new() -> Self {
        let mut config = GatewayConfig::default();
        config.rate_limit.requests_per_second = 10_000.0;
        config.rate_limit.burst_size = 10_000;
        Self::with_config(config).await
    }

    pub async fn with_config(config: GatewayConfig) -> Self {
        let store = Arc::new(MemStore::new());
        Self::with_store(config, store.clone(), store).await
    }

    /// Serve through `backend` while seeding users into `store`.
    pub async fn with_store(
        config: GatewayConfig,
        store: Arc<MemStore>,
        backend: Arc<dyn Datastore>,
    ) -> Self {
        let tokens = parse_static_tokens(TOKENS).expect("static tokens");
        for token in &tokens {
            store.create_user(token.user()).await.expect("seed user");
        }

        let publisher = Arc::new(InMemoryPublisher::new());
        let service = GatewayService::new(
            config,
            backend,
            publisher.clone(),
            Arc::new(StaticTokenVerifier::new(tokens)),
        )
        .expect("valid config");

        Self {
            service,
            store,
            publisher,
        }
    }

    pub fn router(&self) -> Router {
        self.service.router()
    }
}

/// Send one request through `router` and decode the JSON reply (or `Null`).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        request = request.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
