//! Admin authorization gate.
//!
//! `RequireAdminLayer` always authenticates first: it wraps the inner service
//! in an admin check and then wraps that in [`AuthLayer`], so a request can
//! only reach the admin check with a [`Principal`] attached.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Auth fails | 401 |
//! | Profile lookup fails (any reason) | 500 |
//! | Profile is not admin | 403 |
//! | Admin | handler runs |

use super::auth::{AuthLayer, AuthService, Principal};
use crate::domain::error::ApiError;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use nhd_store::Datastore;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{error, warn};

/// Admin gate layer
#[derive(Clone)]
pub struct RequireAdminLayer {
    auth: AuthLayer,
    store: Arc<dyn Datastore>,
}

impl RequireAdminLayer {
    pub fn new(auth: AuthLayer, store: Arc<dyn Datastore>) -> Self {
        Self { auth, store }
    }
}

impl<S> Layer<S> for RequireAdminLayer {
    type Service = AuthService<AdminGate<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        self.auth.layer(AdminGate {
            inner,
            store: Arc::clone(&self.store),
        })
    }
}

/// Admin check; only reachable through [`RequireAdminLayer`].
#[derive(Clone)]
pub struct AdminGate<S> {
    inner: S,
    store: Arc<dyn Datastore>,
}

impl<S> Service<Request<Body>> for AdminGate<S>
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
        let store = Arc::clone(&self.store);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(uid) = req.extensions().get::<Principal>().map(|p| p.uid.clone()) else {
                // AuthLayer always runs first; a missing principal is a wiring bug.
                error!("Admin gate reached without an authenticated principal");
                return Ok(ApiError::internal("could not retrieve user profile").into_response());
            };

            let user = match store.get_user(&uid).await {
                Ok(user) => user,
                Err(e) => {
                    error!(uid = %uid, error = %e, "User profile lookup failed");
                    return Ok(
                        ApiError::internal("could not retrieve user profile").into_response()
                    );
                }
            };

            if !user.is_admin() {
                warn!(uid = %uid, path = %req.uri().path(), "Admin access denied");
                return Ok(ApiError::forbidden("admin permission required").into_response());
            }

            inner.call(req).await
        })
    }
}
