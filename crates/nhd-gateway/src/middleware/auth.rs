//! Bearer-token authentication middleware.
//!
//! The `Authorization` header must be exactly `Bearer <token>`: case-sensitive
//! scheme, one space, a non-empty token with no further spaces. Malformed
//! headers are rejected without calling the identity service. A verified
//! subject is attached to the request as a [`Principal`].

use crate::domain::error::ApiError;
use crate::ports::{IdentityError, IdentityVerifier};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Authenticated caller, available to handlers via `Extension<Principal>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
}

/// Extract the token from an `Authorization` header value.
pub fn parse_bearer(value: &str) -> Result<&str, ApiError> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(ApiError::unauthorized(
            "authorization header must be 'Bearer <token>'",
        )),
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("authorization header is not valid text"))?;
    parse_bearer(value)
}

/// Verify the request's bearer token and resolve its principal.
pub async fn verify_bearer(
    verifier: &dyn IdentityVerifier,
    headers: &HeaderMap,
) -> Result<Principal, ApiError> {
    let token = bearer_token(headers)?;
    match verifier.verify_token(token).await {
        Ok(verified) => Ok(Principal { uid: verified.uid }),
        Err(IdentityError::InvalidToken) => Err(ApiError::unauthorized("invalid token")),
        Err(e) => {
            warn!(error = %e, "Token verification failed");
            Err(ApiError::unauthorized("token could not be verified"))
        }
    }
}

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    verifier: Arc<dyn IdentityVerifier>,
}

impl AuthLayer {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            verifier: Arc::clone(&self.verifier),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    verifier: Arc<dyn IdentityVerifier>,
}

impl<S> Service<Request<Body>> for AuthService<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let verifier = Arc::clone(&self.verifier);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match verify_bearer(verifier.as_ref(), req.headers()).await {
                Ok(principal) => {
                    debug!(uid = %principal.uid, "Request authenticated");
                    req.extensions_mut().insert(principal);
                    inner.call(req).await
                }
                Err(e) => {
                    debug!(path = %req.uri().path(), reason = %e.message, "Authentication rejected");
                    Ok(e.into_response())
                }
            }
        })
    }
}
