//! Outbound ports for the gateway.
//!
//! Both collaborators live outside this process in production: the identity
//! service that verifies bearer tokens and the message bus the report worker
//! listens on.

use async_trait::async_trait;
use thiserror::Error;

/// Subject id the identity service resolved a token to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("token rejected")]
    InvalidToken,

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Verifies bearer tokens against the identity service.
///
/// Implementations must not cache results; every request is verified anew.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, IdentityError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("publisher closed")]
    Closed,

    #[error("publish failed: {0}")]
    Failed(String),
}

/// Fire-and-forget side channel to the report worker.
#[async_trait]
pub trait ReportPublisher: Send + Sync {
    /// Publish `data` to `topic` and return the bus-assigned message id.
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<String, PublishError>;
}
