//! API error taxonomy and its HTTP rendering.
//!
//! Every failure leaving a handler or middleware stage is an `ApiError`,
//! rendered as `{"error": "<kind>", "message": "<text>"}` with the status
//! code of its kind.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use nhd_store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kind, one per HTTP status the gateway emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    TooManyRequests,
    InternalError,
    NotImplemented,
    ServiceUnavailable,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::TooManyRequests => "too_many_requests",
            Self::InternalError => "internal_error",
            Self::NotImplemented => "not_implemented",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }
}

/// API error returned to clients
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// Seconds until a rate-limited client may retry
    pub retry_after: Option<u64>,
}

/// Wire shape of an error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, details)
    }

    pub fn unauthorized(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, details)
    }

    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, details)
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, details)
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, details)
    }

    pub fn not_implemented(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, details)
    }

    pub fn unavailable(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, details)
    }

    /// Rate limit exceeded; `retry_after_secs` is sent as `Retry-After`.
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            kind: ErrorKind::TooManyRequests,
            message: "rate limit exceeded".into(),
            retry_after: Some(retry_after_secs),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind.as_str().to_string(),
            message: self.message,
        };
        let payload = serde_json::to_vec(&body).unwrap_or_default();

        let mut response = (self.kind.status(), payload).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        match self.kind {
            ErrorKind::Unauthorized => {
                headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            ErrorKind::TooManyRequests => {
                if let Some(secs) = self.retry_after {
                    headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
                }
            }
            _ => {}
        }
        response
    }
}

// Conversions from common error types

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ApiError::not_found(e.to_string()),
            StoreError::InvalidArgument(_) => ApiError::bad_request(e.to_string()),
            StoreError::Unavailable(_) => ApiError::unavailable(e.to_string()),
            StoreError::Internal(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::bad_request(format!("invalid request body: {e}"))
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and serving, not per request)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server loop terminated with an error
    #[error("server error: {0}")]
    Serve(String),
}
