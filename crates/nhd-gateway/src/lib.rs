//! NHD Gateway - HTTP interface for the report backend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         NHD GATEWAY                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Pipeline (global, outermost first)                              │
//! │  Logging → Metrics → RateLimit → Recover → Timeout → Cors        │
//! │                             │                                    │
//! │  Routes ─── per-route: AuthLayer / RequireAdminLayer             │
//! │     │                                                            │
//! │     ├──► Datastore (nhd-store)                                   │
//! │     ├──► IdentityVerifier (bearer tokens)                        │
//! │     └──► ReportPublisher (report worker topic)                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Access Levels
//!
//! - **Public**: customers, report-run creation and listing, summary, health
//! - **Authenticated**: valid `Bearer` token (resend-email)
//! - **Admin**: valid token AND an admin user profile (cost, payment, register)
//!
//! # Usage
//!
//! ```ignore
//! use nhd_gateway::{GatewayConfig, GatewayService};
//!
//! let service = GatewayService::new(config, store, publisher, identity)?;
//! service.run(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod routes;
pub mod service;

// Re-exports for public API
pub use adapters::{parse_static_tokens, InMemoryPublisher, StaticToken, StaticTokenVerifier};
pub use domain::config::{parse_duration, ConfigError, GatewayConfig, DEFAULT_REPORT_TOPIC};
pub use domain::error::{ApiError, ApiResult, ErrorKind, GatewayError};
pub use middleware::{Pipeline, Principal, Stage, StatusMetrics};
pub use ports::{IdentityError, IdentityVerifier, PublishError, ReportPublisher, VerifiedToken};
pub use routes::{build_router, AppState};
pub use service::GatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
