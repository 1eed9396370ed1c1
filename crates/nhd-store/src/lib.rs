//! # NHD Entity Store
//!
//! Authoritative holder of customers, report runs and users.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Store-assigned ids | Customer and report-run ids are assigned on creation and never change |
//! | Append-only costs | A report run's cost history never shrinks or reorders |
//! | Single payment slot | Payment details are replaced wholesale, last write wins |
//! | No torn reads | Readers never observe a nested field mid-mutation |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, the derived financial summary, errors
//! - `ports/` - The `Datastore` capability trait
//! - `adapters/` - `MemStore`, the in-memory implementation
//!
//! ## Usage
//!
//! ```ignore
//! use nhd_store::{Customer, Datastore, MemStore};
//!
//! let store = MemStore::new();
//! let id = store.create_customer(Customer::new("Alice", "alice@example.com")).await?;
//! let customers = store.list_customers().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::MemStore;
pub use domain::entities::{
    Address, Customer, CustomerId, Payment, PaymentStatus, Permissions, ReportCost, ReportRun,
    ReportRunId, ReportStatus, User, UserId,
};
pub use domain::errors::{StoreError, StoreResult};
pub use domain::summary::{FinancialsSummary, PaidReportInfo};
pub use ports::datastore::Datastore;
