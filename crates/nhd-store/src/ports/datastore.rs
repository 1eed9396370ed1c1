//! # Datastore Port
//!
//! The capability interface every store backend provides.
//!
//! Production: a remote document store adapter (not part of this workspace)
//! Testing / development: `MemStore` (adapters/memory)
//!
//! ## Atomicity
//!
//! Each nested-field mutation (`append_report_cost`, `set_report_payment`,
//! `update_report_status`) is atomic with respect to every other operation on
//! the same report run. No operation spans more than one entity.

use crate::domain::entities::{
    Customer, CustomerId, Payment, ReportCost, ReportRun, ReportRunId, ReportStatus, User,
};
use crate::domain::errors::StoreResult;
use crate::domain::summary::FinancialsSummary;
use async_trait::async_trait;

#[async_trait]
pub trait Datastore: Send + Sync {
    /// Store a new customer under a fresh id and return that id.
    async fn create_customer(&self, customer: Customer) -> StoreResult<CustomerId>;

    /// Snapshot of all customers in insertion order.
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;

    /// Store a new report run. The store assigns the id and forces the
    /// status to `PENDING` and the creation time to now.
    async fn create_report_run(&self, run: ReportRun) -> StoreResult<ReportRunId>;

    /// Report runs, optionally filtered by payment status.
    ///
    /// An empty filter returns every run. A non-empty filter is compared
    /// against `PaymentStatus::as_str()`; runs without payment details never
    /// match it.
    async fn list_report_runs(&self, payment_status_filter: &str) -> StoreResult<Vec<ReportRun>>;

    /// Append one entry to a run's cost history.
    async fn append_report_cost(&self, run_id: &str, cost: ReportCost) -> StoreResult<()>;

    /// Replace a run's payment details wholesale.
    async fn set_report_payment(&self, run_id: &str, payment: Payment) -> StoreResult<()>;

    /// Move a run to a new lifecycle status. Used by downstream workers.
    async fn update_report_status(&self, run_id: &str, status: ReportStatus) -> StoreResult<()>;

    async fn get_user(&self, uid: &str) -> StoreResult<User>;

    /// Store a user profile. Fails with `InvalidArgument` on an empty id.
    async fn create_user(&self, user: User) -> StoreResult<()>;

    /// Revenue summary computed in one consistent pass.
    async fn compute_financials_summary(&self) -> StoreResult<FinancialsSummary>;

    /// Readiness check.
    async fn ping(&self) -> StoreResult<()>;
}
