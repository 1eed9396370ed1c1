//! # In-Memory Store
//!
//! `MemStore` keeps every entity behind a single `parking_lot::RwLock`.
//! Reads take the shared lock, mutations the exclusive one, and the lock is
//! never held across an `.await`, so each trait method is a single critical
//! section.
//!
//! Customers and report runs are kept in insertion order; an id index points
//! into the ordered vectors.

use crate::domain::entities::{
    Customer, CustomerId, Payment, ReportCost, ReportRun, ReportRunId, ReportStatus, User,
};
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::summary::FinancialsSummary;
use crate::ports::datastore::Datastore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;


#[derive(Default)]
struct Inner {
    customers: Vec<Customer>,
    customer_index: HashMap<CustomerId, usize>,
    report_runs: Vec<ReportRun>,
    report_index: HashMap<ReportRunId, usize>,
    users: HashMap<String, User>,
}

impl Inner {
    fn report_run_mut(&mut self, run_id: &str) -> StoreResult<&mut ReportRun> {
        let idx = *self
            .report_index
            .get(run_id)
            .ok_or_else(|| StoreError::report_run_not_found(run_id))?;
        Ok(&mut self.report_runs[idx])
    }

    fn customer_name(&self, customer_id: &str) -> Option<String> {
        self.customer_index
            .get(customer_id)
            .map(|&idx| self.customers[idx].full_name.clone())
    }
}

/// In-memory `Datastore` for development and tests.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn insert_customer(&self, mut customer: Customer) -> CustomerId {
        let id = Self::new_id();
        customer.customer_id = id.clone();

        let mut inner = self.inner.write();
        let idx = inner.customers.len();
        inner.customers.push(customer);
        inner.customer_index.insert(id.clone(), idx);
        debug!(customer_id = %id, "customer created");
        id
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.inner.read().customers.clone()
    }

    pub fn insert_report_run(&self, mut run: ReportRun) -> ReportRunId {
        let id = Self::new_id();
        run.report_run_id = id.clone();
        run.status = ReportStatus::Pending;
        run.created_at = Utc::now();

        let mut inner = self.inner.write();
        let idx = inner.report_runs.len();
        inner.report_runs.push(run);
        inner.report_index.insert(id.clone(), idx);
        debug!(report_run_id = %id, "report run created");
        id
    }

    pub fn report_runs(&self, payment_status_filter: &str) -> Vec<ReportRun> {
        let inner = self.inner.read();
        if payment_status_filter.is_empty() {
            return inner.report_runs.clone();
        }
        inner
            .report_runs
            .iter()
            .filter(|run| {
                run.payment_status()
                    .is_some_and(|status| status.as_str() == payment_status_filter)
            })
            .cloned()
            .collect()
    }

    pub fn report_run(&self, run_id: &str) -> StoreResult<ReportRun> {
        let inner = self.inner.read();
        inner
            .report_index
            .get(run_id)
            .map(|&idx| inner.report_runs[idx].clone())
            .ok_or_else(|| StoreError::report_run_not_found(run_id))
    }

    pub fn push_report_cost(&self, run_id: &str, cost: ReportCost) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let run = inner.report_run_mut(run_id)?;
        run.cost_history.push(cost);
        debug!(report_run_id = %run_id, entries = run.cost_history.len(), "cost appended");
        Ok(())
    }

    pub fn replace_report_payment(&self, run_id: &str, payment: Payment) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let run = inner.report_run_mut(run_id)?;
        debug!(report_run_id = %run_id, status = %payment.status, "payment recorded");
        run.payment_details = Some(payment);
        Ok(())
    }

    pub fn set_report_status(&self, run_id: &str, status: ReportStatus) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner.report_run_mut(run_id)?.status = status;
        Ok(())
    }

    pub fn user(&self, uid: &str) -> StoreResult<User> {
        self.inner
            .read()
            .users
            .get(uid)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(uid))
    }

    pub fn upsert_user(&self, user: User) -> StoreResult<()> {
        if user.user_id.is_empty() {
            return Err(StoreError::InvalidArgument("user id cannot be empty".into()));
        }
        let mut inner = self.inner.write();
        inner.users.insert(user.user_id.clone(), user);
        Ok(())
    }

    pub fn financials_summary(&self) -> FinancialsSummary {
        let inner = self.inner.read();
        FinancialsSummary::from_runs(&inner.report_runs, |id| inner.customer_name(id))
    }
}

#[async_trait]
impl Datastore for MemStore {
    async fn create_customer(&self, customer: Customer) -> StoreResult<CustomerId> {
        Ok(self.insert_customer(customer))
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.customers())
    }

    async fn create_report_run(&self, run: ReportRun) -> StoreResult<ReportRunId> {
        Ok(self.insert_report_run(run))
    }

    async fn list_report_runs(&self, payment_status_filter: &str) -> StoreResult<Vec<ReportRun>> {
        Ok(self.report_runs(payment_status_filter))
    }

    async fn append_report_cost(&self, run_id: &str, cost: ReportCost) -> StoreResult<()> {
        self.push_report_cost(run_id, cost)
    }

    async fn set_report_payment(&self, run_id: &str, payment: Payment) -> StoreResult<()> {
        self.replace_report_payment(run_id, payment)
    }

    async fn update_report_status(&self, run_id: &str, status: ReportStatus) -> StoreResult<()> {
        self.set_report_status(run_id, status)
    }

    async fn get_user(&self, uid: &str) -> StoreResult<User> {
        self.user(uid)
    }

    async fn create_user(&self, user: User) -> StoreResult<()> {
        self.upsert_user(user)
    }

    async fn compute_financials_summary(&self) -> StoreResult<FinancialsSummary> {
        Ok(self.financials_summary())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
