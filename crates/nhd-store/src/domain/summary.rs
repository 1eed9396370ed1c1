//! # Financials Summary
//!
//! Derived view over paid report runs. Computed on demand, never stored.

use crate::domain::entities::{PaymentStatus, ReportRun};
use serde::{Deserialize, Serialize};

/// Aggregated revenue over all paid report runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialsSummary {
    pub total_revenue: f64,
    pub paid_reports: Vec<PaidReportInfo>,
}

/// One paid report run as shown in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaidReportInfo {
    pub customer_name: String,
    pub property_address: String,
    pub amount_paid: f64,
    /// Calendar date of payment, `YYYY-MM-DD`.
    pub paid_at: String,
}

impl FinancialsSummary {
    /// Fold `runs` into a summary.
    ///
    /// `customer_name` resolves a customer id to its display name; unknown
    /// customers are shown as `Customer <id>`. Properties are shown as
    /// `Address for <property_address_id>`.
    pub fn from_runs<'a, I, F>(runs: I, customer_name: F) -> Self
    where
        I: IntoIterator<Item = &'a ReportRun>,
        F: Fn(&str) -> Option<String>,
    {
        let mut summary = Self::default();

        for run in runs {
            let Some(payment) = run.payment_details.as_ref() else {
                continue;
            };
            if payment.status != PaymentStatus::Paid {
                continue;
            }

            summary.total_revenue += payment.amount_paid;
            summary.paid_reports.push(PaidReportInfo {
                customer_name: customer_name(&run.customer_id)
                    .unwrap_or_else(|| format!("Customer {}", run.customer_id)),
                property_address: format!("Address for {}", run.property_address_id),
                amount_paid: payment.amount_paid,
                paid_at: payment.paid_at.format("%Y-%m-%d").to_string(),
            });
        }

        summary
    }
}
