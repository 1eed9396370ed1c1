//! # Domain Entities
//!
//! Customers, report runs and users as held by the store.
//!
//! Enumerations travel on the wire as their upper-case names. `PaymentStatus`
//! also accepts its numeric code on input (`UNPAID=0 .. REFUNDED=3`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned customer identifier.
pub type CustomerId = String;

/// Store-assigned report run identifier.
pub type ReportRunId = String;

/// Identity-service subject id.
pub type UserId = String;

/// Postal address of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// A customer of the reporting business.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    /// Assigned by the store; any value supplied on creation is replaced.
    #[serde(default)]
    pub customer_id: CustomerId,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl Customer {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            customer_id: CustomerId::new(),
            full_name: full_name.into(),
            email: email.into(),
            address: None,
        }
    }
}

/// Lifecycle of a report run. Only `Pending` is set by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETE" => Ok(Self::Complete),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// Payment state of a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Every status, in code order.
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Unpaid,
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Refunded,
    ];

    /// Canonical string form. This is what payment-status filters compare against.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Refunded => "REFUNDED",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown payment status: {s}"))
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Code(u8),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            Repr::Code(code) => Self::from_code(code).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown payment status code: {code}"))
            }),
        }
    }
}

/// One price quote in a report run's cost history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCost {
    pub amount: f64,
    pub currency: String,
    pub set_at: DateTime<Utc>,
}

/// The single current payment record of a report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount_paid: f64,
    #[serde(default)]
    pub currency: String,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

/// One instance of the report-generation workflow for a customer/property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRun {
    pub report_run_id: ReportRunId,
    /// Not validated against existing customers.
    pub customer_id: CustomerId,
    pub property_address_id: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cost_history: Vec<ReportCost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<Payment>,
}

impl ReportRun {
    /// A fresh, unsaved run. Id, status and creation time are set again by the store.
    pub fn new(customer_id: impl Into<CustomerId>, property_address_id: impl Into<String>) -> Self {
        Self {
            report_run_id: ReportRunId::new(),
            customer_id: customer_id.into(),
            property_address_id: property_address_id.into(),
            status: ReportStatus::Pending,
            created_at: Utc::now(),
            cost_history: Vec::new(),
            payment_details: None,
        }
    }

    /// Status of the recorded payment, if any.
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.payment_details.as_ref().map(|p| p.status)
    }
}

/// Permissions attached to a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub is_admin: bool,
}

/// Operator profile keyed by identity-service subject id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub permissions: Permissions,
}

impl User {
    pub fn new(user_id: impl Into<UserId>, is_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            permissions: Permissions { is_admin },
            ..Self::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.is_admin
    }
}
