//! Domain types for the entity store.

pub mod entities;
pub mod errors;
pub mod summary;

pub use entities::*;
pub use errors::{StoreError, StoreResult};
pub use summary::{FinancialsSummary, PaidReportInfo};
