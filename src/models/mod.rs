//! Core data models for Tally
//!
//! The ledger domain: transactions, the categories they belong to, monthly
//! budget caps, and the calendar periods used to slice them.

pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;

pub use budget::{Budget, BudgetCheck};
pub use category::{Category, DefaultCategory};
pub use ids::{CategoryId, TransactionId};
pub use money::Money;
pub use period::{DateRange, MonthPeriod, PeriodSelection};
pub use transaction::{Transaction, TransactionType};
