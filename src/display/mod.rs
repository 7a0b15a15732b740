//! Display formatting for terminal output
//!
//! Provides utilities for formatting ledger data for terminal display,
//! including tables and report helpers.

pub mod category;
pub mod receipt;
pub mod report;
pub mod transaction;

pub use category::{format_category_details, format_category_list};
pub use receipt::format_draft;
pub use transaction::{format_transaction_details, format_transaction_register};
