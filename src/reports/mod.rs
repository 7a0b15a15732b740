//! Reports module for Tally
//!
//! Provides the period summary (totals, month-over-month comparison, top
//! categories), the annual report, and budget progress.

pub mod annual;
pub mod budget_overview;
pub mod summary;

pub use annual::{available_years, available_years_now, AnnualReport, MonthRow};
pub use budget_overview::{BudgetOverviewReport, BudgetProgressRow};
pub use summary::{top_categories, CategorySpending, Change, Comparison, SummaryReport, Totals};
