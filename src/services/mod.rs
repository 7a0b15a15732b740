//! Service layer for Tally
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, budget checks, and notifications for every mutation.

pub mod budget;
pub mod category;
pub mod period;
pub mod reconciliation;
pub mod recurring;
pub mod transaction;

pub use budget::{BudgetEvaluator, BudgetService};
pub use category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use period::PeriodService;
pub use reconciliation::{DraftItem, ReconciliationDraft, ReconciliationService};
pub use recurring::{PostingOutcome, RecurringPoster};
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionService, UpdateTransactionInput,
};
