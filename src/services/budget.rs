//! Budget service
//!
//! Evaluates expenses against monthly category caps and manages the caps
//! themselves.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{TallyError, TallyResult};
use crate::models::{Budget, BudgetCheck, CategoryId, Money, MonthPeriod, TransactionId};
use crate::notify::NotificationSink;
use crate::storage::Storage;

/// Read-only budget evaluation over a storage snapshot
pub struct BudgetEvaluator<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetEvaluator<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Expense spend for a category in one local month
    ///
    /// `exclude` leaves out one transaction, used when evaluating an edit so
    /// the old version of the record is not counted twice.
    pub fn spent_in_month(
        &self,
        category_id: &CategoryId,
        month: &MonthPeriod,
        exclude: Option<&TransactionId>,
    ) -> Money {
        self.storage
            .transactions
            .by_category(category_id)
            .filter(|txn| txn.is_expense())
            .filter(|txn| Some(&txn.id) != exclude)
            .filter(|txn| month.contains(&txn.timestamp))
            .map(|txn| txn.amount)
            .sum()
    }

    /// Check whether adding `candidate` to the category's month pushes it over cap
    ///
    /// The month is the local month of `timestamp`. Reaching the cap exactly
    /// is not over.
    pub fn evaluate(
        &self,
        category_id: &CategoryId,
        timestamp: &DateTime<Utc>,
        candidate: Money,
        exclude: Option<&TransactionId>,
    ) -> BudgetCheck {
        let month = MonthPeriod::containing(timestamp);
        let spent = self.spent_in_month(category_id, &month, exclude) + candidate;

        match self.storage.budgets.get(category_id) {
            None => BudgetCheck::unbudgeted(spent),
            Some(budget) => BudgetCheck {
                over_budget: budget.is_exceeded_by(spent),
                budget_amount: Some(budget.amount),
                spent_including_candidate: spent,
            },
        }
    }
}

/// Service for budget cap management
pub struct BudgetService<'a> {
    storage: &'a mut Storage,
    sink: &'a dyn NotificationSink,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a mut Storage, sink: &'a dyn NotificationSink) -> Self {
        Self { storage, sink }
    }

    /// Set the monthly cap for a category, replacing any existing one
    pub fn set(&mut self, category_id: &CategoryId, amount: Money) -> TallyResult<Budget> {
        let category = self
            .storage
            .categories
            .get(category_id)
            .ok_or_else(|| TallyError::category_not_found(category_id.as_str()))?;

        if !category.is_expense() {
            // Allowed, but caps are only evaluated for expenses
            warn!(category = %category.name, "budget set on an income category");
        }

        let budget = Budget::new(category_id.clone(), amount);
        budget
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone());
        self.storage.budgets.save()?;

        debug!(category = %category_id, amount = %amount, "budget set");
        self.sink.info("Budget updated");
        Ok(budget)
    }

    /// Remove the cap for a category
    pub fn remove(&mut self, category_id: &CategoryId) -> TallyResult<Budget> {
        let removed = self
            .storage
            .budgets
            .remove(category_id)
            .ok_or_else(|| TallyError::budget_not_found(category_id.as_str()))?;
        self.storage.budgets.save()?;

        self.sink.info("Budget removed");
        Ok(removed)
    }

    pub fn list(&self) -> Vec<Budget> {
        self.storage.budgets.all().to_vec()
    }
}
