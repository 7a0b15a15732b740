//! Budget model
//!
//! A budget is a monthly spending cap for one expense category.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;

/// Monthly spending cap for a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub category_id: CategoryId,
    pub amount: Money,
}

impl Budget {
    pub fn new(category_id: CategoryId, amount: Money) -> Self {
        Self {
            category_id,
            amount,
        }
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount(self.amount));
        }
        if !self.amount.is_within_limit() {
            return Err(BudgetValidationError::AmountTooLarge(self.amount));
        }
        Ok(())
    }

    /// Whether `spent` goes past the cap; spending exactly the cap is allowed
    pub fn is_exceeded_by(&self, spent: Money) -> bool {
        spent > self.amount
    }
}

/// Outcome of evaluating a candidate expense against its category budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetCheck {
    pub over_budget: bool,
    /// `None` when the category has no budget
    pub budget_amount: Option<Money>,
    /// Month-to-date spend including the candidate amount
    pub spent_including_candidate: Money,
}

impl BudgetCheck {
    pub fn unbudgeted(spent: Money) -> Self {
        Self {
            over_budget: false,
            budget_amount: None,
            spent_including_candidate: spent,
        }
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Budget cap must be greater than zero (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Budget cap {} is larger than the {} limit",
                amount,
                Money::MAX_AMOUNT
            ),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
