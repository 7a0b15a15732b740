//! Transaction model
//!
//! A transaction is a single income or expense event against one category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId};
use super::money::Money;

/// Direction of money flow, shared by transactions and categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// A recorded income or expense event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    /// Always positive; direction comes from `kind`
    pub amount: Money,

    /// May reference a category that has since been deleted
    pub category_id: CategoryId,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    #[serde(default)]
    pub note: String,

    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction with a fresh id
    pub fn new(
        amount: Money,
        category_id: CategoryId,
        kind: TransactionType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            amount,
            category_id,
            kind,
            note: String::new(),
            timestamp,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind.is_expense()
    }

    /// Amount with sign applied: positive for income, negative for expense
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }
        if !self.amount.is_within_limit() {
            return Err(TransactionValidationError::AmountTooLarge(self.amount));
        }

        if self.category_id.as_str().trim().is_empty() {
            return Err(TransactionValidationError::MissingCategory);
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format("%Y-%m-%d"),
            self.kind,
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    MissingCategory,
    TypeMismatch {
        expected: TransactionType,
        actual: TransactionType,
    },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Amount {} is larger than the {} limit",
                amount,
                Money::MAX_AMOUNT
            ),
            Self::MissingCategory => write!(f, "A category is required"),
            Self::TypeMismatch { expected, actual } => write!(
                f,
                "Category holds {} records but the record is {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let txn = Transaction::new(
            Money::from_cents(1250),
            CategoryId::from("3"),
            TransactionType::Expense,
            Utc::now(),
        )
        .with_note("Lunch");

        assert!(txn.is_expense());
        assert_eq!(txn.signed_amount().cents(), -1250);
        assert_eq!(txn.note, "Lunch");
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let txn = Transaction::new(
            Money::zero(),
            CategoryId::from("3"),
            TransactionType::Expense,
            Utc::now(),
        );
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::NonPositiveAmount(Money::zero()))
        );
    }

    #[test]
    fn test_validate_rejects_amount_past_limit() {
        let at_limit = Transaction::new(
            Money::MAX_AMOUNT,
            CategoryId::from("3"),
            TransactionType::Expense,
            Utc::now(),
        );
        assert!(at_limit.validate().is_ok());

        let huge = Money::from_cents(5_000_000_000_000_000_000);
        let txn = Transaction::new(huge, CategoryId::from("3"), TransactionType::Expense, Utc::now());
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::AmountTooLarge(huge))
        );
    }

    #[test]
    fn test_validate_rejects_blank_category() {
        let txn = Transaction::new(
            Money::from_cents(100),
            CategoryId::from(""),
            TransactionType::Income,
            Utc::now(),
        );
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::MissingCategory)
        );
    }

    #[test]
    fn test_type_parse() {
        assert_eq!("Income".parse::<TransactionType>(), Ok(TransactionType::Income));
        assert_eq!("expense".parse::<TransactionType>(), Ok(TransactionType::Expense));
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_serialization_uses_type_field() {
        let txn = Transaction::new(
            Money::from_cents(500),
            CategoryId::from("9"),
            TransactionType::Income,
            Utc::now(),
        );
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["amount"], 500);

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, txn);
    }
}
