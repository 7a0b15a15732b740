//! Category model
//!
//! Categories label transactions as one kind of income or expense. A category
//! may carry a fixed monthly commitment that is auto-posted once per month.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;
use super::transaction::TransactionType;

/// Icon tag given to categories created by the user
pub const DEFAULT_ICON: &str = "Tags";

/// Color given to categories created without one
pub const DEFAULT_COLOR: &str = "#6366f1";

/// Label shown for transactions whose category no longer exists
pub const UNKNOWN_LABEL: &str = "Unknown";
pub const UNKNOWN_COLOR: &str = "#cbd5e1";

/// A transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Icon tag used by front ends
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Display color as `#rrggbb`
    #[serde(default = "default_color")]
    pub color: String,

    /// Whether a fixed amount is posted automatically each month
    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_amount: Option<Money>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Category {
    /// Create a new category with a fresh id
    pub fn new(name: impl Into<String>, kind: TransactionType) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            icon: default_icon(),
            color: default_color(),
            is_recurring: false,
            recurring_amount: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Mark the category as a monthly commitment of `amount`
    pub fn with_recurring(mut self, amount: Money) -> Self {
        self.is_recurring = true;
        self.recurring_amount = Some(amount);
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind.is_expense()
    }

    /// The amount to auto-post each month, if the commitment is active
    ///
    /// A recurring flag without a positive amount is inert.
    pub fn recurring_commitment(&self) -> Option<Money> {
        if !self.is_recurring {
            return None;
        }
        self.recurring_amount.filter(|amount| amount.is_positive())
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        let len = name.chars().count();
        if len > 50 {
            return Err(CategoryValidationError::NameTooLong(len));
        }

        if !is_hex_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }

        if let Some(amount) = self.recurring_amount {
            if amount.is_negative() {
                return Err(CategoryValidationError::NegativeRecurringAmount);
            }
            if !amount.is_within_limit() {
                return Err(CategoryValidationError::RecurringAmountTooLarge(amount));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Built-in categories seeded into a fresh ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: TransactionType,
    pub icon: &'static str,
    pub color: &'static str,
}

impl DefaultCategory {
    pub fn all() -> &'static [DefaultCategory] {
        use TransactionType::{Expense, Income};
        const DEFAULTS: &[DefaultCategory] = &[
            DefaultCategory { id: "1", name: "Housing", kind: Expense, icon: "Home", color: "#6366f1" },
            DefaultCategory { id: "2", name: "Shopping", kind: Expense, icon: "ShoppingBag", color: "#ec4899" },
            DefaultCategory { id: "3", name: "Food & Dining", kind: Expense, icon: "Coffee", color: "#f59e0b" },
            DefaultCategory { id: "4", name: "Transport", kind: Expense, icon: "Car", color: "#3b82f6" },
            DefaultCategory { id: "5", name: "Health", kind: Expense, icon: "Heart", color: "#ef4444" },
            DefaultCategory { id: "6", name: "Entertainment", kind: Expense, icon: "Gamepad2", color: "#8b5cf6" },
            DefaultCategory { id: "7", name: "Utilities", kind: Expense, icon: "Zap", color: "#10b981" },
            DefaultCategory { id: "8", name: "Travel", kind: Expense, icon: "Plane", color: "#06b6d4" },
            DefaultCategory { id: "9", name: "Salary", kind: Income, icon: "Briefcase", color: "#22c55e" },
            DefaultCategory { id: "10", name: "Investment", kind: Income, icon: "TrendingUp", color: "#14b8a6" },
            DefaultCategory { id: "11", name: "Bonus", kind: Income, icon: "Wallet", color: "#f97316" },
        ];
        DEFAULTS
    }

    pub fn to_category(&self) -> Category {
        Category {
            id: CategoryId::from(self.id),
            name: self.name.to_string(),
            kind: self.kind,
            icon: self.icon.to_string(),
            color: self.color.to_string(),
            is_recurring: false,
            recurring_amount: None,
        }
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidColor(String),
    NegativeRecurringAmount,
    RecurringAmountTooLarge(Money),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::InvalidColor(color) => {
                write!(f, "Color must look like #rrggbb (got '{}')", color)
            }
            Self::NegativeRecurringAmount => write!(f, "Recurring amount cannot be negative"),
            Self::RecurringAmountTooLarge(amount) => write!(
                f,
                "Recurring amount {} is larger than the {} limit",
                amount,
                Money::MAX_AMOUNT
            ),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
