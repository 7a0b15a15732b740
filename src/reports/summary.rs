//! Period Summary Report
//!
//! Income/expense totals for a selected window, a comparison against the
//! previous month (month selections only), and the top expense categories.

use std::collections::HashMap;

use crate::display::report::{format_bar, format_change, format_percentage, truncate};
use crate::models::category::{UNKNOWN_COLOR, UNKNOWN_LABEL};
use crate::models::{Money, MonthPeriod, PeriodSelection, Transaction, TransactionType};
use crate::services::period::select;
use crate::storage::Storage;

/// Income, expense and their difference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

impl Totals {
    pub fn of<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut totals = Self::default();
        for txn in transactions {
            match txn.kind {
                TransactionType::Income => totals.income += txn.amount,
                TransactionType::Expense => totals.expense += txn.amount,
            }
        }
        totals.balance = totals.income - totals.expense;
        totals
    }
}

/// Change of one figure against the previous period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub diff: Money,
    pub pct: f64,
}

impl Change {
    /// Safe against a zero previous value: growth from nothing counts as 100%
    pub fn between(current: Money, previous: Money) -> Self {
        let diff = current - previous;
        let pct = if previous.is_zero() {
            if current.is_positive() {
                100.0
            } else {
                0.0
            }
        } else {
            diff.cents() as f64 / previous.abs().cents() as f64 * 100.0
        };
        Self { diff, pct }
    }
}

/// The selected month against the one before it
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub previous_month: MonthPeriod,
    pub previous: Totals,
    pub income: Change,
    pub expense: Change,
    pub balance: Change,
}

impl Comparison {
    pub fn between(current: &Totals, previous_month: MonthPeriod, previous: Totals) -> Self {
        Self {
            previous_month,
            income: Change::between(current.income, previous.income),
            expense: Change::between(current.expense, previous.expense),
            balance: Change::between(current.balance, previous.balance),
            previous,
        }
    }
}

/// Spending under one category name
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    pub name: String,
    pub color: String,
    pub total: Money,
    pub count: usize,
    /// Share of the window's total expense
    pub percentage: f64,
}

/// Group expenses by resolved category name, largest first, at most `limit` rows
///
/// Records whose category no longer exists are grouped under "Unknown".
pub fn top_categories(storage: &Storage, expenses: &[&Transaction], limit: usize) -> Vec<CategorySpending> {
    let mut groups: HashMap<String, CategorySpending> = HashMap::new();
    let mut total_expense = Money::zero();

    for txn in expenses.iter().filter(|t| t.is_expense()) {
        let (name, color) = match storage.categories.get(&txn.category_id) {
            Some(category) => (category.name.clone(), category.color.clone()),
            None => (UNKNOWN_LABEL.to_string(), UNKNOWN_COLOR.to_string()),
        };
        let entry = groups.entry(name.clone()).or_insert_with(|| CategorySpending {
            name,
            color,
            total: Money::zero(),
            count: 0,
            percentage: 0.0,
        });
        entry.total += txn.amount;
        entry.count += 1;
        total_expense += txn.amount;
    }

    let mut rows: Vec<CategorySpending> = groups.into_values().collect();
    for row in &mut rows {
        row.percentage = if total_expense.is_zero() {
            0.0
        } else {
            row.total.cents() as f64 / total_expense.cents() as f64 * 100.0
        };
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    rows.truncate(limit);
    rows
}

/// Summary Report
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub selection: PeriodSelection,
    pub totals: Totals,
    /// `None` for explicit date ranges
    pub comparison: Option<Comparison>,
    pub top_categories: Vec<CategorySpending>,
    pub transaction_count: usize,
}

impl SummaryReport {
    /// Generate the summary for a window
    pub fn generate(storage: &Storage, selection: &PeriodSelection, limit: usize) -> Self {
        let all = storage.transactions.all();
        let selected = select(all, selection);
        let totals = Totals::of(selected.iter().copied());

        let comparison = selection.month().map(|month| {
            let previous_month = month.prev();
            let previous = Totals::of(select(all, &PeriodSelection::Month(previous_month)));
            Comparison::between(&totals, previous_month, previous)
        });

        Self {
            selection: selection.clone(),
            totals,
            comparison,
            top_categories: top_categories(storage, &selected, limit),
            transaction_count: selected.len(),
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Summary: {}\n", self.selection));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        let rows = [
            ("Income", self.totals.income, self.comparison.as_ref().map(|c| c.income)),
            ("Expense", self.totals.expense, self.comparison.as_ref().map(|c| c.expense)),
            ("Balance", self.totals.balance, self.comparison.as_ref().map(|c| c.balance)),
        ];
        for (label, amount, change) in rows {
            let change = change
                .map(|c| format!("  {}", format_change(&c)))
                .unwrap_or_default();
            output.push_str(&format!("{:<10} {:>14}{}\n", label, amount.to_string(), change));
        }

        if let Some(comparison) = &self.comparison {
            output.push_str(&format!("(compared with {})\n", comparison.previous_month));
        }
        output.push_str(&format!("Records: {}\n", self.transaction_count));

        if self.top_categories.is_empty() {
            output.push_str("\nNo spending in this period.\n");
            return output;
        }

        output.push_str(&format!(
            "\n{:<24} {:>12} {:>6} {:>7}  {}\n",
            "Category", "Spent", "Count", "%", "Share"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');
        for row in &self.top_categories {
            output.push_str(&format!(
                "{:<24} {:>12} {:>6} {:>7}  {}\n",
                truncate(&row.name, 24),
                row.total.to_string(),
                row.count,
                format_percentage(row.percentage),
                format_bar(row.percentage, 100.0, 16)
            ));
        }

        output
    }
}
