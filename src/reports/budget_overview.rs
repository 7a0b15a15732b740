//! Budget Overview Report
//!
//! Spend against each category's monthly cap for a selected window.

use crate::models::{CategoryId, Money, PeriodSelection};
use crate::services::period::select;
use crate::storage::Storage;

/// A row in the budget report for a single category
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgressRow {
    pub category_id: CategoryId,
    pub category_name: String,
    pub color: String,
    pub budgeted: Money,
    pub spent: Money,
    /// Negative once the cap is exceeded
    pub remaining: Money,
    pub percent_used: f64,
}

impl BudgetProgressRow {
    /// Spending strictly above the cap
    pub fn is_over(&self) -> bool {
        self.spent > self.budgeted
    }
}

/// Budget Overview Report
#[derive(Debug, Clone)]
pub struct BudgetOverviewReport {
    pub selection: PeriodSelection,
    pub rows: Vec<BudgetProgressRow>,
    pub total_budgeted: Money,
    pub total_spent: Money,
}

impl BudgetOverviewReport {
    /// One row per expense category that has a cap, in category order
    pub fn generate(storage: &Storage, selection: &PeriodSelection) -> Self {
        let selected = select(storage.transactions.all(), selection);

        let rows: Vec<BudgetProgressRow> = storage
            .categories
            .expense_categories()
            .filter_map(|category| {
                let budget = storage.budgets.get(&category.id)?;
                let spent: Money = selected
                    .iter()
                    .filter(|t| t.is_expense() && t.category_id == category.id)
                    .map(|t| t.amount)
                    .sum();
                let percent_used = if budget.amount.is_zero() {
                    0.0
                } else {
                    spent.cents() as f64 / budget.amount.cents() as f64 * 100.0
                };

                Some(BudgetProgressRow {
                    category_id: category.id.clone(),
                    category_name: category.name.clone(),
                    color: category.color.clone(),
                    budgeted: budget.amount,
                    spent,
                    remaining: budget.amount - spent,
                    percent_used,
                })
            })
            .collect();

        Self {
            selection: selection.clone(),
            total_budgeted: rows.iter().map(|r| r.budgeted).sum(),
            total_spent: rows.iter().map(|r| r.spent).sum(),
            rows,
        }
    }

    pub fn over_budget(&self) -> impl Iterator<Item = &BudgetProgressRow> {
        self.rows.iter().filter(|r| r.is_over())
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Budget Overview - {}\n", self.selection));
        output.push_str(&"=".repeat(72));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("No budgets set.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<26} {:>12} {:>12} {:>12} {:>6}\n",
            "Category", "Budgeted", "Spent", "Remaining", "Used"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.rows {
            let remaining = if row.is_over() {
                format!("{} *", row.remaining)
            } else {
                row.remaining.to_string()
            };
            output.push_str(&format!(
                "{:<26} {:>12} {:>12} {:>12} {:>5.0}%\n",
                row.category_name,
                row.budgeted.to_string(),
                row.spent.to_string(),
                remaining,
                row.percent_used
            ));
        }

        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<26} {:>12} {:>12} {:>12}\n",
            "TOTAL",
            self.total_budgeted.to_string(),
            self.total_spent.to_string(),
            (self.total_budgeted - self.total_spent).to_string()
        ));

        if self.over_budget().next().is_some() {
            output.push_str("\n* = Over budget\n");
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TallyPaths};
    use crate::models::period::at_local_time;
    use crate::models::{Budget, MonthPeriod, Transaction, TransactionType};
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    fn spend(storage: &mut Storage, category: &str, cents: i64, day: u32) {
        storage.transactions.insert(Transaction::new(
            Money::from_cents(cents),
            CategoryId::from(category),
            TransactionType::Expense,
            at_local_time(
                NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            ),
        ));
    }

    #[test]
    fn test_budget_progress() {
        let (_temp_dir, mut storage) = create_test_storage();
        storage
            .budgets
            .upsert(Budget::new(CategoryId::from("3"), Money::from_cents(10_000)));
        spend(&mut storage, "3", 10_000, 2);
        spend(&mut storage, "4", 60_000, 3);

        let march = PeriodSelection::Month(MonthPeriod::new(2024, 3).unwrap());
        let report = BudgetOverviewReport::generate(&storage, &march);

        // Eight seeded expense caps
        assert_eq!(report.rows.len(), 8);

        let food = report.rows.iter().find(|r| r.category_id.as_str() == "3").unwrap();
        assert!(!food.is_over());
        assert_eq!(food.percent_used, 100.0);
        assert!(food.remaining.is_zero());

        let transport = report.rows.iter().find(|r| r.category_id.as_str() == "4").unwrap();
        assert!(transport.is_over());
        assert_eq!(transport.remaining.cents(), -10_000);
        assert_eq!(report.over_budget().count(), 1);
        assert!(report.format_terminal().contains("* = Over budget"));
    }
}
