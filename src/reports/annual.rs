//! Annual Report
//!
//! Month-by-month income, expense and savings for one calendar year.

use std::collections::BTreeSet;

use chrono::{Datelike, Local};

use crate::models::period::local_date_of;
use crate::models::{Money, MonthPeriod, PeriodSelection, Transaction};
use crate::services::period::select;
use crate::storage::Storage;

use super::summary::Totals;

/// One month of the year
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRow {
    pub month: MonthPeriod,
    pub income: Money,
    pub expense: Money,
    pub savings: Money,
}

#[derive(Debug, Clone)]
pub struct AnnualReport {
    pub year: i32,
    pub months: Vec<MonthRow>,
    pub totals: Totals,
}

impl AnnualReport {
    pub fn generate(storage: &Storage, year: i32) -> Self {
        let all = storage.transactions.all();

        let months: Vec<MonthRow> = (1..=12)
            .filter_map(|m| MonthPeriod::new(year, m).ok())
            .map(|month| {
                let totals = Totals::of(select(all, &PeriodSelection::Month(month)));
                MonthRow {
                    month,
                    income: totals.income,
                    expense: totals.expense,
                    savings: totals.balance,
                }
            })
            .collect();

        let income: Money = months.iter().map(|m| m.income).sum();
        let expense: Money = months.iter().map(|m| m.expense).sum();

        Self {
            year,
            months,
            totals: Totals {
                income,
                expense,
                balance: income - expense,
            },
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Annual Report: {}\n", self.year));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<16} {:>14} {:>14} {:>14}\n",
            "Month", "Income", "Expense", "Savings"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for row in &self.months {
            output.push_str(&format!(
                "{:<16} {:>14} {:>14} {:>14}\n",
                row.month.long_name(),
                row.income.to_string(),
                row.expense.to_string(),
                row.savings.to_string()
            ));
        }

        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<16} {:>14} {:>14} {:>14}\n",
            "TOTAL",
            self.totals.income.to_string(),
            self.totals.expense.to_string(),
            self.totals.balance.to_string()
        ));

        output
    }
}

/// Years worth offering in a year picker, newest first
///
/// Always spans at least last year through two years ahead, widened to
/// cover every recorded transaction.
pub fn available_years(transactions: &[Transaction], current_year: i32) -> Vec<i32> {
    let recorded: BTreeSet<i32> = transactions
        .iter()
        .map(|t| local_date_of(&t.timestamp).year())
        .collect();

    let first = recorded
        .first()
        .map_or(current_year - 1, |&y| y.min(current_year - 1));
    let last = recorded
        .last()
        .map_or(current_year + 2, |&y| y.max(current_year + 2));

    (first..=last).rev().collect()
}

/// [`available_years`] relative to the local clock
pub fn available_years_now(transactions: &[Transaction]) -> Vec<i32> {
    available_years(transactions, Local::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TallyPaths};
    use crate::models::period::at_local_time;
    use crate::models::{CategoryId, TransactionType};
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    fn on(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        at_local_time(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        )
    }

    fn txn(category: &str, kind: TransactionType, cents: i64, at: DateTime<Utc>) -> Transaction {
        Transaction::new(Money::from_cents(cents), CategoryId::from(category), kind, at)
    }

    #[test]
    fn test_annual_report() {
        let (_temp_dir, mut storage) = create_test_storage();
        storage.transactions.insert(txn("9", TransactionType::Income, 300_000, on(2024, 1, 1)));
        storage.transactions.insert(txn("1", TransactionType::Expense, 120_000, on(2024, 1, 1)));
        storage.transactions.insert(txn("3", TransactionType::Expense, 5_000, on(2024, 12, 31)));
        storage.transactions.insert(txn("3", TransactionType::Expense, 9_999, on(2023, 12, 31)));

        let report = AnnualReport::generate(&storage, 2024);
        assert_eq!(report.months.len(), 12);
        assert_eq!(report.months[0].savings.cents(), 180_000);
        assert_eq!(report.months[11].savings.cents(), -5_000);
        assert!(report.months[5].income.is_zero());
        assert_eq!(report.totals.expense.cents(), 125_000);
        assert_eq!(report.totals.balance.cents(), 175_000);
        assert!(report.format_terminal().contains("December"));
    }

    #[test]
    fn test_available_years() {
        assert_eq!(available_years(&[], 2024), vec![2026, 2025, 2024, 2023]);

        let old = txn("3", TransactionType::Expense, 100, on(2019, 6, 1));
        let future = txn("3", TransactionType::Expense, 100, on(2030, 6, 1));
        let years = available_years(&[old, future], 2024);
        assert_eq!(years.first(), Some(&2030));
        assert_eq!(years.last(), Some(&2019));
        assert_eq!(years.len(), 12);
    }
}
