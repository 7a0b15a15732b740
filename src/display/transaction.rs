//! Transaction display formatting
//!
//! Register table and detail view for ledger records.

use std::fmt::Write;

use chrono::Local;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::category::UNKNOWN_LABEL;
use crate::models::{Category, Transaction, TransactionType};

use super::report::truncate;

#[derive(Tabled)]
struct RegisterRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Note")]
    note: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn category_name<'a>(categories: &'a [Category], txn: &Transaction) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == txn.category_id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_LABEL)
}

fn signed(txn: &Transaction) -> String {
    match txn.kind {
        TransactionType::Income => format!("+{}", txn.amount),
        TransactionType::Expense => format!("-{}", txn.amount),
    }
}

/// Format a list of transactions as a register, newest first as given
pub fn format_transaction_register(
    transactions: &[Transaction],
    categories: &[Category],
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().map(|txn| RegisterRow {
        id: short_id(txn),
        date: local_date(txn, date_format),
        category: category_name(categories, txn).to_string(),
        note: truncate(&txn.note, 32),
        amount: signed(txn),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .modify(Columns::last(), Alignment::right());
    format!("{}\n", table)
}

/// Render the local date, falling back to ISO for a broken format string
fn local_date(txn: &Transaction, date_format: &str) -> String {
    let local = txn.timestamp.with_timezone(&Local);
    let mut out = String::new();
    if write!(out, "{}", local.format(date_format)).is_err() {
        return local.format("%Y-%m-%d").to_string();
    }
    out
}

/// First segment of a random id, or the whole id for auto-posts
fn short_id(txn: &Transaction) -> String {
    if txn.id.is_auto_post() {
        return txn.id.to_string();
    }
    txn.id.as_str().chars().take(8).collect()
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, categories: &[Category]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!(
        "Date:        {}\n",
        txn.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("Amount:      {}\n", txn.amount));
    output.push_str(&format!("Category:    {}\n", category_name(categories, txn)));

    if !txn.note.is_empty() {
        output.push_str(&format!("Note:        {}\n", txn.note));
    }

    if txn.id.is_auto_post() {
        output.push_str("Source:      recurring commitment\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, Money};
    use chrono::Utc;

    fn lunch() -> (Transaction, Vec<Category>) {
        let food = Category::new("Food", TransactionType::Expense);
        let txn = Transaction::new(
            Money::from_cents(1_250),
            food.id.clone(),
            TransactionType::Expense,
            Utc::now(),
        )
        .with_note("Lunch");
        (txn, vec![food])
    }

    #[test]
    fn test_format_register() {
        let (txn, categories) = lunch();
        let output = format_transaction_register(&[txn], &categories, "%Y-%m-%d");
        assert!(output.contains("Food"));
        assert!(output.contains("Lunch"));
        assert!(output.contains("-$12.50"));
    }

    #[test]
    fn test_bad_date_format_falls_back() {
        let (txn, categories) = lunch();
        let output = format_transaction_register(&[txn], &categories, "%Q");
        assert!(output.contains("Lunch"));
    }

    #[test]
    fn test_format_empty_register() {
        let output = format_transaction_register(&[], &[], "%Y-%m-%d");
        assert!(output.contains("No transactions"));
    }

    #[test]
    fn test_orphaned_record_shows_unknown() {
        let (mut txn, categories) = lunch();
        txn.category_id = CategoryId::from("gone");
        let output = format_transaction_details(&txn, &categories);
        assert!(output.contains("Category:    Unknown"));
        assert!(output.contains("Note:        Lunch"));
    }
}
