//! Category display formatting
//!
//! Formats categories for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Budget, Category};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Monthly")]
    recurring: String,
}

/// Format categories as a table, with each one's cap and commitment
pub fn format_category_list(categories: &[Category], budgets: &[Budget]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'tally init' to create default categories.\n"
            .to_string();
    }

    let rows = categories.iter().map(|category| CategoryRow {
        id: category.id.to_string(),
        name: category.name.clone(),
        kind: category.kind.to_string(),
        color: category.color.clone(),
        budget: budgets
            .iter()
            .find(|b| b.category_id == category.id)
            .map(|b| b.amount.to_string())
            .unwrap_or_default(),
        recurring: category
            .recurring_commitment()
            .map(|m| m.to_string())
            .unwrap_or_default(),
    });

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    format!("{}\n", table)
}

/// Format category details for display
pub fn format_category_details(category: &Category, budget: Option<&Budget>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:    {}\n", category.id));
    output.push_str(&format!("  Type:  {}\n", category.kind));
    output.push_str(&format!("  Icon:  {}\n", category.icon));
    output.push_str(&format!("  Color: {}\n", category.color));

    if let Some(budget) = budget {
        output.push_str(&format!("  Budget: {} per month\n", budget.amount));
    }

    match category.recurring_commitment() {
        Some(amount) => output.push_str(&format!("  Recurring: {} on the 1st\n", amount)),
        None if category.is_recurring => output.push_str("  Recurring: (no amount set)\n"),
        None => {}
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, TransactionType};

    #[test]
    fn test_format_empty_list() {
        let output = format_category_list(&[], &[]);
        assert!(output.contains("No categories found"));
    }

    #[test]
    fn test_format_category_list() {
        let rent = Category::new("Rent", TransactionType::Expense).with_recurring(Money::from_cents(120_000));
        let budget = Budget::new(rent.id.clone(), Money::from_cents(150_000));

        let output = format_category_list(&[rent], &[budget]);
        assert!(output.contains("Rent"));
        assert!(output.contains("$1500.00"));
        assert!(output.contains("$1200.00"));
    }

    #[test]
    fn test_format_details_with_inert_commitment() {
        let mut gym = Category::new("Gym", TransactionType::Expense);
        gym.is_recurring = true;

        let output = format_category_details(&gym, None);
        assert!(output.contains("(no amount set)"));
        assert!(!output.contains("Budget:"));
    }
}
