//! Receipt draft display

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Category;
use crate::services::ReconciliationDraft;

#[derive(Tabled)]
struct DraftRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Note")]
    note: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Numbered item table for review before committing
pub fn format_draft(draft: &ReconciliationDraft, categories: &[Category]) -> String {
    let mut output = format!("Receipt dated {}\n", draft.date());

    if draft.is_empty() {
        output.push_str("No items were found on the receipt.\n");
        return output;
    }

    let rows = draft.items().iter().enumerate().map(|(i, item)| DraftRow {
        index: i + 1,
        note: item.note.clone(),
        category: item
            .category_id
            .as_ref()
            .and_then(|id| categories.iter().find(|c| &c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "(choose one)".to_string()),
        amount: item.amount.to_string(),
    });

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    output.push_str(&format!("{}\n", table));
    output.push_str(&format!("Total: {}\n", draft.total()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, TransactionType};
    use crate::services::DraftItem;
    use chrono::NaiveDate;

    #[test]
    fn test_format_draft() {
        let food = Category::new("Food", TransactionType::Expense);
        let draft = ReconciliationDraft::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            vec![
                DraftItem::new(Money::from_cents(450), "Tea", Some(food.id.clone())),
                DraftItem::new(Money::zero(), "", None),
            ],
        );

        let output = format_draft(&draft, &[food]);
        assert!(output.contains("Receipt dated 2024-03-05"));
        assert!(output.contains("Food"));
        assert!(output.contains("(choose one)"));
        assert!(output.contains("Total: $4.50"));
    }
}
