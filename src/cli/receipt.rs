//! Receipt CLI commands
//!
//! Scan a receipt image, review the extracted items, and post them.

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::Local;
use clap::Subcommand;
use tracing::debug;

use crate::config::settings::Settings;
use crate::display::format_draft;
use crate::error::{TallyError, TallyResult};
use crate::extraction::{
    mime_type_for, spawn_extraction, CommandExtractor, ExtractionRequest, PendingExtraction,
    ResponseFileExtractor,
};
use crate::models::{Money, TransactionType};
use crate::notify::NotificationSink;
use crate::services::period::parse_date;
use crate::services::{CategoryService, ReconciliationDraft, ReconciliationService};
use crate::storage::Storage;

use super::parse_amount;

/// Receipt subcommands
#[derive(Subcommand)]
pub enum ReceiptCommands {
    /// Extract line items from a receipt image
    Scan {
        /// Path to the receipt image
        image: PathBuf,
        /// Use this date for every item instead of the receipt's (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Image mime type, guessed from the extension by default
        #[arg(long)]
        mime: Option<String>,
        /// Read a saved extractor response instead of running the extractor
        #[arg(long)]
        response: Option<PathBuf>,
        /// Drop item N (1-based, as first shown); repeatable
        #[arg(long, value_name = "N")]
        drop: Vec<usize>,
        /// Set an item's amount, as N=AMOUNT; repeatable
        #[arg(long, value_name = "N=AMOUNT")]
        amount: Vec<String>,
        /// Set an item's category, as N=CATEGORY; repeatable
        #[arg(long, value_name = "N=CATEGORY")]
        category: Vec<String>,
        /// Set an item's note, as N=TEXT; repeatable
        #[arg(long, value_name = "N=TEXT")]
        note: Vec<String>,
        /// Post the items; without this the draft is only shown
        #[arg(short, long)]
        yes: bool,
    },
}

/// Handle a receipt command
pub fn handle_receipt_command(
    storage: &mut Storage,
    settings: &Settings,
    sink: &dyn NotificationSink,
    cmd: ReceiptCommands,
) -> TallyResult<()> {
    match cmd {
        ReceiptCommands::Scan {
            image,
            date,
            mime,
            response,
            drop: dropped,
            amount,
            category,
            note,
            yes,
        } => {
            let override_date = date.as_deref().map(parse_date).transpose()?;

            let bytes = std::fs::read(&image).map_err(|e| {
                TallyError::Io(format!("Failed to read {}: {}", image.display(), e))
            })?;
            let mime = mime.unwrap_or_else(|| mime_type_for(&image).to_string());
            let request = ExtractionRequest::new(bytes, mime, storage.categories.expense_categories());

            let pending = match response {
                Some(path) => spawn_extraction(ResponseFileExtractor::new(path), request),
                None => {
                    let command = settings.extractor_command.as_deref().ok_or_else(|| {
                        TallyError::Config(
                            "No receipt extractor configured. Set extractor_command in config.json or pass --response".into(),
                        )
                    })?;
                    spawn_extraction(CommandExtractor::from_command_line(command)?, request)
                }
            };
            let result = wait_with_progress(pending);

            let today = Local::now().date_naive();
            let Some(mut draft) = ReconciliationService::new(storage, sink).receive(result, today)
            else {
                return Ok(());
            };

            if let Some(d) = override_date {
                draft.set_date(d);
            }
            apply_edits(storage, sink, &mut draft, &amount, &category, &note)?;
            drop_items(&mut draft, dropped)?;

            let expense: Vec<_> = storage.categories.expense_categories().cloned().collect();
            print!("{}", format_draft(&draft, &expense));

            if !yes {
                println!();
                println!("Use --yes to post these items");
                return Ok(());
            }

            let posted = ReconciliationService::new(storage, sink).commit(draft)?;
            let total: Money = posted.iter().map(|t| t.amount).sum();
            println!("Posted {} items totalling {}", posted.len(), total);
        }
    }

    Ok(())
}

/// Poll the worker, printing a dot to stderr while it runs
fn wait_with_progress(mut pending: PendingExtraction) -> TallyResult<crate::extraction::RawExtraction> {
    let mut waited = false;
    loop {
        if let Some(result) = pending.try_take() {
            if waited {
                eprintln!();
            }
            return result;
        }
        if !waited {
            eprint!("Reading receipt");
            waited = true;
        }
        eprint!(".");
        let _ = std::io::stderr().flush();
        thread::sleep(Duration::from_millis(200));
    }
}

/// Split "N=VALUE" into a 0-based index and the value
fn parse_edit(edit: &str) -> TallyResult<(usize, &str)> {
    let (index, value) = edit
        .split_once('=')
        .ok_or_else(|| TallyError::Validation(format!("Expected N=VALUE, got '{}'", edit)))?;
    let index: usize = index
        .trim()
        .parse()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| TallyError::Validation(format!("Invalid item number in '{}'", edit)))?;
    Ok((index - 1, value.trim()))
}

fn apply_edits(
    storage: &mut Storage,
    sink: &dyn NotificationSink,
    draft: &mut ReconciliationDraft,
    amounts: &[String],
    categories: &[String],
    notes: &[String],
) -> TallyResult<()> {
    for edit in amounts {
        let (index, value) = parse_edit(edit)?;
        draft.set_amount(index, parse_amount(value)?)?;
    }
    for edit in categories {
        let (index, value) = parse_edit(edit)?;
        let category = CategoryService::new(storage, sink).find(value)?.clone();
        if category.kind != TransactionType::Expense {
            return Err(TallyError::Validation(format!(
                "'{}' is not an expense category",
                category.name
            )));
        }
        draft.set_category(index, category.id)?;
    }
    for edit in notes {
        let (index, value) = parse_edit(edit)?;
        draft.set_note(index, value)?;
    }
    Ok(())
}

/// Remove items by 1-based number, highest first so numbers stay stable
fn drop_items(draft: &mut ReconciliationDraft, mut numbers: Vec<usize>) -> TallyResult<()> {
    numbers.sort_unstable();
    numbers.dedup();
    for number in numbers.into_iter().rev() {
        let index = number
            .checked_sub(1)
            .ok_or_else(|| TallyError::Validation("Item numbers start at 1".into()))?;
        let removed = draft.remove_item(index)?;
        debug!(item = number, note = %removed.note, "dropped draft item");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryId;
    use crate::services::DraftItem;
    use chrono::NaiveDate;

    fn draft(n: usize) -> ReconciliationDraft {
        ReconciliationDraft::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            (0..n)
                .map(|i| DraftItem::new(Money::from_cents(100), format!("item {}", i + 1), Some(CategoryId::from("3"))))
                .collect(),
        )
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(parse_edit("2=12.50").unwrap(), (1, "12.50"));
        assert!(parse_edit("0=1").is_err());
        assert!(parse_edit("12.50").is_err());
    }

    #[test]
    fn test_drop_items_keeps_numbering_stable() {
        let mut d = draft(4);
        drop_items(&mut d, vec![1, 3, 3]).unwrap();
        let notes: Vec<_> = d.items().iter().map(|i| i.note.as_str()).collect();
        assert_eq!(notes, vec!["item 2", "item 4"]);

        assert!(drop_items(&mut d, vec![0]).is_err());
        assert!(drop_items(&mut d, vec![9]).is_err());
    }
}
