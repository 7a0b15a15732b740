//! Receipt reconciliation
//!
//! Turns an untrusted extraction response into an editable draft, then
//! commits the draft as a batch of expense transactions. Nothing is written
//! until `commit`, and `commit` writes either every item or none.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{TallyError, TallyResult};
use crate::extraction::{RawExtraction, RawItem};
use crate::models::period::at_local_time;
use crate::models::{Category, CategoryId, Money, Transaction, TransactionType};
use crate::notify::NotificationSink;
use crate::storage::Storage;

use super::transaction::{CreateTransactionInput, TransactionService};

/// Local wall-clock time scanned items are stamped with
const ITEM_HOUR: u32 = 12;

/// One editable line of a draft
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub amount: Money,
    pub note: String,
    /// `None` when no expense category was available to fall back on
    pub category_id: Option<CategoryId>,
}

impl DraftItem {
    pub fn new(amount: Money, note: impl Into<String>, category_id: Option<CategoryId>) -> Self {
        Self {
            amount,
            note: note.into(),
            category_id,
        }
    }
}

/// Extracted items waiting for review
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationDraft {
    date: NaiveDate,
    items: Vec<DraftItem>,
}

impl ReconciliationDraft {
    pub fn new(date: NaiveDate, items: Vec<DraftItem>) -> Self {
        Self { date, items }
    }

    /// Clean up an extractor response
    ///
    /// Missing or unreadable dates fall back to `today`, times are dropped,
    /// bad amounts become zero and unknown categories fall back to the first
    /// expense category.
    pub fn normalize(raw: RawExtraction, expense_categories: &[Category], today: NaiveDate) -> Self {
        let date = match raw.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(text) => parse_receipt_date(text).unwrap_or_else(|| {
                warn!(date = text, "unreadable receipt date, using today");
                today
            }),
        };

        let fallback = expense_categories.first().map(|c| c.id.clone());
        let items = raw
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| normalize_item(item, expense_categories, fallback.as_ref()))
            .collect();

        Self { date, items }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_amount(&mut self, index: usize, amount: Money) -> TallyResult<()> {
        self.item_mut(index)?.amount = amount;
        Ok(())
    }

    pub fn set_note(&mut self, index: usize, note: impl Into<String>) -> TallyResult<()> {
        self.item_mut(index)?.note = note.into();
        Ok(())
    }

    pub fn set_category(&mut self, index: usize, category_id: CategoryId) -> TallyResult<()> {
        self.item_mut(index)?.category_id = Some(category_id);
        Ok(())
    }

    pub fn add_item(&mut self, item: DraftItem) {
        self.items.push(item);
    }

    pub fn remove_item(&mut self, index: usize) -> TallyResult<DraftItem> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// The instant every committed item is stamped with
    pub fn timestamp(&self) -> DateTime<Utc> {
        at_local_time(
            self.date,
            NaiveTime::from_hms_opt(ITEM_HOUR, 0, 0).unwrap_or(NaiveTime::MIN),
        )
    }

    fn item_mut(&mut self, index: usize) -> TallyResult<&mut DraftItem> {
        self.check_index(index)?;
        Ok(&mut self.items[index])
    }

    fn check_index(&self, index: usize) -> TallyResult<()> {
        if index >= self.items.len() {
            return Err(TallyError::Validation(format!(
                "No item {} (the draft has {})",
                index + 1,
                self.items.len()
            )));
        }
        Ok(())
    }
}

/// Accepts `2024-03-05`, `2024-03-05T10:00:00Z` and `2024-03-05 10:00`
fn parse_receipt_date(text: &str) -> Option<NaiveDate> {
    let day = text.split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn normalize_item(
    item: RawItem,
    expense_categories: &[Category],
    fallback: Option<&CategoryId>,
) -> DraftItem {
    let amount = item
        .amount
        .as_ref()
        .and_then(amount_from_json)
        .filter(|m| !m.is_negative())
        .unwrap_or_else(Money::zero);

    let category_id = item
        .category_id
        .map(|id| CategoryId::from(id.trim()))
        .filter(|id| expense_categories.iter().any(|c| &c.id == id))
        .or_else(|| fallback.cloned());

    DraftItem {
        amount,
        note: item.note.map(|n| n.trim().to_string()).unwrap_or_default(),
        category_id,
    }
}

fn amount_from_json(value: &serde_json::Value) -> Option<Money> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().and_then(Money::from_decimal),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().and_then(Money::from_decimal),
        _ => None,
    }
}

/// Builds drafts from extraction results and commits them
pub struct ReconciliationService<'a> {
    storage: &'a mut Storage,
    sink: &'a dyn NotificationSink,
}

impl<'a> ReconciliationService<'a> {
    pub fn new(storage: &'a mut Storage, sink: &'a dyn NotificationSink) -> Self {
        Self { storage, sink }
    }

    pub fn start_draft(&self, raw: RawExtraction, today: NaiveDate) -> ReconciliationDraft {
        let expense: Vec<Category> = self.storage.categories.expense_categories().cloned().collect();
        let draft = ReconciliationDraft::normalize(raw, &expense, today);
        debug!(items = draft.len(), date = %draft.date(), "receipt draft ready");
        draft
    }

    /// Take an extraction result; a failure becomes one warning and no draft
    pub fn receive(
        &self,
        result: TallyResult<RawExtraction>,
        today: NaiveDate,
    ) -> Option<ReconciliationDraft> {
        match result {
            Ok(raw) => Some(self.start_draft(raw, today)),
            Err(e) => {
                warn!(error = %e, "receipt extraction failed");
                self.sink
                    .warn(&format!("Could not read the receipt: {}", reason(&e)));
                None
            }
        }
    }

    /// Write every draft item as an expense
    ///
    /// All items are validated first; one bad item rejects the whole batch.
    /// The batch is saved in one write, so a failed save posts nothing.
    pub fn commit(&mut self, draft: ReconciliationDraft) -> TallyResult<Vec<Transaction>> {
        if draft.is_empty() {
            return Err(TallyError::Reconciliation("Nothing to post: the draft is empty".into()));
        }

        let timestamp = draft.timestamp();
        let mut prepared = Vec::with_capacity(draft.len());
        {
            let service = TransactionService::new(self.storage, self.sink);
            for (index, item) in draft.items.into_iter().enumerate() {
                let category_id = item.category_id.ok_or_else(|| {
                    TallyError::Reconciliation(format!("Item {}: no category selected", index + 1))
                })?;
                let txn = service
                    .prepare(CreateTransactionInput {
                        amount: item.amount,
                        category_id,
                        kind: TransactionType::Expense,
                        note: Some(item.note),
                        timestamp,
                    })
                    .map_err(|e| {
                        TallyError::Reconciliation(format!("Item {}: {}", index + 1, reason(&e)))
                    })?;
                prepared.push(txn);
            }
        }

        let posted = TransactionService::new(self.storage, self.sink).commit_batch(prepared)?;

        info!(count = posted.len(), date = %draft.date, "scanned items posted");
        self.sink
            .info(&format!("Posted {} scanned items", posted.len()));
        Ok(posted)
    }
}

/// The message of an error without its category prefix
fn reason(error: &TallyError) -> String {
    match error {
        TallyError::Validation(msg)
        | TallyError::Extraction(msg)
        | TallyError::Reconciliation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TallyPaths};
    use crate::models::period::local_date_of;
    use crate::models::Budget;
    use crate::notify::{MemorySink, Severity};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn raw(json: &str) -> RawExtraction {
        RawExtraction::from_json(json).unwrap()
    }

    #[test]
    fn test_batch_lands_on_receipt_date() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let mut service = ReconciliationService::new(&mut storage, &sink);

        let draft = service.start_draft(
            raw(r#"{"date": "2024-03-05", "items": [
                {"amount": 12.5, "note": "Bread", "categoryId": "3"},
                {"amount": 4, "note": "Bus", "categoryId": "4"},
                {"amount": 30.99, "note": "Shirt", "categoryId": "2"}
            ]}"#),
            today(),
        );
        let posted = service.commit(draft).unwrap();

        assert_eq!(posted.len(), 3);
        let march_5 = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for txn in &posted {
            assert_eq!(txn.kind, TransactionType::Expense);
            assert_eq!(local_date_of(&txn.timestamp), march_5);
        }
        let summary: Vec<_> = posted
            .iter()
            .map(|t| (t.category_id.as_str(), t.amount.cents()))
            .collect();
        assert_eq!(summary, vec![("3", 1_250), ("4", 400), ("2", 3_099)]);
        assert_eq!(sink.messages(), vec!["Posted 3 scanned items"]);
        assert_eq!(storage.transactions.len(), 3);
    }

    #[test]
    fn test_one_bad_item_rejects_the_batch() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let mut service = ReconciliationService::new(&mut storage, &sink);

        let draft = service.start_draft(
            raw(r#"{"date": "2024-03-05", "items": [
                {"amount": 10, "categoryId": "3"},
                {"amount": "oops", "categoryId": "3"}
            ]}"#),
            today(),
        );
        let err = service.commit(draft.clone()).unwrap_err();
        assert!(matches!(err, TallyError::Reconciliation(_)));
        assert!(err.to_string().contains("Item 2"));
        assert!(sink.is_empty());
        assert!(storage.transactions.is_empty());

        let mut fixed = draft;
        fixed.set_amount(1, Money::from_cents(250)).unwrap();
        let mut service = ReconciliationService::new(&mut storage, &sink);
        assert_eq!(service.commit(fixed).unwrap().len(), 2);
    }

    #[test]
    fn test_normalization_fallbacks() {
        let food = Category::new("Food", TransactionType::Expense);
        let fuel = Category::new("Fuel", TransactionType::Expense);
        let expense = vec![food.clone(), fuel.clone()];

        let draft = ReconciliationDraft::normalize(
            raw(&format!(
                r#"{{"date": "2024-02-29T18:45:00Z", "items": [
                    {{"amount": -3, "categoryId": "{}"}},
                    {{"note": "  Coffee ", "categoryId": "gone"}},
                    {{"amount": "7.25"}}
                ]}}"#,
                fuel.id
            )),
            &expense,
            today(),
        );
        assert_eq!(draft.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(draft.items()[0].amount, Money::zero());
        assert_eq!(draft.items()[0].category_id.as_ref(), Some(&fuel.id));
        assert_eq!(draft.items()[1].note, "Coffee");
        assert_eq!(draft.items()[1].category_id.as_ref(), Some(&food.id));
        assert_eq!(draft.items()[2].amount.cents(), 725);

        let empty = ReconciliationDraft::normalize(raw(r#"{"date": "last tuesday"}"#), &[], today());
        assert_eq!(empty.date(), today());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unresolved_category_blocks_commit() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let mut service = ReconciliationService::new(&mut storage, &sink);

        let draft = ReconciliationDraft::new(
            today(),
            vec![DraftItem::new(Money::from_cents(100), "", None)],
        );
        assert!(service.commit(draft).unwrap_err().to_string().contains("no category"));

        let empty = ReconciliationDraft::new(today(), Vec::new());
        assert!(service.commit(empty).is_err());
    }

    #[test]
    fn test_draft_editing() {
        let mut draft = ReconciliationDraft::new(
            today(),
            vec![DraftItem::new(Money::from_cents(100), "a", Some(CategoryId::from("3")))],
        );
        draft.add_item(DraftItem::new(Money::from_cents(50), "b", None));
        draft.set_note(1, "tip").unwrap();
        draft.set_category(1, CategoryId::from("6")).unwrap();
        assert_eq!(draft.total().cents(), 150);

        assert!(draft.set_amount(5, Money::zero()).unwrap_err().is_validation());
        assert_eq!(draft.remove_item(0).unwrap().note, "a");
        assert_eq!(draft.items()[0].note, "tip");
        assert!(draft.remove_item(3).is_err());
    }

    #[test]
    fn test_budget_checks_see_earlier_items() {
        let (_temp_dir, mut storage) = create_test_storage();
        storage
            .budgets
            .upsert(Budget::new(CategoryId::from("3"), Money::from_cents(1_000)));
        let sink = MemorySink::new();
        let mut service = ReconciliationService::new(&mut storage, &sink);

        let draft = ReconciliationDraft::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            vec![
                DraftItem::new(Money::from_cents(600), "a", Some(CategoryId::from("3"))),
                DraftItem::new(Money::from_cents(600), "b", Some(CategoryId::from("3"))),
            ],
        );
        service.commit(draft).unwrap();

        let received = sink.drain();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].severity, Severity::Warn);
        assert_eq!(received[0].message, "Warning: Budget exceeded for Food & Dining!");
        assert_eq!(received[1].message, "Posted 2 scanned items");
    }

    #[test]
    fn test_failed_write_posts_nothing() {
        let (_temp_dir, mut storage) = create_test_storage();
        std::fs::create_dir(storage.paths().transactions_file()).unwrap();
        storage
            .budgets
            .upsert(Budget::new(CategoryId::from("3"), Money::from_cents(100)));
        let sink = MemorySink::new();
        let mut service = ReconciliationService::new(&mut storage, &sink);

        let draft = ReconciliationDraft::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            vec![
                DraftItem::new(Money::from_cents(600), "a", Some(CategoryId::from("3"))),
                DraftItem::new(Money::from_cents(700), "b", Some(CategoryId::from("4"))),
            ],
        );
        let err = service.commit(draft).unwrap_err();
        assert!(matches!(err, TallyError::Storage(_)));

        assert!(sink.is_empty());
        assert!(storage.transactions.is_empty());
    }

    #[test]
    fn test_failed_extraction_warns_once() {
        let (_temp_dir, mut storage) = create_test_storage();
        let sink = MemorySink::new();
        let service = ReconciliationService::new(&mut storage, &sink);

        let draft = service.receive(Err(TallyError::Extraction("timed out".into())), today());
        assert!(draft.is_none());
        assert_eq!(sink.messages(), vec!["Could not read the receipt: timed out"]);
        assert!(storage.transactions.is_empty());
    }
}
