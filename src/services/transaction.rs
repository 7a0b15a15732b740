//! Transaction service
//!
//! The single add/edit/delete path for ledger records. Every write is
//! validated against the category set before it touches the store, and
//! expense writes are checked against the category's monthly budget.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{TallyError, TallyResult};
use crate::models::category::UNKNOWN_LABEL;
use crate::models::transaction::TransactionValidationError;
use crate::models::{
    BudgetCheck, CategoryId, Money, PeriodSelection, Transaction, TransactionId, TransactionType,
};
use crate::notify::NotificationSink;
use crate::storage::Storage;

use super::budget::BudgetEvaluator;

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub amount: Money,
    pub category_id: CategoryId,
    pub kind: TransactionType,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Fields to change on an existing transaction; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    pub amount: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionType>,
    pub note: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl UpdateTransactionInput {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category_id.is_none()
            && self.kind.is_none()
            && self.note.is_none()
            && self.timestamp.is_none()
    }
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub period: Option<PeriodSelection>,
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionType>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, period: PeriodSelection) -> Self {
        self.period = Some(period);
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        self.period
            .as_ref()
            .map_or(true, |p| p.contains(&txn.timestamp))
            && self
                .category_id
                .as_ref()
                .map_or(true, |c| &txn.category_id == c)
            && self.kind.map_or(true, |k| txn.kind == k)
    }
}

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a mut Storage,
    sink: &'a dyn NotificationSink,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a mut Storage, sink: &'a dyn NotificationSink) -> Self {
        Self { storage, sink }
    }

    /// Build and validate a new transaction without writing it
    pub fn prepare(&self, input: CreateTransactionInput) -> TallyResult<Transaction> {
        let category = self
            .storage
            .categories
            .get(&input.category_id)
            .ok_or_else(|| TallyError::category_not_found(input.category_id.as_str()))?;

        if category.kind != input.kind {
            return Err(TallyError::Validation(
                TransactionValidationError::TypeMismatch {
                    expected: category.kind,
                    actual: input.kind,
                }
                .to_string(),
            ));
        }

        let mut txn = Transaction::new(input.amount, input.category_id, input.kind, input.timestamp);
        if let Some(note) = input.note {
            txn.note = note.trim().to_string();
        }

        txn.validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        Ok(txn)
    }

    /// Create a new transaction
    pub fn create(&mut self, input: CreateTransactionInput) -> TallyResult<Transaction> {
        let txn = self.prepare(input)?;
        let check = self.check_budget(&txn, None);

        let before = self.storage.transactions.snapshot();
        self.storage.transactions.insert(txn.clone());
        self.persist(before)?;

        debug!(id = %txn.id, amount = %txn.amount, kind = %txn.kind, "transaction added");
        self.sink.info("Record added");
        self.warn_if_over(&txn.category_id, check);

        Ok(txn)
    }

    /// Write several prepared transactions with a single save
    ///
    /// Each budget check sees the items inserted before it. Nothing is
    /// announced; budget warnings follow only once the save succeeds, in
    /// batch order. A failed save leaves the log as it was.
    pub(crate) fn commit_batch(&mut self, txns: Vec<Transaction>) -> TallyResult<Vec<Transaction>> {
        let before = self.storage.transactions.snapshot();

        let mut checks = Vec::with_capacity(txns.len());
        for txn in &txns {
            checks.push(self.check_budget(txn, None));
            self.storage.transactions.insert(txn.clone());
        }
        self.persist(before)?;

        debug!(count = txns.len(), "transaction batch added");
        for (txn, check) in txns.iter().zip(checks) {
            self.warn_if_over(&txn.category_id, check);
        }

        Ok(txns)
    }

    /// Edit an existing transaction
    ///
    /// The category/type pairing is only re-checked when one of them changes.
    pub fn update(
        &mut self,
        id: &TransactionId,
        input: UpdateTransactionInput,
    ) -> TallyResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)
            .cloned()
            .ok_or_else(|| TallyError::transaction_not_found(id.as_str()))?;

        let pairing_changed = input.category_id.is_some() || input.kind.is_some();

        if let Some(amount) = input.amount {
            txn.amount = amount;
        }
        if let Some(category_id) = input.category_id {
            txn.category_id = category_id;
        }
        if let Some(kind) = input.kind {
            txn.kind = kind;
        }
        if let Some(note) = input.note {
            txn.note = note.trim().to_string();
        }
        if let Some(timestamp) = input.timestamp {
            txn.timestamp = timestamp;
        }

        if pairing_changed {
            let category = self
                .storage
                .categories
                .get(&txn.category_id)
                .ok_or_else(|| TallyError::category_not_found(txn.category_id.as_str()))?;
            if category.kind != txn.kind {
                return Err(TallyError::Validation(
                    TransactionValidationError::TypeMismatch {
                        expected: category.kind,
                        actual: txn.kind,
                    }
                    .to_string(),
                ));
            }
        }

        txn.validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        let check = self.check_budget(&txn, Some(id));

        let before = self.storage.transactions.snapshot();
        self.storage.transactions.update(txn.clone())?;
        self.persist(before)?;

        debug!(id = %txn.id, "transaction updated");
        self.sink.info("Record updated");
        self.warn_if_over(&txn.category_id, check);

        Ok(txn)
    }

    /// Delete a transaction
    pub fn delete(&mut self, id: &TransactionId) -> TallyResult<Transaction> {
        let before = self.storage.transactions.snapshot();
        let removed = self.storage.transactions.remove(id)?;
        self.persist(before)?;

        debug!(id = %id, "transaction deleted");
        self.sink.info("Record deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.storage.transactions.get(id)
    }

    /// Find a transaction by full id or unique id prefix
    pub fn find(&self, identifier: &str) -> TallyResult<&Transaction> {
        let identifier = identifier.trim();
        if let Some(txn) = self.storage.transactions.get(&TransactionId::from(identifier)) {
            return Ok(txn);
        }

        let mut matches = self
            .storage
            .transactions
            .all()
            .iter()
            .filter(|t| !identifier.is_empty() && t.id.as_str().starts_with(identifier));

        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(txn),
            (Some(_), Some(_)) => Err(TallyError::Validation(format!(
                "Id prefix '{}' matches more than one record",
                identifier
            ))),
            (None, _) => Err(TallyError::transaction_not_found(identifier)),
        }
    }

    /// List transactions newest first, applying the filter
    pub fn list(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let iter = self
            .storage
            .transactions
            .all()
            .iter()
            .filter(|txn| filter.matches(txn))
            .cloned();

        match filter.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }

    /// Save the log, or put `before` back in memory if the write fails
    ///
    /// Slot writes go through a temp file and rename, so a failed save
    /// leaves the file on disk untouched.
    fn persist(&mut self, before: Vec<Transaction>) -> TallyResult<()> {
        if let Err(err) = self.storage.transactions.save() {
            warn!(error = %err, "transaction write failed, keeping previous records");
            self.storage.transactions.restore(before);
            return Err(err);
        }
        Ok(())
    }

    fn check_budget(&self, txn: &Transaction, exclude: Option<&TransactionId>) -> Option<BudgetCheck> {
        if !txn.is_expense() {
            return None;
        }
        Some(BudgetEvaluator::new(self.storage).evaluate(
            &txn.category_id,
            &txn.timestamp,
            txn.amount,
            exclude,
        ))
    }

    fn warn_if_over(&self, category_id: &CategoryId, check: Option<BudgetCheck>) {
        if !check.is_some_and(|c| c.over_budget) {
            return;
        }
        let name = self
            .storage
            .categories
            .get(category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_LABEL);
        self.sink
            .warn(&format!("Warning: Budget exceeded for {}!", name));
    }
}
