//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json. The log is
//! kept newest-first: new entries are prepended.

use std::path::PathBuf;

use crate::error::TallyError;
use crate::models::{CategoryId, Transaction, TransactionId};

use super::file_io::{read_slot, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    path: PathBuf,
    items: Vec<Transaction>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            items: Vec::new(),
        }
    }

    /// Load transactions from disk; a missing or damaged slot loads as empty
    pub fn load(&mut self) {
        self.items = read_slot::<TransactionData, _>(&self.path)
            .map(|data| data.transactions)
            .unwrap_or_default();
    }

    pub fn save(&self) -> Result<(), TallyError> {
        let file_data = TransactionData {
            transactions: self.items.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.items.iter().find(|txn| &txn.id == id)
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.get(id).is_some()
    }

    /// All transactions, newest first
    pub fn all(&self) -> &[Transaction] {
        &self.items
    }

    pub fn by_category<'a>(
        &'a self,
        category_id: &'a CategoryId,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.items
            .iter()
            .filter(move |txn| &txn.category_id == category_id)
    }

    /// Add a transaction at the front of the log
    pub fn insert(&mut self, txn: Transaction) {
        self.items.insert(0, txn);
    }

    /// Add a batch at the front of the log, keeping the batch order
    pub fn prepend(&mut self, batch: Vec<Transaction>) {
        self.items.splice(0..0, batch);
    }

    /// Replace the transaction with the same id
    pub fn update(&mut self, txn: Transaction) -> Result<(), TallyError> {
        let slot = self
            .items
            .iter_mut()
            .find(|existing| existing.id == txn.id)
            .ok_or_else(|| TallyError::transaction_not_found(txn.id.as_str()))?;
        *slot = txn;
        Ok(())
    }

    pub fn remove(&mut self, id: &TransactionId) -> Result<Transaction, TallyError> {
        let index = self
            .items
            .iter()
            .position(|txn| &txn.id == id)
            .ok_or_else(|| TallyError::transaction_not_found(id.as_str()))?;
        Ok(self.items.remove(index))
    }

    /// Copy of the in-memory log, used to undo a failed commit
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.items.clone()
    }

    pub fn restore(&mut self, items: Vec<Transaction>) {
        self.items = items;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
