//! Recurring commitment poster
//!
//! Once per local calendar month, posts one transaction for every category
//! with an active monthly commitment. The month's key is recorded together
//! with the batch, so later runs in the same month do nothing.

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{debug, info};

use crate::error::TallyResult;
use crate::models::{MonthPeriod, Transaction, TransactionId};
use crate::notify::NotificationSink;
use crate::storage::Storage;

/// Local wall-clock time auto-posts are stamped with on the 1st
const POSTING_HOUR: u32 = 9;

/// What a run of the poster did
#[derive(Debug, Clone, PartialEq)]
pub enum PostingOutcome {
    /// The month was already handled
    AlreadyProcessed { period_key: String },
    /// The month is now handled; `posted` may be empty
    Posted {
        period_key: String,
        posted: Vec<Transaction>,
    },
}

impl PostingOutcome {
    pub fn posted_count(&self) -> usize {
        match self {
            Self::AlreadyProcessed { .. } => 0,
            Self::Posted { posted, .. } => posted.len(),
        }
    }
}

pub struct RecurringPoster<'a> {
    storage: &'a mut Storage,
    sink: &'a dyn NotificationSink,
}

impl<'a> RecurringPoster<'a> {
    pub fn new(storage: &'a mut Storage, sink: &'a dyn NotificationSink) -> Self {
        Self { storage, sink }
    }

    /// Post the commitments for the local month containing `now`, at most once
    pub fn run(&mut self, now: DateTime<Utc>) -> TallyResult<PostingOutcome> {
        let month = MonthPeriod::containing(&now);
        let period_key = month.key();

        if self.storage.periods.contains(&period_key) {
            debug!(period = %period_key, "recurring commitments already posted");
            return Ok(PostingOutcome::AlreadyProcessed { period_key });
        }

        let batch = self.build_batch(&month, &period_key);
        self.storage
            .commit_recurring_batch(&period_key, batch.clone())?;

        if !batch.is_empty() {
            info!(period = %period_key, count = batch.len(), "posted recurring commitments");
            self.sink.info(&format!(
                "Posted {} monthly recurring commitments",
                batch.len()
            ));
        }

        Ok(PostingOutcome::Posted {
            period_key,
            posted: batch,
        })
    }

    /// One auto-post per active commitment, skipping any already in the log
    fn build_batch(&self, month: &MonthPeriod, period_key: &str) -> Vec<Transaction> {
        let timestamp = month.first_day_at(
            NaiveTime::from_hms_opt(POSTING_HOUR, 0, 0).unwrap_or(NaiveTime::MIN),
        );

        self.storage
            .categories
            .all()
            .iter()
            .filter_map(|category| {
                let amount = category.recurring_commitment()?;
                let id = TransactionId::for_auto_post(period_key, &category.id);
                if self.storage.transactions.contains(&id) {
                    return None;
                }

                let mut txn = Transaction::new(amount, category.id.clone(), category.kind, timestamp)
                    .with_note(format!("Auto-post: {} Commitment", category.name));
                txn.id = id;
                Some(txn)
            })
            .collect()
    }
}
