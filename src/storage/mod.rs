//! Storage layer for Tally
//!
//! Four JSON slots (transactions, categories, budgets and processed periods)
//! with atomic writes. Damaged or missing slots load as empty collections or
//! built-in defaults and never fail startup.

pub mod budget;
pub mod categories;
pub mod file_io;
pub mod init;
pub mod periods;
pub mod transactions;

pub use budget::BudgetRepository;
pub use categories::CategoryRepository;
pub use file_io::{read_slot, write_json_atomic};
pub use init::initialize_storage;
pub use periods::PeriodRepository;
pub use transactions::TransactionRepository;

use tracing::{debug, warn};

use crate::config::{Settings, TallyPaths};
use crate::error::TallyError;
use crate::models::{Money, Transaction};

/// Main storage coordinator that owns every repository
///
/// There is exactly one writer: mutations go through `&mut Storage` and
/// the services. Outside the crate the repositories are read-only.
pub struct Storage {
    paths: TallyPaths,
    pub(crate) transactions: TransactionRepository,
    pub(crate) categories: CategoryRepository,
    pub(crate) budgets: BudgetRepository,
    pub(crate) periods: PeriodRepository,
}

impl Storage {
    /// Create the repositories and load every slot from disk
    pub fn open(paths: TallyPaths, settings: &Settings) -> Result<Self, TallyError> {
        paths.ensure_directories()?;

        let mut storage = Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            periods: PeriodRepository::new(paths.processed_periods_file()),
            paths,
        };
        storage.load_all(Money::from_cents(settings.default_budget_amount));
        Ok(storage)
    }

    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    /// Read-only views; writes go through the services
    pub fn transactions(&self) -> &TransactionRepository {
        &self.transactions
    }

    pub fn categories(&self) -> &CategoryRepository {
        &self.categories
    }

    pub fn budgets(&self) -> &BudgetRepository {
        &self.budgets
    }

    pub fn periods(&self) -> &PeriodRepository {
        &self.periods
    }

    pub fn load_all(&mut self, default_budget: Money) {
        self.transactions.load();
        self.categories.load();
        self.budgets.load(default_budget);
        self.periods.load();
        debug!(
            transactions = self.transactions.len(),
            categories = self.categories.len(),
            budgets = self.budgets.len(),
            "loaded ledger"
        );
    }

    pub fn save_all(&self) -> Result<(), TallyError> {
        self.transactions.save()?;
        self.categories.save()?;
        self.budgets.save()?;
        self.periods.save()?;
        Ok(())
    }

    /// Prepend a batch of auto-posts and mark `period_key` processed as one unit
    ///
    /// The transactions slot is written before the periods slot. If either
    /// write fails, both collections are restored in memory, the previous
    /// transactions slot is rewritten, and the error is returned.
    pub fn commit_recurring_batch(
        &mut self,
        period_key: &str,
        batch: Vec<Transaction>,
    ) -> Result<(), TallyError> {
        let transactions_before = self.transactions.snapshot();
        let periods_before = self.periods.snapshot();

        self.transactions.prepend(batch);
        self.periods.mark(period_key);

        let written = self
            .transactions
            .save()
            .and_then(|()| self.periods.save());

        if let Err(err) = written {
            self.transactions.restore(transactions_before);
            self.periods.restore(periods_before);
            if let Err(rollback) = self.transactions.save() {
                warn!(error = %rollback, "could not rewrite transactions after failed commit");
            }
            return Err(err);
        }

        Ok(())
    }
}
