//! Tally - terminal personal finance ledger
//!
//! Records income and expense transactions against categories, caps monthly
//! spending per category, posts recurring monthly commitments once per month,
//! and turns scanned receipts into reviewed batches of expenses.
//!
//! # Architecture
//!
//! - `config`: path resolution and user settings
//! - `error`: the crate error type
//! - `models`: transactions, categories, budgets, money and periods
//! - `storage`: the JSON slots and the owned in-memory store
//! - `services`: ledger operations (mutation, budgets, recurring posting,
//!   receipt reconciliation, period selection)
//! - `extraction`: the receipt extractor boundary
//! - `reports`: summary, annual and budget progress views
//! - `notify`: user-facing notifications
//! - `display` and `cli`: terminal rendering and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::config::{Settings, TallyPaths};
//! use tally::storage::Storage;
//!
//! let paths = TallyPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths, &settings)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod models;
pub mod notify;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{TallyError, TallyResult};
