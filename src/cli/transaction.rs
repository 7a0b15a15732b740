//! Transaction CLI commands
//!
//! Implements CLI commands for transaction management.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_register};
use crate::error::TallyResult;
use crate::notify::NotificationSink;
use crate::services::{
    CategoryService, CreateTransactionInput, TransactionFilter, TransactionService,
    UpdateTransactionInput,
};
use crate::storage::Storage;

use super::report::PeriodArgs;
use super::{parse_amount, parse_kind, timestamp_for};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// Amount (e.g., "12.50")
        amount: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// income or expense; defaults to the category's type
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        /// Note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List transactions
    List {
        #[command(flatten)]
        period: PeriodArgs,
        /// Filter by category name or ID
        #[arg(short = 'C', long)]
        category: Option<String>,
        /// Filter by type (income, expense)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID or unique prefix
        id: String,
    },
    /// Edit a transaction
    Edit {
        /// Transaction ID or unique prefix
        id: String,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New type (income, expense)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID or unique prefix
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &mut Storage,
    settings: &Settings,
    sink: &dyn NotificationSink,
    cmd: TransactionCommands,
) -> TallyResult<()> {
    match cmd {
        TransactionCommands::Add {
            amount,
            category,
            kind,
            date,
            note,
        } => {
            let amount = parse_amount(&amount)?;
            let timestamp = timestamp_for(date.as_deref())?;

            let category = CategoryService::new(storage, sink).find(&category)?.clone();
            let kind = match kind {
                Some(k) => parse_kind(&k)?,
                None => category.kind,
            };

            let input = CreateTransactionInput {
                amount,
                category_id: category.id.clone(),
                kind,
                note,
                timestamp,
            };
            let txn = TransactionService::new(storage, sink).create(input)?;

            println!("Created transaction:");
            print!("{}", format_transaction_details(&txn, storage.categories.all()));
        }

        TransactionCommands::List {
            period,
            category,
            kind,
            limit,
        } => {
            let selection = period.resolve()?;

            let mut filter = TransactionFilter::new().period(selection).limit(limit);
            if let Some(name) = &category {
                let category = CategoryService::new(storage, sink).find(name)?.id.clone();
                filter = filter.category(category);
            }
            if let Some(k) = &kind {
                filter = filter.kind(parse_kind(k)?);
            }

            let transactions = TransactionService::new(storage, sink).list(&filter);

            println!("Transactions: {}", selection);
            print!(
                "{}",
                format_transaction_register(
                    &transactions,
                    storage.categories.all(),
                    &settings.date_format
                )
            );
            println!("\nShowing {} transactions", transactions.len());
        }

        TransactionCommands::Show { id } => {
            let service = TransactionService::new(storage, sink);
            let txn = service.find(&id)?.clone();
            print!("{}", format_transaction_details(&txn, storage.categories.all()));
        }

        TransactionCommands::Edit {
            id,
            amount,
            category,
            kind,
            date,
            note,
        } => {
            let mut input = UpdateTransactionInput {
                amount: amount.as_deref().map(parse_amount).transpose()?,
                kind: kind.as_deref().map(parse_kind).transpose()?,
                note,
                ..Default::default()
            };
            if let Some(d) = date.as_deref() {
                input.timestamp = Some(timestamp_for(Some(d))?);
            }
            if let Some(name) = &category {
                let category = CategoryService::new(storage, sink).find(name)?.clone();
                // Moving to a category of the other type flips the record with it
                if input.kind.is_none() {
                    input.kind = Some(category.kind);
                }
                input.category_id = Some(category.id);
            }

            if input.is_empty() {
                println!("Nothing to change. See 'tally transaction edit --help'.");
                return Ok(());
            }

            let mut service = TransactionService::new(storage, sink);
            let txn_id = service.find(&id)?.id.clone();
            let updated = service.update(&txn_id, input)?;

            println!("Updated transaction: {}", updated.id);
            print!("{}", format_transaction_details(&updated, storage.categories.all()));
        }

        TransactionCommands::Delete { id, force } => {
            let txn = TransactionService::new(storage, sink).find(&id)?.clone();

            if !force {
                println!("About to delete transaction:");
                print!("{}", format_transaction_details(&txn, storage.categories.all()));
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = TransactionService::new(storage, sink).delete(&txn.id)?;
            println!("Deleted transaction: {} ({})", deleted.id, deleted.amount);
        }
    }

    Ok(())
}
