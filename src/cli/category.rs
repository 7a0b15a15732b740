//! Category CLI commands
//!
//! Implements CLI commands for category management.

use clap::Subcommand;

use crate::display::category::{format_category_details, format_category_list};
use crate::error::TallyResult;
use crate::models::category::UNKNOWN_LABEL;
use crate::models::TransactionType;
use crate::notify::NotificationSink;
use crate::services::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
use crate::storage::Storage;

use super::{parse_amount, parse_kind};

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories
    List,

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,
        /// Display color (#rrggbb)
        #[arg(long)]
        color: Option<String>,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
        /// Amount to post automatically on the 1st of every month
        #[arg(short, long)]
        recurring: Option<String>,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New type (income, expense)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// New display color (#rrggbb)
        #[arg(long)]
        color: Option<String>,
        /// New icon name
        #[arg(long)]
        icon: Option<String>,
        /// New monthly commitment amount
        #[arg(short, long, conflicts_with = "no_recurring")]
        recurring: Option<String>,
        /// Stop the monthly commitment
        #[arg(long)]
        no_recurring: bool,
    },

    /// Delete a category; its transactions are kept
    Delete {
        /// Category name or ID
        category: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &mut Storage,
    sink: &dyn NotificationSink,
    cmd: CategoryCommands,
) -> TallyResult<()> {
    match cmd {
        CategoryCommands::List => {
            print!(
                "{}",
                format_category_list(storage.categories.all(), storage.budgets.all())
            );
        }

        CategoryCommands::Create {
            name,
            kind,
            color,
            icon,
            recurring,
        } => {
            let input = CreateCategoryInput {
                name,
                kind: parse_kind(&kind)?,
                color,
                icon,
                recurring_amount: recurring.as_deref().map(parse_amount).transpose()?,
            };
            let category = CategoryService::new(storage, sink).create(input)?;

            println!("Created category: {}", category.name);
            println!("  ID:   {}", category.id);
            println!("  Type: {}", category.kind);
            if let Some(amount) = category.recurring_commitment() {
                println!("  Posts {} on the 1st of each month, starting next month", amount);
            }
        }

        CategoryCommands::Show { category } => {
            let category = CategoryService::new(storage, sink).find(&category)?.clone();
            print!(
                "{}",
                format_category_details(&category, storage.budgets.get(&category.id))
            );

            let count = storage.transactions.by_category(&category.id).count();
            println!("  Transactions: {}", count);
        }

        CategoryCommands::Edit {
            category,
            name,
            kind,
            color,
            icon,
            recurring,
            no_recurring,
        } => {
            let input = UpdateCategoryInput {
                name,
                kind: kind.as_deref().map(parse_kind).transpose()?,
                color,
                icon,
                is_recurring: no_recurring.then_some(false),
                recurring_amount: recurring.as_deref().map(parse_amount).transpose()?,
            };

            let mut service = CategoryService::new(storage, sink);
            let id = service.find(&category)?.id.clone();
            let updated = service.update(&id, input)?;

            println!("Updated category: {}", updated.name);
            if updated.kind == TransactionType::Income && storage.budgets.get(&id).is_some() {
                println!("Note: budgets only track expenses.");
            }
        }

        CategoryCommands::Delete { category, force } => {
            let target = CategoryService::new(storage, sink).find(&category)?.clone();
            let count = storage.transactions.by_category(&target.id).count();

            if !force {
                println!("About to delete category '{}'.", target.name);
                if count > 0 {
                    println!(
                        "{} transaction(s) will be kept and shown as '{}'.",
                        count, UNKNOWN_LABEL
                    );
                }
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let removed = CategoryService::new(storage, sink).delete(&target.id)?;
            println!("Deleted category: {}", removed.name);
        }
    }

    Ok(())
}

