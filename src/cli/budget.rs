//! Budget CLI commands
//!
//! Implements CLI commands for monthly category caps and progress.

use clap::Subcommand;

use crate::error::TallyResult;
use crate::models::MonthPeriod;
use crate::notify::NotificationSink;
use crate::reports::BudgetOverviewReport;
use crate::services::{BudgetEvaluator, BudgetService, CategoryService};
use crate::storage::Storage;

use super::report::PeriodArgs;
use super::{parse_amount, timestamp_for};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the monthly cap for a category
    Set {
        /// Category name or ID
        category: String,
        /// Amount (e.g., "500" or "500.00")
        amount: String,
    },

    /// Remove the cap for a category
    Remove {
        /// Category name or ID
        category: String,
    },

    /// Show spending against every cap
    List {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Check whether a new expense would go over its category's cap
    Check {
        /// Category name or ID
        category: String,
        /// Amount of the expense
        amount: String,
        /// Date of the expense (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &mut Storage,
    sink: &dyn NotificationSink,
    cmd: BudgetCommands,
) -> TallyResult<()> {
    match cmd {
        BudgetCommands::Set { category, amount } => {
            let amount = parse_amount(&amount)?;
            let category = CategoryService::new(storage, sink).find(&category)?.clone();
            let budget = BudgetService::new(storage, sink).set(&category.id, amount)?;
            println!("Budget for {}: {} per month", category.name, budget.amount);
        }

        BudgetCommands::Remove { category } => {
            let category = CategoryService::new(storage, sink).find(&category)?.clone();
            BudgetService::new(storage, sink).remove(&category.id)?;
            println!("Removed budget for {}", category.name);
        }

        BudgetCommands::List { period } => {
            let selection = period.resolve()?;
            let report = BudgetOverviewReport::generate(storage, &selection);
            print!("{}", report.format_terminal());
        }

        BudgetCommands::Check {
            category,
            amount,
            date,
        } => {
            let amount = parse_amount(&amount)?;
            let timestamp = timestamp_for(date.as_deref())?;
            let category = CategoryService::new(storage, sink).find(&category)?.clone();

            let check = BudgetEvaluator::new(storage).evaluate(&category.id, &timestamp, amount, None);
            let month = MonthPeriod::containing(&timestamp);

            match check.budget_amount {
                None => println!("{} has no budget.", category.name),
                Some(cap) => {
                    println!(
                        "{} in {}: {} of {} with this expense",
                        category.name,
                        month.long_name(),
                        check.spent_including_candidate,
                        cap
                    );
                    if check.over_budget {
                        println!("This would exceed the budget by {}", check.spent_including_candidate - cap);
                    } else {
                        println!("Within budget ({} left)", cap - check.spent_including_candidate);
                    }
                }
            }
        }
    }

    Ok(())
}
