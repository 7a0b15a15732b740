use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use tally::cli::{
    handle_annual_command, handle_budget_command, handle_category_command,
    handle_receipt_command, handle_summary_command, handle_transaction_command, BudgetCommands,
    CategoryCommands, PeriodArgs, ReceiptCommands, TransactionCommands,
};
use tally::config::{Settings, TallyPaths};
use tally::logging::init_tracing;
use tally::models::{DefaultCategory, Money, TransactionType};
use tally::notify::ConsoleSink;
use tally::services::RecurringPoster;
use tally::storage::{init::initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Terminal personal finance ledger",
    long_about = "Tally records income and expenses by category, warns when a \
                  category goes over its monthly budget, posts recurring monthly \
                  commitments automatically and turns receipt scans into expenses."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory with the default categories and budgets
    Init,

    /// Show configuration paths and settings
    Config,

    /// Income, expenses and top categories for a month or date range
    Summary {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Month-by-month income, expenses and savings for a year
    Annual {
        /// Year to report on, defaults to the current year
        #[arg(short, long)]
        year: Option<i32>,
        /// List the years that can be reported on
        #[arg(long, conflicts_with = "year")]
        years: bool,
    },

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Receipt scanning commands
    #[command(subcommand)]
    Receipt(ReceiptCommands),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = TallyPaths::new()?;
    let sink = ConsoleSink;

    if let Some(Commands::Init) = cli.command {
        println!("Initializing Tally at: {}", paths.base_dir().display());
        let mut storage = initialize_storage(&paths)?;
        RecurringPoster::new(&mut storage, &sink).run(Utc::now())?;
        println!("Initialization complete!");
        println!();
        println!("Default categories have been created:");
        for kind in [TransactionType::Expense, TransactionType::Income] {
            let names: Vec<_> = DefaultCategory::all()
                .iter()
                .filter(|d| d.kind == kind)
                .map(|d| d.name)
                .collect();
            println!("  - {}: {}", kind, names.join(", "));
        }
        println!();
        println!("Run 'tally category list' to see all categories.");
        return Ok(());
    }

    let settings = Settings::load_or_create(&paths)?;
    let mut storage = Storage::open(paths.clone(), &settings)?;

    // Commitments for the current month are posted before anything else runs
    RecurringPoster::new(&mut storage, &sink).run(Utc::now())?;

    match cli.command {
        Some(Commands::Init) => {}
        Some(Commands::Config) => {
            println!("Tally Configuration");
            println!("===================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:      {}", settings.currency_symbol);
            println!("  Date format:          {}", settings.date_format);
            println!(
                "  Default budget:       {}",
                Money::from_cents(settings.default_budget_amount)
            );
            println!("  Top categories shown: {}", settings.top_categories_limit);
            println!(
                "  Receipt extractor:    {}",
                settings.extractor_command.as_deref().unwrap_or("(not set)")
            );
        }
        Some(Commands::Summary { period }) => {
            handle_summary_command(&storage, &settings, &period)?;
        }
        Some(Commands::Annual { year, years }) => {
            handle_annual_command(&storage, year, years)?;
        }
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&mut storage, &settings, &sink, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&mut storage, &sink, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&mut storage, &sink, cmd)?;
        }
        Some(Commands::Receipt(cmd)) => {
            handle_receipt_command(&mut storage, &settings, &sink, cmd)?;
        }
        None => {
            println!("Tally - terminal personal finance ledger");
            println!();
            println!("Run 'tally --help' for usage information.");
            println!("Run 'tally init' to set up a new ledger.");
        }
    }

    Ok(())
}
