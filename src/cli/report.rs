//! CLI commands for reports
//!
//! The period summary and the annual report.

use chrono::{Datelike, Local};
use clap::Args;

use crate::config::settings::Settings;
use crate::error::{TallyError, TallyResult};
use crate::models::PeriodSelection;
use crate::reports::{available_years_now, AnnualReport, SummaryReport};
use crate::services::period::parse_date;
use crate::services::PeriodService;
use crate::storage::Storage;

/// Period selection flags shared by the reporting commands
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// Period (e.g., "2025-01", "January", "current", "last", "2025-01-01..2025-01-14")
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    pub period: Option<String>,

    /// Start date (YYYY-MM-DD), used with --to
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD), used with --from
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

impl PeriodArgs {
    /// The selected window; the current month when no flag is given
    pub fn resolve(&self) -> TallyResult<PeriodSelection> {
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        PeriodService::new().resolve(self.period.as_deref(), from, to)
    }
}

/// Handle `tally summary`
pub fn handle_summary_command(
    storage: &Storage,
    settings: &Settings,
    period: &PeriodArgs,
) -> TallyResult<()> {
    let selection = period.resolve()?;
    let report = SummaryReport::generate(storage, &selection, settings.top_categories_limit);
    print!("{}", report.format_terminal());
    Ok(())
}

/// Handle `tally annual`
pub fn handle_annual_command(storage: &Storage, year: Option<i32>, list_years: bool) -> TallyResult<()> {
    let years = available_years_now(storage.transactions.all());

    if list_years {
        for year in &years {
            println!("{}", year);
        }
        return Ok(());
    }

    let year = year.unwrap_or_else(|| Local::now().year());
    if !years.contains(&year) {
        return Err(TallyError::Validation(format!(
            "No data can exist for {} (available: {}..{})",
            year,
            years.last().copied().unwrap_or(year),
            years.first().copied().unwrap_or(year)
        )));
    }

    print!("{}", AnnualReport::generate(storage, year).format_terminal());
    Ok(())
}
