//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod category;
pub mod receipt;
pub mod report;
pub mod transaction;

pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use receipt::{handle_receipt_command, ReceiptCommands};
pub use report::{handle_annual_command, handle_summary_command, PeriodArgs};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{DateTime, NaiveTime, Utc};

use crate::error::{TallyError, TallyResult};
use crate::models::period::at_local_time;
use crate::models::{Money, TransactionType};
use crate::services::period::parse_date;

/// Local time of day for records entered with a date only
const DATE_ONLY_HOUR: u32 = 12;

/// Parse a user-entered amount such as "12.50" or "$12.50"
pub(crate) fn parse_amount(s: &str) -> TallyResult<Money> {
    Money::parse(s).map_err(|e| {
        TallyError::Validation(format!(
            "Invalid amount format: '{}'. Use format like '12.50'. Error: {}",
            s, e
        ))
    })
}

pub(crate) fn parse_kind(s: &str) -> TallyResult<TransactionType> {
    s.parse().map_err(TallyError::Validation)
}

/// Timestamp for a `--date` flag: noon local on that day, or now without one
pub(crate) fn timestamp_for(date: Option<&str>) -> TallyResult<DateTime<Utc>> {
    match date {
        Some(s) => Ok(at_local_time(
            parse_date(s)?,
            NaiveTime::from_hms_opt(DATE_ONLY_HOUR, 0, 0).unwrap_or(NaiveTime::MIN),
        )),
        None => Ok(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::period::local_date_of;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5").unwrap().cents(), 1_250);
        assert!(parse_amount("twelve").unwrap_err().is_validation());
    }

    #[test]
    fn test_date_only_entries_land_on_that_local_day() {
        let ts = timestamp_for(Some("2024-03-05")).unwrap();
        assert_eq!(local_date_of(&ts), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert!(timestamp_for(Some("05/03/2024")).is_err());
    }
}
