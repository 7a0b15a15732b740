//! Period selection service
//!
//! Resolves user input into a [`PeriodSelection`] and selects the
//! transactions that fall inside it.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{TallyError, TallyResult};
use crate::models::{DateRange, MonthPeriod, PeriodSelection, Transaction};

/// Transactions whose timestamp falls inside `selection`, in log order
pub fn select<'a>(transactions: &'a [Transaction], selection: &PeriodSelection) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|txn| selection.contains(&txn.timestamp))
        .collect()
}

/// Service for resolving periods relative to a reference day
pub struct PeriodService {
    today: NaiveDate,
}

impl Default for PeriodService {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodService {
    /// Resolve relative periods against the local date
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }

    /// Resolve relative periods against a fixed day
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_month(&self) -> MonthPeriod {
        MonthPeriod::of_date(self.today)
    }

    /// Combine the CLI period flags into one selection
    ///
    /// `--from`/`--to` must be given together and exclude `--period`. With no
    /// flags the current month is selected.
    pub fn resolve(
        &self,
        period: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> TallyResult<PeriodSelection> {
        match (period, from, to) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(TallyError::Validation(
                "Use either a period or a date range, not both".into(),
            )),
            (None, Some(from), Some(to)) => DateRange::new(from, to)
                .map(PeriodSelection::Range)
                .map_err(|e| TallyError::Validation(e.to_string())),
            (None, Some(_), None) | (None, None, Some(_)) => Err(TallyError::Validation(
                "A date range needs both --from and --to".into(),
            )),
            (Some(s), None, None) => self.parse(s),
            (None, None, None) => Ok(PeriodSelection::Month(self.current_month())),
        }
    }

    /// Parse a period string
    ///
    /// Formats supported:
    /// - Relative: "current", "this", "now", "last", "prev", "previous"
    /// - Months: "2025-01", "2025-1", "January 2025", "Jan"
    /// - Date range: "2025-01-01..2025-01-14"
    pub fn parse(&self, s: &str) -> TallyResult<PeriodSelection> {
        let s_lower = s.trim().to_lowercase();

        if s_lower.contains("..") {
            return DateRange::parse(&s_lower)
                .map(PeriodSelection::Range)
                .map_err(|e| TallyError::Validation(e.to_string()));
        }

        if matches!(s_lower.as_str(), "current" | "this" | "now") {
            return Ok(PeriodSelection::Month(self.current_month()));
        }

        if matches!(s_lower.as_str(), "last" | "prev" | "previous") {
            return Ok(PeriodSelection::Month(self.current_month().prev()));
        }

        if let Some(month) = self.parse_month_name(&s_lower) {
            return Ok(PeriodSelection::Month(month));
        }

        MonthPeriod::parse(&s_lower)
            .map(PeriodSelection::Month)
            .map_err(|_| TallyError::Validation(format!("Invalid period format: {}", s)))
    }

    /// Parse month names like "January", "jan 2025"
    ///
    /// Without a year, a month later than the current one means last year.
    fn parse_month_name(&self, s: &str) -> Option<MonthPeriod> {
        const MONTHS: [(&str, u32); 24] = [
            ("january", 1),
            ("jan", 1),
            ("february", 2),
            ("feb", 2),
            ("march", 3),
            ("mar", 3),
            ("april", 4),
            ("apr", 4),
            ("may", 5),
            ("june", 6),
            ("jun", 6),
            ("july", 7),
            ("jul", 7),
            ("august", 8),
            ("aug", 8),
            ("september", 9),
            ("sept", 9),
            ("sep", 9),
            ("october", 10),
            ("oct", 10),
            ("november", 11),
            ("nov", 11),
            ("december", 12),
            ("dec", 12),
        ];

        for (name, month) in MONTHS {
            if let Some(rest) = s.strip_prefix(name) {
                let rest = rest.trim();
                let year = if rest.is_empty() {
                    if month > self.today.month() {
                        self.today.year() - 1
                    } else {
                        self.today.year()
                    }
                } else {
                    rest.parse().ok()?
                };
                return MonthPeriod::new(year, month).ok();
            }
        }

        None
    }
}

/// Parse a `YYYY-MM-DD` date, as used by `--from`, `--to` and `--date`
pub fn parse_date(s: &str) -> TallyResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| TallyError::Validation(format!("Invalid date (expected YYYY-MM-DD): {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::period::at_local_time;
    use crate::models::{CategoryId, Money, TransactionType};
    use chrono::NaiveTime;

    fn service() -> PeriodService {
        PeriodService::with_today(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    fn month(year: i32, month: u32) -> PeriodSelection {
        PeriodSelection::Month(MonthPeriod::new(year, month).unwrap())
    }

    fn txn_on(y: i32, m: u32, d: u32) -> Transaction {
        Transaction::new(
            Money::from_cents(100),
            CategoryId::from("1"),
            TransactionType::Expense,
            at_local_time(
                NaiveDate::from_ymd_opt(y, m, d).unwrap(),
                NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            ),
        )
    }

    #[test]
    fn test_parse_relative() {
        let service = service();
        assert_eq!(service.parse("current").unwrap(), month(2024, 3));
        assert_eq!(service.parse("last").unwrap(), month(2024, 2));
    }

    #[test]
    fn test_parse_month_names() {
        let service = service();
        assert_eq!(service.parse("January").unwrap(), month(2024, 1));
        assert_eq!(service.parse("dec").unwrap(), month(2023, 12));
        assert_eq!(service.parse("sept 2022").unwrap(), month(2022, 9));
        assert_eq!(service.parse("Mar 2021").unwrap(), month(2021, 3));
    }

    #[test]
    fn test_parse_numeric_and_range() {
        let service = service();
        assert_eq!(service.parse("2023-11").unwrap(), month(2023, 11));
        assert!(matches!(
            service.parse("2024-01-01..2024-01-31").unwrap(),
            PeriodSelection::Range(_)
        ));
        assert!(service.parse("2024-02-01..2024-01-01").unwrap_err().is_validation());
        assert!(service.parse("soon").unwrap_err().is_validation());
    }

    #[test]
    fn test_resolve_flags() {
        let service = service();
        let from = NaiveDate::from_ymd_opt(2024, 1, 1);
        let to = NaiveDate::from_ymd_opt(2024, 1, 31);

        assert_eq!(service.resolve(None, None, None).unwrap(), month(2024, 3));
        assert!(matches!(
            service.resolve(None, from, to).unwrap(),
            PeriodSelection::Range(_)
        ));
        assert!(service.resolve(None, from, None).is_err());
        assert!(service.resolve(Some("last"), from, to).is_err());
    }

    #[test]
    fn test_select_month_and_range() {
        let transactions = vec![
            txn_on(2024, 2, 29),
            txn_on(2024, 3, 1),
            txn_on(2024, 3, 31),
            txn_on(2023, 3, 10),
        ];

        let march = select(&transactions, &month(2024, 3));
        assert_eq!(march.len(), 2);

        let range = PeriodSelection::Range(
            DateRange::new(
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )
            .unwrap(),
        );
        let selected = select(&transactions, &range);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, transactions[0].id);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(parse_date("05/03/2024").is_err());
    }
}
