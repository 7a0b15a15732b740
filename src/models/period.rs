//! Calendar periods used to scope ledger views
//!
//! A view is either one calendar month or an explicit inclusive date range.
//! All calendar questions are answered in the local time zone; instants are
//! stored in UTC.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The local calendar date an instant falls on
pub fn local_date_of(instant: &DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// The UTC instant of a local wall-clock time on `date`
///
/// Ambiguous local times resolve to the earlier instant; times skipped by a
/// DST jump are shifted forward one hour.
pub fn at_local_time(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    /// Create a month, rejecting months outside 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The local month an instant falls in
    pub fn containing(instant: &DateTime<Utc>) -> Self {
        Self::of_date(local_date_of(instant))
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current local month
    pub fn current() -> Self {
        Self::of_date(Local::now().date_naive())
    }

    /// Stable key used to mark a month as processed, e.g. "2024-3"
    pub fn key(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }

    /// The immediately preceding month, wrapping January to December
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.next()
            .start_date()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether an instant falls within this month in local time
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        let date = local_date_of(instant);
        date.year() == self.year && date.month() == self.month
    }

    /// The instant of `time` local on the first day of this month
    pub fn first_day_at(&self, time: NaiveTime) -> DateTime<Utc> {
        at_local_time(self.start_date(), time)
    }

    /// Parse "2024-03", "2024-3" or "2024/03"
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .or_else(|| s.split_once('/'))
            .ok_or_else(|| PeriodParseError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;

        Self::new(year, month)
    }

    /// Full month name, e.g. "March 2024"
    pub fn long_name(&self) -> String {
        self.start_date().format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An explicit inclusive range of local calendar days
///
/// Membership runs from the start of the local day `from` to the end of the
/// local day `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, PeriodParseError> {
        if from > to {
            return Err(PeriodParseError::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        let date = local_date_of(instant);
        date >= self.from && date <= self.to
    }

    /// Parse "2024-01-01..2024-01-31"
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let (from, to) = s
            .split_once("..")
            .ok_or_else(|| PeriodParseError::InvalidFormat(s.to_string()))?;
        let from = NaiveDate::parse_from_str(from.trim(), "%Y-%m-%d")
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        let to = NaiveDate::parse_from_str(to.trim(), "%Y-%m-%d")
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        Self::new(from, to)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.from.format("%Y-%m-%d"),
            self.to.format("%Y-%m-%d")
        )
    }
}

/// The window a ledger view is computed over
///
/// Month views support period-over-period comparison; range views do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodSelection {
    Month(MonthPeriod),
    Range(DateRange),
}

impl PeriodSelection {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        match self {
            Self::Month(month) => month.contains(instant),
            Self::Range(range) => range.contains(instant),
        }
    }

    pub fn month(&self) -> Option<MonthPeriod> {
        match self {
            Self::Month(month) => Some(*month),
            Self::Range(_) => None,
        }
    }
}

impl From<MonthPeriod> for PeriodSelection {
    fn from(month: MonthPeriod) -> Self {
        Self::Month(month)
    }
}

impl From<DateRange> for PeriodSelection {
    fn from(range: DateRange) -> Self {
        Self::Range(range)
    }
}

impl fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(month) => write!(f, "{}", month.long_name()),
            Self::Range(range) => write!(f, "{}", range),
        }
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Invalid period format: {}", s),
            Self::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            Self::InvertedRange { from, to } => {
                write!(f, "Range start {} is after range end {}", from, to)
            }
        }
    }
}

impl std::error::Error for PeriodParseError {}
