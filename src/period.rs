use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("expected YYYY-MM, got '{0}'")]
    Format(String),

    #[error("month must be between 1 and 12, got {0}")]
    Month(u32),

    #[error("year must be between 1 and 9998, got {0}")]
    Year(i32),
}

/// Inclusive calendar-date range. Serialized as ISO 8601 dates at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_iso(), self.end_iso())
    }
}

/// First through last day of the given month.
///
/// Returns `None` when `month` is outside 1..=12 or the year falls outside
/// what `NaiveDate` can represent.
pub fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some(DateRange { start, end })
}

/// A validated (year, month) pick, as supplied on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSelection {
    year: i32,
    month: u32,
}

impl MonthSelection {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::Month(month));
        }
        if !(1..=9998).contains(&year) {
            return Err(PeriodError::Year(year));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn range(&self) -> DateRange {
        month_range(self.year, self.month).expect("MonthSelection is validated on construction")
    }

    /// The calendar month immediately before this one.
    pub fn previous(&self) -> Self {
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

    /// Human label such as "March 2026".
    pub fn label(&self) -> String {
        self.range().start.format("%B %Y").to_string()
    }
}

impl FromStr for MonthSelection {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| PeriodError::Format(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodError::Format(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodError::Format(s.to_string()))?;
        Self::new(year, month)
    }
}

impl fmt::Display for MonthSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Default (analysis, baseline) months: the last two complete months before `today`.
///
/// Search Console data for the running month is incomplete, so the analysis
/// month defaults to the previous one and the baseline to the month before it.
pub fn default_periods(today: NaiveDate) -> (MonthSelection, MonthSelection) {
    let this_month = MonthSelection {
        year: today.year(),
        month: today.month(),
    };
    let analysis = this_month.previous();
    (analysis, analysis.previous())
}
