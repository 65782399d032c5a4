use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use super::{Feature, ModelError};

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// A (year, quarter number) pair.
///
/// Construction checks that the quarter number is 1-4 and the year lies in
/// `MIN_YEAR..=MAX_YEAR`, so every period maps to real calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    quarter: u8,
}

impl Period {
    pub fn new(year: i64, quarter: i64) -> Result<Self, ModelError> {
        if !(1..=4).contains(&quarter) {
            return Err(ModelError::InvalidQuarter(quarter));
        }
        if !(i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)).contains(&year) {
            return Err(ModelError::InvalidYear(year));
        }
        Ok(Self {
            year: year as i32,
            quarter: quarter as u8,
        })
    }

    /// The period a calendar date falls in.
    pub fn containing(date: NaiveDate) -> Result<Self, ModelError> {
        Self::new(i64::from(date.year()), i64::from((date.month() - 1) / 3 + 1))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// The chronologically following period: Q4 rolls over to Q1 of the next year.
    pub fn next(&self) -> Result<Self, ModelError> {
        if self.quarter == 4 {
            Self::new(i64::from(self.year) + 1, 1)
        } else {
            Self::new(i64::from(self.year), i64::from(self.quarter) + 1)
        }
    }

    /// Display name, e.g. `Q3 2025`.
    pub fn name(&self) -> String {
        format!("Q{} {}", self.quarter, self.year)
    }

    fn month_span(&self) -> (u32, u32) {
        match self.quarter {
            1 => (1, 3),
            2 => (4, 6),
            3 => (7, 9),
            _ => (10, 12),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        let (start_month, _) = self.month_span();
        NaiveDate::from_ymd_opt(self.year, start_month, 1).expect("period year is range-checked")
    }

    /// Last day of the period's final month.
    pub fn end_date(&self) -> NaiveDate {
        let (_, end_month) = self.month_span();
        if end_month == 12 {
            NaiveDate::from_ymd_opt(self.year, 12, 31).expect("period year is range-checked")
        } else {
            let next_month = NaiveDate::from_ymd_opt(self.year, end_month + 1, 1)
                .expect("period year is range-checked");
            next_month.pred_opt().expect("period year is range-checked")
        }
    }

    /// Formatted date range, e.g. `Apr 01 - Jun 30`.
    pub fn date_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_date().format("%b %d"),
            self.end_date().format("%b %d")
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

/// Parses `Q2-2025`, `Q2 2025`, `q2/2025` and the like.
impl FromStr for Period {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidPeriod(s.to_string());
        let rest = s
            .trim()
            .strip_prefix(['Q', 'q'])
            .ok_or_else(invalid)?;
        let (quarter, year) = rest
            .split_once(['-', ' ', '/', '_'])
            .ok_or_else(invalid)?;
        let quarter: i64 = quarter.trim().parse().map_err(|_| invalid())?;
        let year: i64 = year.trim().parse().map_err(|_| invalid())?;
        Self::new(year, quarter)
    }
}

/// A period together with its ordered features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quarter {
    pub period: Period,
    pub features: Vec<Feature>,
}

impl Quarter {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            features: Vec::new(),
        }
    }

    pub fn year(&self) -> i32 {
        self.period.year()
    }

    pub fn quarter(&self) -> u8 {
        self.period.quarter()
    }

    pub fn name(&self) -> String {
        self.period.name()
    }

    pub fn date_range(&self) -> String {
        self.period.date_range()
    }
}
