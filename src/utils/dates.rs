//! Date range utilities
//!
//! Inclusive calendar ranges used for study periods and named presets.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting an end before the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::Config(format!(
                "date range ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// The range covering whole calendar years `first..=last`
    pub fn years(first: i32, last: i32) -> Result<Self> {
        let start = year_start(first)?;
        let end = year_end(last)?;
        Self::new(start, end)
    }

    /// Whether the date falls inside the range
    #[must_use]
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Number of days between start and end
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Every date of the range, in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Calendar years touched by the range
    pub fn year_span(&self) -> std::ops::RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Inclusive integer range parsed from `"a-b"` (ages or years)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanFilter {
    pub min: u32,
    pub max: u32,
}

impl SpanFilter {
    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Suffix used in output file names, e.g. `ages_60_100`
    #[must_use]
    pub fn file_suffix(&self, prefix: &str) -> String {
        format!("{prefix}_{}_{}", self.min, self.max)
    }
}

impl FromStr for SpanFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| Error::Config(format!("expected `min-max`, got `{s}`")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| Error::Config(format!("invalid bound `{v}` in `{s}`: {e}")))
        };
        let (min, max) = (parse(min)?, parse(max)?);
        if max < min {
            return Err(Error::Config(format!("empty range `{s}`")));
        }
        Ok(Self { min, max })
    }
}

/// First day of a year
pub fn year_start(year: i32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| Error::Config(format!("invalid year {year}")))
}

/// Last day of a year
pub fn year_end(year: i32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| Error::Config(format!("invalid year {year}")))
}

/// Shift a date by a signed number of days, saturating at the calendar bounds
#[must_use]
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}
