//! Calendar arithmetic: months, month-grid layout, and lenient input parsing.
//!
//! Nothing here touches storage. These helpers back the day record store's
//! monthly aggregation and give the presentation layer the numbers it needs to
//! lay out a month.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

/// A calendar month of a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Creates a month, rejecting months outside 1-12 and years chrono cannot represent.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(Error::InvalidMonth { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date.with_day0(0).unwrap_or(date),
        }
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.first.year()
    }

    /// Month number, 1-12.
    #[must_use]
    pub fn month(self) -> u32 {
        self.first.month()
    }

    /// Number of days in the month (28-31).
    #[must_use]
    pub fn length(self) -> u32 {
        match self.month() {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ if self.first.leap_year() => 29,
            _ => 28,
        }
    }

    /// Day 1 of the month.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first
    }

    /// The last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.days().last().unwrap_or(self.first)
    }

    /// Every day of the month, in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let month = self.month();
        self.first.iter_days().take_while(move |d| d.month() == month)
    }

    /// The following month.
    pub fn next(self) -> Result<Self> {
        match self.month() {
            12 => Self::new(self.year() + 1, 1),
            m => Self::new(self.year(), m + 1),
        }
    }

    /// The preceding month.
    pub fn previous(self) -> Result<Self> {
        match self.month() {
            1 => Self::new(self.year() - 1, 12),
            m => Self::new(self.year(), m - 1),
        }
    }

    /// Blank cells before day 1 in a seven-column grid whose first column is `week_start`.
    #[must_use]
    pub fn grid_offset(self, week_start: Weekday) -> u32 {
        let first = self.first.weekday().num_days_from_monday();
        (first + 7 - week_start.num_days_from_monday()) % 7
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let parse_error = || Error::Parse {
            message: format!("expected YYYY-MM, got '{s}'"),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(parse_error)?;
        let year = year.parse().map_err(|_| parse_error())?;
        let month = month.parse().map_err(|_| parse_error())?;
        Self::new(year, month)
    }
}

/// Parses a user-entered amount. Blank, non-numeric, or non-finite input reads as zero.
#[must_use]
pub fn parse_amount(text: &str) -> f32 {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Profit for a single day from raw input text.
#[must_use]
pub fn day_profit(earnings: &str, spendings: &str) -> f32 {
    parse_amount(earnings) - parse_amount(spendings)
}

/// Formats a date as `dd.MM.yyyy`, e.g. `05.01.2024`.
#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
