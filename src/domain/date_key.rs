use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar day, independent of time zone and time of day.
///
/// Field order matters: the derived `Ord` compares year, then month, then day.
/// A key may hold a triple that is not a real date (April 31st); use
/// [`DateKey::is_valid`] or [`DateKey::to_native`] before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateKey {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_native(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn is_valid(self) -> bool {
        self.to_native().is_some()
    }

    /// Same year and month, ignoring the day.
    pub fn same_month(self, other: DateKey) -> bool {
        self.year == other.year && self.month == other.month
    }

    pub fn first_of_month(self) -> Self {
        Self::new(self.year, self.month, 1)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))?;
        Ok(date.into())
    }
}

impl TryFrom<String> for DateKey {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// Parse an optional `YYYY-MM-DD` argument, falling back to `default`.
pub fn parse_date_arg(arg: Option<&str>, default: DateKey) -> Result<DateKey> {
    match arg {
        Some(text) => text
            .parse()
            .map_err(|e| anyhow!("Could not read date argument: {}", e)),
        None => Ok(default),
    }
}
