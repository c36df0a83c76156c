//! Calendar-correct date arithmetic over [`DateKey`]s.
//!
//! Everything here is pure. The only configuration is the first day of the
//! week, which is injected when the [`Calendar`] is built.

use crate::domain::{CellPosition, DateKey, DateRange, GridCell};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::fmt::Write;

pub const DEFAULT_HEADER_FORMAT: &str = "%B %Y";

/// Number of days in `month`, or 0 when `month` is out of range.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn start_of_day(moment: NaiveDateTime) -> NaiveDateTime {
    moment.date().and_time(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    first_weekday: Weekday,
}

impl Calendar {
    pub fn new(first_weekday: Weekday) -> Self {
        Self { first_weekday }
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    pub fn to_date_key(&self, date: NaiveDate) -> DateKey {
        date.into()
    }

    pub fn to_native_date(&self, key: DateKey) -> Option<NaiveDate> {
        key.to_native()
    }

    /// Shift by whole months, clamping the day into the target month.
    pub fn add_months(&self, key: DateKey, delta: i32) -> DateKey {
        let index = key.year * 12 + (key.month as i32 - 1) + delta;
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        let day = key.day.clamp(1, days_in_month(year, month));
        DateKey::new(year, month, day)
    }

    pub fn add_years(&self, key: DateKey, delta: i32) -> DateKey {
        self.add_months(key, delta * 12)
    }

    pub fn add_days(&self, key: DateKey, delta: i64) -> Option<DateKey> {
        let date = key.to_native()?;
        date.checked_add_signed(Duration::days(delta)).map(DateKey::from)
    }

    /// First day of the week containing `key`.
    pub fn week_start(&self, key: DateKey) -> Option<DateKey> {
        let date = key.to_native()?;
        let weekday = date.weekday().num_days_from_sunday() as i64;
        let first = self.first_weekday.num_days_from_sunday() as i64;
        let offset = (weekday - first + 7) % 7;
        Some((date - Duration::days(offset)).into())
    }

    pub fn is_same_week(&self, a: DateKey, b: DateKey) -> bool {
        match (self.week_start(a), self.week_start(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn month_range(&self, key: DateKey) -> Option<DateRange> {
        DateRange::month(key.year, key.month)
    }

    /// Whole months from `from` to `to`; negative when `to` is earlier.
    pub fn months_between(&self, from: DateKey, to: DateKey) -> i32 {
        (to.year - from.year) * 12 + to.month as i32 - from.month as i32
    }

    /// Six full weeks covering the month of `anchor`, head and tail filled
    /// with placeholder days from the adjacent months.
    pub fn month_grid(&self, anchor: DateKey) -> Vec<GridCell> {
        let first = anchor.first_of_month();
        let Some(start) = self.week_start(first).and_then(DateKey::to_native) else {
            return Vec::new();
        };

        (0..42)
            .map(|i| {
                let date = DateKey::from(start + Duration::days(i));
                let position = if date.same_month(first) {
                    CellPosition::Current
                } else if date < first {
                    CellPosition::Previous
                } else {
                    CellPosition::Next
                };
                GridCell { date, position }
            })
            .collect()
    }

    /// The seven days of the week containing `anchor`.
    pub fn week_strip(&self, anchor: DateKey) -> Vec<GridCell> {
        let Some(start) = self.week_start(anchor).and_then(DateKey::to_native) else {
            return Vec::new();
        };

        (0..7)
            .map(|i| GridCell {
                date: DateKey::from(start + Duration::days(i)),
                position: CellPosition::Current,
            })
            .collect()
    }

    /// Weekday column headers in display order.
    pub fn weekday_labels(&self) -> Vec<Weekday> {
        let mut day = self.first_weekday;
        (0..7)
            .map(|_| {
                let current = day;
                day = day.succ();
                current
            })
            .collect()
    }

    /// Header label for a page, falling back to `YYYY-MM` on a bad pattern.
    pub fn format_header(&self, key: DateKey, pattern: &str) -> String {
        let Some(date) = key.first_of_month().to_native() else {
            return format!("{:04}-{:02}", key.year, key.month);
        };

        let mut label = String::new();
        match write!(label, "{}", date.format(pattern)) {
            Ok(()) => label,
            Err(_) => date.format("%Y-%m").to_string(),
        }
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Weekday::Sun)
    }
}

/// Largest accepted `page_year_span`.
pub const MAX_PAGE_YEAR_SPAN: i32 = 1000;

/// Navigation limits: January 1st `span` years back through December 31st
/// `span` years ahead of today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub min: DateKey,
    pub max: DateKey,
}

impl PageBounds {
    pub fn around(today: DateKey, span: i32) -> Self {
        let span = span.clamp(0, MAX_PAGE_YEAR_SPAN);
        Self {
            min: DateKey::new(today.year.saturating_sub(span), 1, 1),
            max: DateKey::new(today.year.saturating_add(span), 12, 31),
        }
    }

    pub fn clamp_day(&self, key: DateKey) -> DateKey {
        key.clamp(self.min, self.max)
    }

    pub fn clamp_month(&self, key: DateKey) -> DateKey {
        self.clamp_day(key.first_of_month()).first_of_month()
    }
}
