use crate::domain::DateKey;
use chrono::{Duration, NaiveDate};

/// Inclusive span of days, e.g. the visible page or a fetch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateKey,
    pub end: DateKey,
}

impl DateRange {
    pub fn new(start: DateKey, end: DateKey) -> Self {
        Self { start, end }
    }

    pub fn week(start_of_week: DateKey) -> Option<Self> {
        let start = start_of_week.to_native()?;
        let end = start + Duration::days(6);
        Some(Self {
            start: start_of_week,
            end: end.into(),
        })
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }?
        .pred_opt()?;

        Some(Self {
            start: start.into(),
            end: end.into(),
        })
    }

    pub fn contains(&self, date: DateKey) -> bool {
        date >= self.start && date <= self.end
    }
}
