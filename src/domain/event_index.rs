use crate::domain::{DateKey, DateRange};
use std::collections::BTreeSet;

/// Days carrying at least one event, as delivered by the last fetch.
///
/// Built once per fetch and never edited afterwards; a new fetch produces a
/// new index that replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDateIndex {
    dates: BTreeSet<DateKey>,
}

impl EventDateIndex {
    pub fn build<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = DateKey>,
    {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn contains(&self, date: DateKey) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Earliest event day inside `range`.
    pub fn earliest_within(&self, range: &DateRange) -> Option<DateKey> {
        if range.start > range.end {
            return None;
        }
        self.dates.range(range.start..=range.end).next().copied()
    }

    pub fn next_on_or_after(&self, date: DateKey) -> Option<DateKey> {
        self.dates.range(date..).next().copied()
    }
}
