//! Three-column year / month / day picker over a bounded date span.
//!
//! The rows of each column depend on the columns to its left: picking a year
//! changes which months exist, and picking a year or month changes which days
//! exist. After every change the selection is pulled back inside the new rows.

use crate::domain::{DateKey, days_in_month};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerColumn {
    Year,
    Month,
    Day,
}

impl PickerColumn {
    pub fn next(self) -> Self {
        match self {
            PickerColumn::Year => PickerColumn::Month,
            PickerColumn::Month => PickerColumn::Day,
            PickerColumn::Day => PickerColumn::Day,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            PickerColumn::Year => PickerColumn::Year,
            PickerColumn::Month => PickerColumn::Year,
            PickerColumn::Day => PickerColumn::Month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePicker {
    min: DateKey,
    max: DateKey,
    years: Vec<i32>,
    months: Vec<u32>,
    days: Vec<u32>,
    selected: DateKey,
}

impl DatePicker {
    /// Picker limited to `[min, max]`, starting at `initial` (clamped).
    pub fn bounded(min: DateKey, max: DateKey, initial: DateKey) -> Option<Self> {
        if !min.is_valid() || !max.is_valid() || min > max {
            return None;
        }

        let mut picker = Self {
            min,
            max,
            years: (min.year..=max.year).collect(),
            months: Vec::new(),
            days: Vec::new(),
            selected: initial,
        };
        picker.revalidate();
        Some(picker)
    }

    /// Today through the end of the year `year_span` years ahead; past dates
    /// are never offered.
    pub fn future_only(today: DateKey, year_span: i32) -> Option<Self> {
        let max = DateKey::new(today.year + year_span.max(0), 12, 31);
        Self::bounded(today, max, today)
    }

    pub fn selected(&self) -> DateKey {
        self.selected
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    pub fn days(&self) -> &[u32] {
        &self.days
    }

    pub fn rows(&self, column: PickerColumn) -> usize {
        match column {
            PickerColumn::Year => self.years.len(),
            PickerColumn::Month => self.months.len(),
            PickerColumn::Day => self.days.len(),
        }
    }

    pub fn selected_row(&self, column: PickerColumn) -> usize {
        let row = match column {
            PickerColumn::Year => self.years.iter().position(|y| *y == self.selected.year),
            PickerColumn::Month => self.months.iter().position(|m| *m == self.selected.month),
            PickerColumn::Day => self.days.iter().position(|d| *d == self.selected.day),
        };
        row.unwrap_or(0)
    }

    pub fn select_year(&mut self, year: i32) {
        self.selected.year = year;
        self.revalidate();
    }

    pub fn select_month(&mut self, month: u32) {
        self.selected.month = month;
        self.revalidate();
    }

    pub fn select_day(&mut self, day: u32) {
        self.selected.day = day;
        self.revalidate();
    }

    pub fn set_selected(&mut self, date: DateKey) {
        self.selected = date;
        self.revalidate();
    }

    /// Move `delta` rows within `column`, stopping at the first and last row.
    pub fn step(&mut self, column: PickerColumn, delta: i32) {
        let rows = self.rows(column);
        if rows == 0 {
            return;
        }
        let row = (self.selected_row(column) as i64 + delta as i64)
            .clamp(0, rows as i64 - 1) as usize;

        match column {
            PickerColumn::Year => self.select_year(self.years[row]),
            PickerColumn::Month => self.select_month(self.months[row]),
            PickerColumn::Day => self.select_day(self.days[row]),
        }
    }

    fn revalidate(&mut self) {
        let (min, max) = (self.min, self.max);

        let year = self.selected.year.clamp(min.year, max.year);
        let first_month = if year == min.year { min.month } else { 1 };
        let last_month = if year == max.year { max.month } else { 12 };
        self.months = (first_month..=last_month).collect();
        let month = self.selected.month.clamp(first_month, last_month);

        let first_day = if (year, month) == (min.year, min.month) {
            min.day
        } else {
            1
        };
        let last_day = if (year, month) == (max.year, max.month) {
            max.day
        } else {
            days_in_month(year, month)
        };
        self.days = (first_day..=last_day).collect();
        let day = self.selected.day.clamp(first_day, last_day);

        self.selected = DateKey::new(year, month, day);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::new(y, m, d)
    }

    fn picker() -> DatePicker {
        DatePicker::future_only(key(2025, 6, 15), 10).unwrap()
    }

    #[test]
    fn future_only_starts_at_today() {
        let p = picker();
        assert_eq!(p.selected(), key(2025, 6, 15));
        assert_eq!(p.years().first(), Some(&2025));
        assert_eq!(p.years().last(), Some(&2035));
        assert_eq!(p.months(), &[6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(p.days().first(), Some(&15));
        assert_eq!(p.days().last(), Some(&30));
    }

    #[test]
    fn later_year_opens_every_month() {
        let mut p = picker();
        p.select_year(2026);
        assert_eq!(p.months().len(), 12);
        assert_eq!(p.days().len(), 30);
        assert_eq!(p.selected(), key(2026, 6, 15));
    }

    #[test]
    fn day_is_clamped_to_month_length() {
        let mut p = picker();
        p.set_selected(key(2026, 1, 31));
        assert_eq!(p.selected(), key(2026, 1, 31));
        p.select_month(2);
        assert_eq!(p.selected(), key(2026, 2, 28));
        assert_eq!(p.days().len(), 28);
        p.select_year(2028);
        assert_eq!(p.selected(), key(2028, 2, 28));
        assert_eq!(p.days().len(), 29);
    }

    #[test]
    fn returning_to_current_year_snaps_past_months() {
        let mut p = picker();
        p.set_selected(key(2027, 2, 3));
        p.select_year(2025);
        assert_eq!(p.selected(), key(2025, 6, 15));
        assert_eq!(p.days().first(), Some(&15));
    }

    #[test]
    fn step_stops_at_edges() {
        let mut p = picker();
        p.step(PickerColumn::Month, -3);
        assert_eq!(p.selected().month, 6);
        p.step(PickerColumn::Month, 2);
        assert_eq!(p.selected(), key(2025, 8, 15));
        assert_eq!(p.days().first(), Some(&1));
        p.step(PickerColumn::Day, 100);
        assert_eq!(p.selected(), key(2025, 8, 31));
        assert_eq!(p.selected_row(PickerColumn::Day), 30);
    }

    #[test]
    fn bounded_rejects_inverted_or_invalid_bounds() {
        assert!(DatePicker::bounded(key(2025, 2, 1), key(2025, 1, 1), key(2025, 1, 1)).is_none());
        assert!(DatePicker::bounded(key(2025, 2, 30), key(2025, 3, 1), key(2025, 3, 1)).is_none());

        let p = DatePicker::bounded(key(2015, 1, 1), key(2035, 12, 31), key(2040, 7, 4)).unwrap();
        assert_eq!(p.selected(), key(2035, 7, 4));
    }
}
