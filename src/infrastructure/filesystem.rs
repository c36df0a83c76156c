use crate::domain::{DateKey, DateRange};
use crate::infrastructure::{EventDateSource, ScheduledEvent};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Event source backed by a JSON array of `{ "date", "title" }` records.
///
/// The file is re-read on every fetch so edits show up on the next refresh.
/// A missing file means no events.
pub struct JsonEventSource {
    path: PathBuf,
}

impl JsonEventSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> Result<Vec<ScheduledEvent>> {
        if !self.path.exists() {
            log::debug!("No event file at {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let events: Vec<ScheduledEvent> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse events in {}", self.path.display()))?;
        Ok(events)
    }
}

impl EventDateSource for JsonEventSource {
    fn fetch_dates(&self, range: &DateRange) -> Result<Vec<DateKey>> {
        let dates: BTreeSet<DateKey> = self
            .load()?
            .into_iter()
            .map(|event| event.date)
            .filter(|date| range.contains(*date))
            .collect();

        Ok(dates.into_iter().collect())
    }

    fn events_on(&self, date: DateKey) -> Result<Vec<ScheduledEvent>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|event| event.date == date)
            .collect())
    }
}
