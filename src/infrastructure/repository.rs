use crate::domain::{DateKey, DateRange};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One scheduled item as stored by an event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub date: DateKey,
    #[serde(default)]
    pub title: String,
}

/// Collaborator that knows which days carry events.
pub trait EventDateSource: Send + Sync {
    /// Distinct event days inside `range`, ascending.
    fn fetch_dates(&self, range: &DateRange) -> Result<Vec<DateKey>>;

    fn events_on(&self, date: DateKey) -> Result<Vec<ScheduledEvent>>;
}
