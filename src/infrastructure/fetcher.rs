use crate::domain::{DateKey, DateRange};
use crate::infrastructure::EventDateSource;
use anyhow::Result;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

struct FetchResult {
    generation: u64,
    range: DateRange,
    dates: Result<Vec<DateKey>>,
}

/// Runs event-date fetches off the UI thread and hands results back through a
/// channel.
///
/// Only the newest request counts: results from superseded requests are
/// dropped when they arrive. Failed fetches are logged and yield nothing, so
/// the caller keeps its previous event dates.
pub struct EventFetcher {
    source: Arc<dyn EventDateSource>,
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
    generation: u64,
}

impl EventFetcher {
    pub fn new(source: Arc<dyn EventDateSource>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source,
            sender,
            receiver,
            generation: 0,
        }
    }

    pub fn source(&self) -> &Arc<dyn EventDateSource> {
        &self.source
    }

    /// Start a fetch for `range`, superseding any request still in flight.
    pub fn request(&mut self, range: DateRange) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();

        debug!("Fetch #{} requested for {}..={}", generation, range.start, range.end);
        thread::spawn(move || {
            let dates = source.fetch_dates(&range);
            // The receiver is gone once the view shuts down.
            let _ = sender.send(FetchResult {
                generation,
                range,
                dates,
            });
        });

        generation
    }

    /// Drain finished fetches without blocking; returns the newest dates.
    pub fn poll(&mut self) -> Option<Vec<DateKey>> {
        let mut latest = None;
        while let Ok(result) = self.receiver.try_recv() {
            if let Some(dates) = self.accept(result) {
                latest = Some(dates);
            }
        }
        latest
    }

    /// Block until the newest request finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<Vec<DateKey>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(result) => {
                    let current = result.generation == self.generation;
                    let dates = self.accept(result);
                    if current {
                        return dates;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("Fetch #{} did not finish in {:?}", self.generation, timeout);
                    return None;
                }
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&self, result: FetchResult) -> Option<Vec<DateKey>> {
        if result.generation != self.generation {
            debug!(
                "Dropping stale fetch #{} (current #{})",
                result.generation, self.generation
            );
            return None;
        }

        match result.dates {
            Ok(dates) => {
                debug!(
                    "Fetch #{} returned {} dates for {}..={}",
                    result.generation,
                    dates.len(),
                    result.range.start,
                    result.range.end
                );
                Some(dates)
            }
            Err(e) => {
                warn!("Event fetch #{} failed: {:#}", result.generation, e);
                None
            }
        }
    }
}
