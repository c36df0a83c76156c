use crate::application::Config;
use crate::domain::{
    CalendarMachine, CalendarNotification, CalendarSnapshot, DateKey, DateRange, GridEvent,
    ScopeState, project_page,
};
use crate::infrastructure::{
    EventDateSource, EventFetcher, HeaderLabelObserver, JsonEventSource, LoggingObserver,
    ScheduledEvent,
};
use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

const BLOCKING_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Wires the calendar machine to its event source and observers.
pub struct CalendarApp {
    pub config: Config,
    machine: CalendarMachine,
    fetcher: EventFetcher,
    /// Range of the most recent fetch request.
    last_fetch: Option<DateRange>,
    header: Rc<RefCell<String>>,
}

impl CalendarApp {
    pub fn new(config: Config, today: NaiveDate) -> Result<Self> {
        let mut app = Self::without_plugins(config, today)?;
        app.machine.register_observer(LoggingObserver);
        info!(
            "Calendar observers: {}",
            app.machine.observers().list_observers().join(", ")
        );
        Ok(app)
    }

    /// App with only the header label observer, which the views need.
    pub fn without_plugins(config: Config, today: NaiveDate) -> Result<Self> {
        let options = config.settings.to_options()?;
        let source = JsonEventSource::new(config.events_file.clone());
        let mut machine = CalendarMachine::new(today, options);

        let header = HeaderLabelObserver::new(
            *machine.calendar(),
            config.settings.header_format.clone(),
            machine.snapshot().visible_page_anchor,
        );
        let label = header.handle();
        machine.register_observer(header);

        Ok(Self {
            config,
            machine,
            fetcher: EventFetcher::new(Arc::new(source)),
            last_fetch: None,
            header: label,
        })
    }

    pub fn machine(&self) -> &CalendarMachine {
        &self.machine
    }

    pub fn snapshot(&self) -> &CalendarSnapshot {
        self.machine.snapshot()
    }

    pub fn header(&self) -> String {
        self.header.borrow().clone()
    }

    /// Reset the machine for `today` and start loading event dates.
    pub fn activate(&mut self, today: NaiveDate) -> Vec<CalendarNotification> {
        let out = self.machine.activate(today);
        self.refresh_events();
        out
    }

    /// Forward a grid event. A page change refetches event dates only when
    /// it moved the fetch window.
    pub fn dispatch(&mut self, event: GridEvent) -> Vec<CalendarNotification> {
        let out = self.machine.handle(event);
        let page_changed = out
            .iter()
            .any(|n| matches!(n, CalendarNotification::PageChanged { .. }));
        if page_changed && self.last_fetch != Some(fetch_range(&self.machine)) {
            self.refresh_events();
        }
        out
    }

    /// Start a background fetch of every event date inside the page bounds.
    pub fn refresh_events(&mut self) -> u64 {
        let range = fetch_range(&self.machine);
        self.last_fetch = Some(range);
        self.fetcher.request(range)
    }

    /// Apply a finished fetch, if any. Returns true when the index changed.
    pub fn poll_events(&mut self) -> bool {
        match self.fetcher.poll() {
            Some(dates) => {
                self.machine.notify_event_dates(dates);
                true
            }
            None => false,
        }
    }

    /// Fetch and apply event dates before returning, for one-shot commands.
    pub fn load_events_blocking(&mut self) -> bool {
        self.refresh_events();
        match self.fetcher.wait(BLOCKING_FETCH_TIMEOUT) {
            Some(dates) => {
                self.machine.notify_event_dates(dates);
                true
            }
            None => false,
        }
    }

    pub fn events_on(&self, date: DateKey) -> Result<Vec<ScheduledEvent>> {
        self.fetcher.source().events_on(date)
    }

    /// Show the month containing `date` (Month scope only).
    pub fn show_month(&mut self, date: DateKey) -> Vec<CalendarNotification> {
        if self.machine.snapshot().scope == ScopeState::Week {
            self.dispatch(GridEvent::ScopeToggle);
        }
        self.dispatch(GridEvent::PageSwipe {
            anchor: date.first_of_month(),
        })
    }

    /// First event date on or after `from`, revealed in Week scope.
    pub fn next_event(&mut self, from: DateKey) -> Option<DateKey> {
        let out = self.machine.handle(GridEvent::RevealNextEvent { from });
        let next = out.iter().find_map(|n| match n {
            CalendarNotification::DateSelected(date) => Some(*date),
            _ => None,
        });
        if let Some(date) = next {
            info!("Next event after {} is on {}", from, date);
        }
        next
    }

    /// Plain-text rendering of the visible page, one week per line.
    ///
    /// Days with events carry a `*`, today is bracketed and placeholder days
    /// from neighbouring months are left blank.
    pub fn render_page_text(&self) -> String {
        let calendar = self.machine.calendar();
        let mut text = String::new();

        let _ = writeln!(text, "{:^27}", self.header());
        let labels: Vec<String> = calendar
            .weekday_labels()
            .iter()
            .map(|weekday| format!("{:>3}", &weekday.to_string()[..2]))
            .collect();
        let _ = writeln!(text, "{}", labels.join(" ").trim_end());

        let page = project_page(self.machine.snapshot(), calendar);
        for week in page.chunks(7) {
            let cells: Vec<String> = week
                .iter()
                .map(|(cell, flags)| {
                    if cell.position.is_placeholder() {
                        return "   ".to_string();
                    }
                    let marker = if flags.has_event { "*" } else { " " };
                    if flags.is_today {
                        format!("[{}]{}", cell.date.day, marker)
                    } else {
                        format!("{:>2}{}", cell.date.day, marker)
                    }
                })
                .map(|cell| format!("{:>3}", cell))
                .collect();
            let _ = writeln!(text, "{}", cells.join(" ").trim_end());
        }

        text
    }
}

/// Dates to load: the whole navigable span, so next-event lookups can reach
/// past the visible page.
pub fn fetch_range(machine: &CalendarMachine) -> DateRange {
    let bounds = machine.bounds();
    DateRange::new(bounds.min, bounds.max)
}

/// Today as seen by the local clock.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
