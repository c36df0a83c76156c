use crate::domain::{Calendar, DateKey};
use crate::infrastructure::CalendarObserver;
use std::cell::RefCell;
use std::rc::Rc;

/// Keeps a page header label ("March 2025") in sync with page changes.
///
/// The label lives behind a shared handle so the view that draws it can read
/// the latest text after the observer has been moved into the registry.
pub struct HeaderLabelObserver {
    calendar: Calendar,
    pattern: String,
    label: Rc<RefCell<String>>,
}

impl HeaderLabelObserver {
    pub fn new(calendar: Calendar, pattern: impl Into<String>, initial: DateKey) -> Self {
        let pattern = pattern.into();
        let label = calendar.format_header(initial, &pattern);
        Self {
            calendar,
            pattern,
            label: Rc::new(RefCell::new(label)),
        }
    }

    pub fn handle(&self) -> Rc<RefCell<String>> {
        Rc::clone(&self.label)
    }
}

impl CalendarObserver for HeaderLabelObserver {
    fn on_page_change(&self, anchor: DateKey, _animated: bool) {
        *self.label.borrow_mut() = self.calendar.format_header(anchor, &self.pattern);
    }

    fn name(&self) -> &str {
        "Header Label"
    }
}
