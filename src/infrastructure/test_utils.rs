/// Test utilities shared by the calendar tests
///
/// `TestEventFile` writes a throwaway events file inside a temp directory that
/// is removed when the value is dropped. `RecordingObserver` keeps every
/// notification it receives so tests can assert on what a transition emitted.
///
/// ## Usage Examples
///
/// ```ignore
/// use crate::infrastructure::test_utils::test_harness::{RecordingObserver, TestEventFile};
///
/// #[test]
/// fn my_test() {
///     let file = TestEventFile::with_events(&[("2025-03-05", "Team dinner")]);
///     let source = JsonEventSource::new(file.path());
///
///     let observer = RecordingObserver::new("recorder");
///     let log = observer.log();
///     // Register the observer, drive the machine, inspect `log.borrow()`...
/// }
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::domain::{CalendarNotification, CellFlags, DateKey, ScopeState};
    use crate::infrastructure::{CalendarObserver, ScheduledEvent};
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::TempDir;

    pub struct TestEventFile {
        _temp_dir: TempDir, // Keep temp dir alive
        path: PathBuf,
    }

    impl TestEventFile {
        /// Directory without an events file
        pub fn empty() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp directory");
            let path = temp_dir.path().join("events.json");
            Self {
                _temp_dir: temp_dir,
                path,
            }
        }

        pub fn with_events(events: &[(&str, &str)]) -> Self {
            let events: Vec<ScheduledEvent> = events
                .iter()
                .map(|(date, title)| ScheduledEvent {
                    date: date.parse().expect("Invalid fixture date"),
                    title: title.to_string(),
                })
                .collect();
            let json = serde_json::to_string_pretty(&events).expect("Failed to encode fixture");
            Self::with_raw(&json)
        }

        pub fn with_raw(content: &str) -> Self {
            let file = Self::empty();
            std::fs::write(&file.path, content).expect("Failed to write fixture");
            file
        }

        pub fn path(&self) -> PathBuf {
            self.path.clone()
        }

        pub fn dir(&self) -> &Path {
            self._temp_dir.path()
        }
    }

    /// Observer that records every notification in delivery order
    pub struct RecordingObserver {
        name: String,
        log: Rc<RefCell<Vec<CalendarNotification>>>,
    }

    impl RecordingObserver {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                log: Rc::new(RefCell::new(Vec::new())),
            }
        }

        /// Shared handle to the recorded notifications
        pub fn log(&self) -> Rc<RefCell<Vec<CalendarNotification>>> {
            Rc::clone(&self.log)
        }
    }

    impl CalendarObserver for RecordingObserver {
        fn on_page_change(&self, anchor: DateKey, animated: bool) {
            self.log
                .borrow_mut()
                .push(CalendarNotification::PageChanged { anchor, animated });
        }

        fn on_scope_change(&self, scope: ScopeState, target_height: f32) {
            self.log.borrow_mut().push(CalendarNotification::ScopeChanged {
                scope,
                target_height,
            });
        }

        fn on_height_change(&self, target_height: f32) {
            self.log
                .borrow_mut()
                .push(CalendarNotification::HeightChanged { target_height });
        }

        fn on_date_selected(&self, date: DateKey) {
            self.log
                .borrow_mut()
                .push(CalendarNotification::DateSelected(date));
        }

        fn on_cell_render_update(&self, date: DateKey, flags: CellFlags) {
            self.log
                .borrow_mut()
                .push(CalendarNotification::CellRenderUpdate { date, flags });
        }

        fn name(&self) -> &str {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::domain::{CalendarMachine, CalendarOptions, DateKey, GridEvent};
    use chrono::NaiveDate;

    #[test]
    fn observer_sees_what_the_machine_returns() {
        let observer = RecordingObserver::new("recorder");
        let log = observer.log();

        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let mut machine = CalendarMachine::new(today, CalendarOptions::default());
        machine.register_observer(observer);

        let returned = machine.handle(GridEvent::FocusDate {
            date: DateKey::new(2025, 3, 4),
        });
        assert!(!returned.is_empty());
        assert_eq!(*log.borrow(), returned);
    }

    #[test]
    fn event_file_is_removed_with_harness() {
        let file = TestEventFile::with_events(&[("2025-03-05", "Team dinner")]);
        let path = file.path();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());
    }
}
