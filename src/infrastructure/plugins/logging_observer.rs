use crate::domain::{CellFlags, DateKey, ScopeState};
use crate::infrastructure::CalendarObserver;
use log::{debug, info, trace};

/// Observer that writes every calendar notification to the log.
pub struct LoggingObserver;

impl CalendarObserver for LoggingObserver {
    fn on_page_change(&self, anchor: DateKey, animated: bool) {
        info!("Page changed to {} (animated: {})", anchor, animated);
    }

    fn on_scope_change(&self, scope: ScopeState, target_height: f32) {
        info!("Scope changed to {} at height {:.1}", scope, target_height);
    }

    fn on_height_change(&self, target_height: f32) {
        debug!("Height directive {:.1}", target_height);
    }

    fn on_date_selected(&self, date: DateKey) {
        info!("Date selected: {}", date);
    }

    fn on_cell_render_update(&self, date: DateKey, flags: CellFlags) {
        trace!(
            "Cell {} event={} selected={} today={}",
            date, flags.has_event, flags.is_selected, flags.is_today
        );
    }

    fn name(&self) -> &str {
        "Logging"
    }
}
