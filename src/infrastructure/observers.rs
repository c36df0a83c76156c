use crate::domain::{CalendarNotification, CellFlags, DateKey, ScopeState};

/// Subscriber for notifications produced by the calendar state machine.
///
/// All callbacks default to no-ops so observers only implement what they
/// render.
pub trait CalendarObserver {
    fn on_page_change(&self, _anchor: DateKey, _animated: bool) {}

    fn on_scope_change(&self, _scope: ScopeState, _target_height: f32) {}

    /// Visual-only height directive from an in-progress scope drag
    fn on_height_change(&self, _target_height: f32) {}

    fn on_date_selected(&self, _date: DateKey) {}

    fn on_cell_render_update(&self, _date: DateKey, _flags: CellFlags) {}

    /// Human-readable name for this observer
    fn name(&self) -> &str;
}

/// Registry fanning notifications out to every observer, in registration order.
pub struct ObserverRegistry {
    observers: Vec<Box<dyn CalendarObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn register<O>(&mut self, observer: O)
    where
        O: CalendarObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Deliver a batch of notifications, preserving their order.
    pub fn deliver(&self, notifications: &[CalendarNotification]) {
        for notification in notifications {
            for observer in &self.observers {
                Self::dispatch(observer.as_ref(), notification);
            }
        }
    }

    fn dispatch(observer: &dyn CalendarObserver, notification: &CalendarNotification) {
        match *notification {
            CalendarNotification::PageChanged { anchor, animated } => {
                observer.on_page_change(anchor, animated)
            }
            CalendarNotification::ScopeChanged {
                scope,
                target_height,
            } => observer.on_scope_change(scope, target_height),
            CalendarNotification::HeightChanged { target_height } => {
                observer.on_height_change(target_height)
            }
            CalendarNotification::DateSelected(date) => observer.on_date_selected(date),
            CalendarNotification::CellRenderUpdate { date, flags } => {
                observer.on_cell_render_update(date, flags)
            }
        }
    }

    pub fn list_observers(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
