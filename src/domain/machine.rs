use crate::domain::{
    Calendar, CalendarNotification, CellPosition, DateKey, DateRange, DragPhase, EventDateIndex,
    GridCell, GridEvent, PageBounds, ScopeMetrics, ScopeState, project, project_page,
};
use crate::infrastructure::{CalendarObserver, ObserverRegistry};
use chrono::{NaiveDate, Weekday};
use log::{debug, info, warn};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarOptions {
    pub first_weekday: Weekday,
    /// Years of navigation allowed on either side of today.
    pub page_year_span: i32,
    pub metrics: ScopeMetrics,
    /// Fraction of the month/week height span a drag must cover to commit.
    pub drag_commit_threshold: f32,
    /// In-progress drag reports closer together than this are dropped.
    pub drag_debounce_ms: u64,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            first_weekday: Weekday::Sun,
            page_year_span: 10,
            metrics: ScopeMetrics::default(),
            drag_commit_threshold: 0.5,
            drag_debounce_ms: 100,
        }
    }
}

/// Externally visible state of the calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSnapshot {
    pub scope: ScopeState,
    /// First of the month in Month scope, any day of the week in Week scope.
    pub visible_page_anchor: DateKey,
    pub selected_date: Option<DateKey>,
    pub today_date: DateKey,
    pub event_dates: Arc<EventDateIndex>,
}

impl CalendarSnapshot {
    pub fn fresh(today: DateKey) -> Self {
        Self {
            scope: ScopeState::Month,
            visible_page_anchor: today.first_of_month(),
            selected_date: None,
            today_date: today,
            event_dates: Arc::new(EventDateIndex::default()),
        }
    }

    /// Days that belong to the page (placeholders excluded).
    pub fn visible_range(&self, calendar: &Calendar) -> Option<DateRange> {
        match self.scope {
            ScopeState::Month => calendar.month_range(self.visible_page_anchor),
            ScopeState::Week => calendar
                .week_start(self.visible_page_anchor)
                .and_then(DateRange::week),
        }
    }

    pub fn visible_cells(&self, calendar: &Calendar) -> Vec<GridCell> {
        match self.scope {
            ScopeState::Month => calendar.month_grid(self.visible_page_anchor),
            ScopeState::Week => calendar.week_strip(self.visible_page_anchor),
        }
    }
}

/// Month/week scope and page state machine.
///
/// Every inbound call applies one transition synchronously, hands the
/// resulting notifications to the registered observers, and returns them.
pub struct CalendarMachine {
    snapshot: CalendarSnapshot,
    calendar: Calendar,
    options: CalendarOptions,
    bounds: PageBounds,
    observers: ObserverRegistry,
    last_drag_report_ms: Option<u64>,
}

impl CalendarMachine {
    pub fn new(today: NaiveDate, options: CalendarOptions) -> Self {
        let today = DateKey::from(today);
        Self {
            snapshot: CalendarSnapshot::fresh(today),
            calendar: Calendar::new(options.first_weekday),
            bounds: PageBounds::around(today, options.page_year_span),
            options,
            observers: ObserverRegistry::new(),
            last_drag_report_ms: None,
        }
    }

    pub fn register_observer<O>(&mut self, observer: O)
    where
        O: CalendarObserver + 'static,
    {
        self.observers.register(observer);
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn snapshot(&self) -> &CalendarSnapshot {
        &self.snapshot
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn options(&self) -> &CalendarOptions {
        &self.options
    }

    pub fn bounds(&self) -> PageBounds {
        self.bounds
    }

    pub fn visible_range(&self) -> Option<DateRange> {
        self.snapshot.visible_range(&self.calendar)
    }

    pub fn target_height(&self) -> f32 {
        self.options.metrics.target_height(self.snapshot.scope)
    }

    /// Rebuild the snapshot from scratch for a (re)activated screen.
    pub fn activate(&mut self, today: NaiveDate) -> Vec<CalendarNotification> {
        let today = DateKey::from(today);
        info!("Activating calendar for {}", today);

        self.snapshot = CalendarSnapshot::fresh(today);
        self.bounds = PageBounds::around(today, self.options.page_year_span);
        self.last_drag_report_ms = None;

        let mut out = vec![
            CalendarNotification::ScopeChanged {
                scope: ScopeState::Month,
                target_height: self.target_height(),
            },
            CalendarNotification::PageChanged {
                anchor: self.snapshot.visible_page_anchor,
                animated: false,
            },
        ];
        self.render_page(&mut out);
        self.publish(out)
    }

    /// Clear the selection, e.g. when the screen is dismissed.
    pub fn reset(&mut self) -> Vec<CalendarNotification> {
        let mut out = Vec::new();
        if let Some(previous) = self.snapshot.selected_date.take() {
            debug!("Selection {} cleared", previous);
            self.render_days([previous], &mut out);
        }
        self.publish(out)
    }

    /// Replace the event index with a freshly fetched list.
    pub fn notify_event_dates<I>(&mut self, dates: I) -> Vec<CalendarNotification>
    where
        I: IntoIterator<Item = DateKey>,
    {
        let index = EventDateIndex::build(dates.into_iter().filter(|date| {
            let valid = date.is_valid();
            if !valid {
                warn!("Dropping unconstructible event date {}", date);
            }
            valid
        }));
        info!("Event index replaced with {} dates", index.len());
        self.snapshot.event_dates = Arc::new(index);

        let mut out = Vec::new();
        self.render_page(&mut out);
        self.publish(out)
    }

    /// Whether a scope drag in this direction may start. Month only collapses
    /// (upward, negative velocity); Week only expands.
    pub fn drag_allowed(&self, velocity_y: f32) -> bool {
        match self.snapshot.scope {
            ScopeState::Month => velocity_y < 0.0,
            ScopeState::Week => velocity_y > 0.0,
        }
    }

    pub fn handle(&mut self, event: GridEvent) -> Vec<CalendarNotification> {
        debug!("Handling {:?} in {} scope", event, self.snapshot.scope);
        let mut out = Vec::new();

        match event {
            GridEvent::CellTap { date, position } => {
                if Self::accept(date, "cell tap") {
                    self.on_cell_tap(date, position, &mut out);
                }
            }
            GridEvent::ScopeDrag {
                target_height,
                inferred_scope,
                phase,
            } => self.on_scope_drag(target_height, inferred_scope, phase, &mut out),
            GridEvent::ScopeToggle => match self.snapshot.scope {
                ScopeState::Month => {
                    let focus = self.resolve_focus();
                    self.collapse_to_week(focus, &mut out);
                }
                ScopeState::Week => self.expand_to_month(&mut out),
            },
            GridEvent::PageSwipe { anchor } => {
                if Self::accept(anchor, "page swipe") {
                    self.on_page_swipe(anchor, &mut out);
                }
            }
            GridEvent::FocusDate { date } => {
                if Self::accept(date, "focus date") {
                    self.move_selection(date, false, &mut out);
                }
            }
            GridEvent::RevealNextEvent { from } => {
                if Self::accept(from, "next event lookup") {
                    self.reveal_next_event(from, &mut out);
                }
            }
        }

        self.publish(out)
    }

    fn accept(date: DateKey, source: &str) -> bool {
        let valid = date.is_valid();
        if !valid {
            warn!("Ignoring {} with unconstructible date {}", source, date);
        }
        valid
    }

    fn publish(&self, out: Vec<CalendarNotification>) -> Vec<CalendarNotification> {
        self.observers.deliver(&out);
        out
    }

    fn on_cell_tap(
        &mut self,
        date: DateKey,
        position: CellPosition,
        out: &mut Vec<CalendarNotification>,
    ) {
        match self.snapshot.scope {
            ScopeState::Week => self.move_selection(date, true, out),
            ScopeState::Month => {
                let in_page = date.same_month(self.snapshot.visible_page_anchor);
                if position.is_placeholder() || !in_page {
                    self.change_page(self.bounds.clamp_month(date), true, out);
                } else {
                    self.collapse_to_week(date, out);
                }
            }
        }
    }

    fn on_page_swipe(&mut self, anchor: DateKey, out: &mut Vec<CalendarNotification>) {
        if self.snapshot.scope == ScopeState::Week {
            debug!("Page swipe to {} ignored in week scope", anchor);
            return;
        }
        self.change_page(self.bounds.clamp_month(anchor), false, out);
    }

    fn on_scope_drag(
        &mut self,
        target_height: f32,
        inferred_scope: ScopeState,
        phase: DragPhase,
        out: &mut Vec<CalendarNotification>,
    ) {
        let metrics = self.options.metrics;
        let week_height = metrics.target_height(ScopeState::Week);
        let month_height = metrics.target_height(ScopeState::Month);
        let height = target_height.clamp(
            week_height.min(month_height),
            month_height.max(week_height),
        );

        match phase {
            DragPhase::Changed { at_ms } => {
                if let Some(last) = self.last_drag_report_ms {
                    if at_ms.saturating_sub(last) < self.options.drag_debounce_ms {
                        return;
                    }
                }
                self.last_drag_report_ms = Some(at_ms);
                out.push(CalendarNotification::HeightChanged {
                    target_height: height,
                });
            }
            DragPhase::Ended => {
                self.last_drag_report_ms = None;
                out.push(CalendarNotification::HeightChanged {
                    target_height: height,
                });

                let span = metrics.span();
                let travelled = if span <= f32::EPSILON {
                    1.0
                } else {
                    match self.snapshot.scope {
                        ScopeState::Month => (month_height - height) / span,
                        ScopeState::Week => (height - week_height) / span,
                    }
                };
                let commits = inferred_scope != self.snapshot.scope
                    && travelled >= self.options.drag_commit_threshold;

                if !commits {
                    debug!(
                        "Drag released at {:.2} of the span, staying in {} scope",
                        travelled, self.snapshot.scope
                    );
                    out.push(CalendarNotification::HeightChanged {
                        target_height: self.target_height(),
                    });
                    return;
                }

                match inferred_scope {
                    ScopeState::Week => {
                        let focus = self.resolve_focus();
                        self.collapse_to_week(focus, out);
                    }
                    ScopeState::Month => self.expand_to_month(out),
                }
            }
        }
    }

    /// Day to focus when collapsing the month grid: the selection if it is on
    /// the page, else the earliest event on the page, else the page's first day.
    fn resolve_focus(&self) -> DateKey {
        let anchor = self.snapshot.visible_page_anchor;
        let month = self.calendar.month_range(anchor);

        self.snapshot
            .selected_date
            .filter(|selected| month.is_some_and(|range| range.contains(*selected)))
            .or_else(|| {
                month.and_then(|range| self.snapshot.event_dates.earliest_within(&range))
            })
            .unwrap_or_else(|| anchor.first_of_month())
    }

    fn collapse_to_week(&mut self, focus: DateKey, out: &mut Vec<CalendarNotification>) {
        let focus = self.bounds.clamp_day(focus);
        info!("Collapsing to week scope around {}", focus);

        self.snapshot.scope = ScopeState::Week;
        self.snapshot.visible_page_anchor = focus;
        self.snapshot.selected_date = Some(focus);

        out.push(CalendarNotification::DateSelected(focus));
        out.push(CalendarNotification::ScopeChanged {
            scope: ScopeState::Week,
            target_height: self.target_height(),
        });
        out.push(CalendarNotification::PageChanged {
            anchor: focus,
            animated: false,
        });
        self.render_page(out);
    }

    fn expand_to_month(&mut self, out: &mut Vec<CalendarNotification>) {
        let anchor = self.bounds.clamp_month(self.snapshot.visible_page_anchor);
        info!("Expanding to month scope at {}", anchor);

        self.snapshot.scope = ScopeState::Month;
        self.snapshot.visible_page_anchor = anchor;
        if let Some(selected) = self.snapshot.selected_date {
            if !selected.same_month(anchor) {
                self.snapshot.selected_date = None;
            }
        }

        out.push(CalendarNotification::ScopeChanged {
            scope: ScopeState::Month,
            target_height: self.target_height(),
        });
        out.push(CalendarNotification::PageChanged {
            anchor,
            animated: false,
        });
        self.render_page(out);
    }

    fn change_page(
        &mut self,
        anchor: DateKey,
        animated: bool,
        out: &mut Vec<CalendarNotification>,
    ) {
        if anchor == self.snapshot.visible_page_anchor {
            return;
        }
        let previous = self.snapshot.visible_page_anchor;
        debug!(
            "Page {} -> {} ({:+} months)",
            previous,
            anchor,
            self.calendar.months_between(previous, anchor)
        );
        self.snapshot.visible_page_anchor = anchor;
        out.push(CalendarNotification::PageChanged { anchor, animated });
        self.render_page(out);
    }

    /// Select `date`, moving the page only when the date is off the current
    /// week (Week scope) or month (Month scope).
    fn move_selection(
        &mut self,
        date: DateKey,
        announce: bool,
        out: &mut Vec<CalendarNotification>,
    ) {
        let date = self.bounds.clamp_day(date);
        let previous = self.snapshot.selected_date.replace(date);
        if announce {
            out.push(CalendarNotification::DateSelected(date));
        }

        let anchor = self.snapshot.visible_page_anchor;
        match self.snapshot.scope {
            ScopeState::Week => {
                if self.calendar.is_same_week(anchor, date) {
                    self.snapshot.visible_page_anchor = date;
                    self.render_days(previous.into_iter().chain([date]), out);
                } else {
                    self.change_page(date, true, out);
                }
            }
            ScopeState::Month => {
                if date.same_month(anchor) {
                    self.render_days(previous.into_iter().chain([date]), out);
                } else {
                    self.change_page(date.first_of_month(), true, out);
                }
            }
        }
    }

    fn reveal_next_event(&mut self, from: DateKey, out: &mut Vec<CalendarNotification>) {
        let Some(next) = self.snapshot.event_dates.next_on_or_after(from) else {
            debug!("No event on or after {}", from);
            return;
        };

        match self.snapshot.scope {
            ScopeState::Month => self.collapse_to_week(next, out),
            ScopeState::Week => self.move_selection(next, true, out),
        }
    }

    fn render_page(&self, out: &mut Vec<CalendarNotification>) {
        out.extend(
            project_page(&self.snapshot, &self.calendar)
                .into_iter()
                .map(|(cell, flags)| CalendarNotification::CellRenderUpdate {
                    date: cell.date,
                    flags,
                }),
        );
    }

    /// Re-project the given days if they are on screen.
    fn render_days<I>(&self, dates: I, out: &mut Vec<CalendarNotification>)
    where
        I: IntoIterator<Item = DateKey>,
    {
        let cells = self.snapshot.visible_cells(&self.calendar);
        let mut rendered: Vec<DateKey> = Vec::new();

        for date in dates {
            if rendered.contains(&date) {
                continue;
            }
            if let Some(cell) = cells.iter().find(|cell| cell.date == date) {
                out.push(CalendarNotification::CellRenderUpdate {
                    date,
                    flags: project(date, &self.snapshot, cell.position),
                });
                rendered.push(date);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellFlags;

    fn key(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::new(y, m, d)
    }

    fn machine_on(y: i32, m: u32, d: u32) -> CalendarMachine {
        let today = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        CalendarMachine::new(today, CalendarOptions::default())
    }

    fn page_changes(out: &[CalendarNotification]) -> Vec<DateKey> {
        out.iter()
            .filter_map(|n| match n {
                CalendarNotification::PageChanged { anchor, .. } => Some(*anchor),
                _ => None,
            })
            .collect()
    }

    fn selections(out: &[CalendarNotification]) -> Vec<DateKey> {
        out.iter()
            .filter_map(|n| match n {
                CalendarNotification::DateSelected(date) => Some(*date),
                _ => None,
            })
            .collect()
    }

    fn render_for(out: &[CalendarNotification], date: DateKey) -> Option<CellFlags> {
        out.iter().rev().find_map(|n| match n {
            CalendarNotification::CellRenderUpdate { date: d, flags } if *d == date => Some(*flags),
            _ => None,
        })
    }

    #[test]
    fn starts_in_month_scope_on_todays_month() {
        let machine = machine_on(2025, 6, 15);
        let snap = machine.snapshot();
        assert_eq!(snap.scope, ScopeState::Month);
        assert_eq!(snap.visible_page_anchor, key(2025, 6, 1));
        assert_eq!(snap.selected_date, None);
        assert_eq!(snap.today_date, key(2025, 6, 15));
        assert!(snap.event_dates.is_empty());
    }

    #[test]
    fn event_dates_are_replaced_not_merged() {
        let mut machine = machine_on(2025, 3, 20);
        machine.notify_event_dates([key(2025, 3, 5), key(2025, 3, 12)]);
        machine.notify_event_dates([key(2025, 3, 20)]);

        let index = &machine.snapshot().event_dates;
        assert_eq!(index.len(), 1);
        assert!(index.contains(key(2025, 3, 20)));
        assert!(!index.contains(key(2025, 3, 5)));
    }

    #[test]
    fn event_replacement_rerenders_page() {
        let mut machine = machine_on(2025, 3, 20);
        let out = machine.notify_event_dates([key(2025, 3, 5), key(2025, 4, 31)]);
        assert_eq!(machine.snapshot().event_dates.len(), 1);
        assert_eq!(out.len(), 42);
        assert!(render_for(&out, key(2025, 3, 5)).unwrap().has_event);
    }

    #[test]
    fn toggle_focuses_earliest_event_in_page() {
        let mut machine = machine_on(2025, 3, 20);
        machine.notify_event_dates([key(2025, 3, 12), key(2025, 3, 5)]);

        let out = machine.handle(GridEvent::ScopeToggle);

        let snap = machine.snapshot();
        assert_eq!(snap.scope, ScopeState::Week);
        assert_eq!(snap.selected_date, Some(key(2025, 3, 5)));
        assert_eq!(selections(&out), vec![key(2025, 3, 5)]);
        assert!(out.contains(&CalendarNotification::ScopeChanged {
            scope: ScopeState::Week,
            target_height: 96.0,
        }));
    }

    #[test]
    fn toggle_prefers_selection_on_page() {
        let mut machine = machine_on(2025, 3, 20);
        machine.notify_event_dates([key(2025, 3, 5)]);
        machine.handle(GridEvent::CellTap {
            date: key(2025, 3, 18),
            position: CellPosition::Current,
        });
        machine.handle(GridEvent::ScopeToggle);
        machine.handle(GridEvent::ScopeToggle);

        assert_eq!(machine.snapshot().scope, ScopeState::Week);
        assert_eq!(machine.snapshot().selected_date, Some(key(2025, 3, 18)));
    }

    #[test]
    fn toggle_without_events_focuses_first_day() {
        let mut machine = machine_on(2025, 3, 20);
        machine.notify_event_dates([key(2025, 4, 2)]);
        machine.handle(GridEvent::ScopeToggle);
        assert_eq!(machine.snapshot().selected_date, Some(key(2025, 3, 1)));
    }

    #[test]
    fn scope_round_trip_restores_month() {
        let mut machine = machine_on(2025, 3, 20);
        machine.handle(GridEvent::ScopeToggle);
        let week_anchor = machine.snapshot().visible_page_anchor;
        let out = machine.handle(GridEvent::ScopeToggle);

        let snap = machine.snapshot();
        assert_eq!(snap.scope, ScopeState::Month);
        assert_eq!(snap.visible_page_anchor, week_anchor.first_of_month());
        assert_eq!(snap.visible_page_anchor, key(2025, 3, 1));
        assert_eq!(page_changes(&out), vec![key(2025, 3, 1)]);
    }

    #[test]
    fn round_trip_from_week_spanning_months() {
        let mut machine = machine_on(2025, 3, 20);
        machine.handle(GridEvent::CellTap {
            date: key(2025, 3, 31),
            position: CellPosition::Current,
        });
        machine.handle(GridEvent::ScopeToggle);
        assert_eq!(machine.snapshot().visible_page_anchor, key(2025, 3, 1));
        assert_eq!(machine.snapshot().selected_date, Some(key(2025, 3, 31)));
    }

    #[test]
    fn placeholder_tap_changes_page_only() {
        let mut machine = machine_on(2025, 3, 20);
        let out = machine.handle(GridEvent::CellTap {
            date: key(2025, 4, 2),
            position: CellPosition::Next,
        });

        assert!(out.contains(&CalendarNotification::PageChanged {
            anchor: key(2025, 4, 1),
            animated: true,
        }));
        assert!(selections(&out).is_empty());
        let snap = machine.snapshot();
        assert_eq!(snap.scope, ScopeState::Month);
        assert_eq!(snap.selected_date, None);
        assert_eq!(snap.visible_page_anchor, key(2025, 4, 1));
    }

    #[test]
    fn current_tap_in_month_collapses_to_week() {
        let mut machine = machine_on(2025, 3, 20);
        let out = machine.handle(GridEvent::CellTap {
            date: key(2025, 3, 11),
            position: CellPosition::Current,
        });

        let snap = machine.snapshot();
        assert_eq!(snap.scope, ScopeState::Week);
        assert_eq!(snap.selected_date, Some(key(2025, 3, 11)));
        assert_eq!(selections(&out), vec![key(2025, 3, 11)]);
        let renders = out
            .iter()
            .filter(|n| matches!(n, CalendarNotification::CellRenderUpdate { .. }))
            .count();
        assert_eq!(renders, 7);
    }

    #[test]
    fn week_tap_selects_without_scope_change() {
        let mut machine = machine_on(2025, 3, 20);
        machine.handle(GridEvent::ScopeToggle);
        // The focused week runs Feb 23rd through Mar 1st.
        let out = machine.handle(GridEvent::CellTap {
            date: key(2025, 2, 27),
            position: CellPosition::Current,
        });

        assert_eq!(machine.snapshot().scope, ScopeState::Week);
        assert_eq!(machine.snapshot().selected_date, Some(key(2025, 2, 27)));
        assert_eq!(selections(&out), vec![key(2025, 2, 27)]);
        assert!(page_changes(&out).is_empty());
        assert!(!render_for(&out, key(2025, 3, 1)).unwrap().is_selected);
        assert!(render_for(&out, key(2025, 2, 27)).unwrap().is_selected);
    }

    #[test]
    fn page_swipe_keeps_selection_and_clamps() {
        let mut machine = machine_on(2025, 3, 20);
        machine.handle(GridEvent::FocusDate {
            date: key(2025, 3, 4),
        });
        machine.handle(GridEvent::PageSwipe {
            anchor: key(2025, 5, 17),
        });
        assert_eq!(machine.snapshot().visible_page_anchor, key(2025, 5, 1));
        assert_eq!(machine.snapshot().selected_date, Some(key(2025, 3, 4)));

        machine.handle(GridEvent::PageSwipe {
            anchor: key(2090, 1, 1),
        });
        assert_eq!(machine.snapshot().visible_page_anchor, key(2035, 12, 1));
    }

    #[test]
    fn paging_stops_at_the_lower_bound() {
        let mut machine = machine_on(2025, 3, 20);
        let out = machine.handle(GridEvent::PageSwipe {
            anchor: key(2001, 5, 1),
        });
        assert_eq!(page_changes(&out), vec![key(2015, 1, 1)]);
        assert_eq!(machine.snapshot().visible_page_anchor, key(2015, 1, 1));

        // The leading placeholders of January 2015 belong to December 2014,
        // which is out of bounds, so the page stays put.
        let before = machine.snapshot().clone();
        let out = machine.handle(GridEvent::CellTap {
            date: key(2014, 12, 28),
            position: CellPosition::Previous,
        });
        assert!(out.is_empty());
        assert_eq!(machine.snapshot(), &before);
    }

    #[test]
    fn page_swipe_is_ignored_in_week_scope() {
        let mut machine = machine_on(2025, 3, 20);
        machine.handle(GridEvent::ScopeToggle);
        let before = machine.snapshot().clone();
        let out = machine.handle(GridEvent::PageSwipe {
            anchor: key(2025, 7, 1),
        });
        assert!(out.is_empty());
        assert_eq!(machine.snapshot(), &before);
    }

    #[test]
    fn invalid_dates_are_ignored() {
        let mut machine = machine_on(2025, 3, 20);
        let before = machine.snapshot().clone();
        let out = machine.handle(GridEvent::CellTap {
            date: key(2025, 2, 30),
            position: CellPosition::Current,
        });
        assert!(out.is_empty());
        assert_eq!(machine.snapshot(), &before);
    }

    #[test]
    fn invalid_dates_are_ignored_by_every_navigation_event() {
        let mut machine = machine_on(2025, 3, 20);
        machine.notify_event_dates([key(2025, 4, 2)]);
        let before = machine.snapshot().clone();

        let events = [
            GridEvent::PageSwipe {
                anchor: key(2025, 2, 30),
            },
            GridEvent::FocusDate {
                date: key(2025, 4, 31),
            },
            GridEvent::RevealNextEvent {
                from: key(2025, 13, 1),
            },
        ];
        for event in events {
            assert!(machine.handle(event).is_empty());
            assert_eq!(machine.snapshot(), &before);
        }
    }

    #[test]
    fn drag_end_inside_debounce_window_still_commits() {
        let mut machine = machine_on(2025, 3, 20);
        let drag = |height: f32, phase: DragPhase| GridEvent::ScopeDrag {
            target_height: height,
            inferred_scope: ScopeState::Week,
            phase,
        };

        assert_eq!(machine.handle(drag(300.0, DragPhase::Changed { at_ms: 1000 })).len(), 1);
        assert!(machine.handle(drag(200.0, DragPhase::Changed { at_ms: 1030 })).is_empty());

        let out = machine.handle(drag(150.0, DragPhase::Ended));
        assert!(out.iter().any(|n| matches!(
            n,
            CalendarNotification::ScopeChanged {
                scope: ScopeState::Week,
                ..
            }
        )));
        assert_eq!(machine.snapshot().scope, ScopeState::Week);
    }

    #[test]
    fn drag_reports_are_debounced_but_end_is_not() {
        let mut machine = machine_on(2025, 3, 20);
        let drag = |height: f32, phase: DragPhase| GridEvent::ScopeDrag {
            target_height: height,
            inferred_scope: ScopeState::Week,
            phase,
        };

        assert_eq!(machine.handle(drag(380.0, DragPhase::Changed { at_ms: 0 })).len(), 1);
        assert!(machine.handle(drag(350.0, DragPhase::Changed { at_ms: 40 })).is_empty());
        assert_eq!(machine.handle(drag(300.0, DragPhase::Changed { at_ms: 120 })).len(), 1);

        let out = machine.handle(drag(150.0, DragPhase::Ended));
        assert_eq!(
            out.first(),
            Some(&CalendarNotification::HeightChanged {
                target_height: 150.0
            })
        );
        assert_eq!(machine.snapshot().scope, ScopeState::Week);
        assert_eq!(machine.snapshot().selected_date, Some(key(2025, 3, 1)));
    }

    #[test]
    fn short_drag_snaps_back() {
        let mut machine = machine_on(2025, 3, 20);
        let out = machine.handle(GridEvent::ScopeDrag {
            target_height: 350.0,
            inferred_scope: ScopeState::Week,
            phase: DragPhase::Ended,
        });
        assert_eq!(machine.snapshot().scope, ScopeState::Month);
        assert_eq!(
            out.last(),
            Some(&CalendarNotification::HeightChanged {
                target_height: 396.0
            })
        );
    }

    #[test]
    fn drag_expands_week_back_to_month() {
        let mut machine = machine_on(2025, 3, 20);
        machine.handle(GridEvent::ScopeToggle);
        assert!(machine.drag_allowed(12.0));
        assert!(!machine.drag_allowed(-12.0));

        machine.handle(GridEvent::ScopeDrag {
            target_height: 320.0,
            inferred_scope: ScopeState::Month,
            phase: DragPhase::Ended,
        });
        assert_eq!(machine.snapshot().scope, ScopeState::Month);
        assert!(machine.drag_allowed(-1.0));
    }

    #[test]
    fn focus_date_moves_week_without_announcing() {
        let mut machine = machine_on(2025, 3, 20);
        machine.handle(GridEvent::ScopeToggle);
        let out = machine.handle(GridEvent::FocusDate {
            date: key(2025, 3, 19),
        });
        assert!(selections(&out).is_empty());
        assert_eq!(page_changes(&out), vec![key(2025, 3, 19)]);
        assert_eq!(machine.snapshot().selected_date, Some(key(2025, 3, 19)));

        let out = machine.handle(GridEvent::FocusDate {
            date: key(2025, 3, 17),
        });
        assert!(page_changes(&out).is_empty());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn reveal_next_event_collapses_on_it() {
        let mut machine = machine_on(2025, 3, 20);
        machine.notify_event_dates([key(2025, 3, 5), key(2025, 4, 9)]);

        let out = machine.handle(GridEvent::RevealNextEvent {
            from: key(2025, 3, 20),
        });
        assert_eq!(selections(&out), vec![key(2025, 4, 9)]);
        assert_eq!(machine.snapshot().scope, ScopeState::Week);
        assert_eq!(machine.snapshot().visible_page_anchor, key(2025, 4, 9));

        let out = machine.handle(GridEvent::RevealNextEvent {
            from: key(2025, 4, 10),
        });
        assert!(out.is_empty());
    }

    #[test]
    fn reset_and_activate_rebuild_state() {
        let mut machine = machine_on(2025, 3, 20);
        machine.notify_event_dates([key(2025, 3, 5)]);
        machine.handle(GridEvent::ScopeToggle);

        let out = machine.reset();
        assert_eq!(machine.snapshot().selected_date, None);
        assert_eq!(render_for(&out, key(2025, 3, 5)).map(|f| f.is_selected), Some(false));

        machine.activate(NaiveDate::from_ymd_opt(2025, 8, 2).unwrap());
        let snap = machine.snapshot();
        assert_eq!(snap.scope, ScopeState::Month);
        assert_eq!(snap.visible_page_anchor, key(2025, 8, 1));
        assert_eq!(snap.today_date, key(2025, 8, 2));
        assert!(snap.event_dates.is_empty());
    }
}
