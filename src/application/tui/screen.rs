use crate::application::CalendarApp;
use crate::domain::{
    CalendarNotification, CellPosition, DateKey, DatePicker, DragPhase, GridCell, GridEvent,
    PickerColumn, ScopeState,
};
use crate::infrastructure::ScheduledEvent;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, warn};
use ratatui::layout::{Position, Rect};
use std::time::Instant;

/// Terminal lines per calendar row.
pub const CELL_LINES: u16 = 3;

pub struct PickerState {
    pub picker: DatePicker,
    pub column: PickerColumn,
}

struct Press {
    row: u16,
    cell: Option<GridCell>,
}

struct Drag {
    origin_row: u16,
    last_row: u16,
    start_height: f32,
    inferred: ScopeState,
}

/// Input state of the calendar screen, kept apart from the terminal so key
/// and mouse handling can be driven directly.
pub struct CalendarScreen {
    today: DateKey,
    started: Instant,
    /// Last height directive from the machine.
    height: f32,
    picker: Option<PickerState>,
    press: Option<Press>,
    drag: Option<Drag>,
    /// Where each day cell was drawn last frame, for mouse hit tests.
    cell_areas: Vec<(Rect, GridCell)>,
    events: Vec<ScheduledEvent>,
    events_for: Option<DateKey>,
    /// Why the last event listing failed, shown in place of the list.
    events_error: Option<String>,
    show_help: bool,
    should_exit: bool,
}

impl CalendarScreen {
    /// Activate the app for `today` and select `initial`.
    pub fn start(app: &mut CalendarApp, today: DateKey, initial: DateKey) -> Self {
        let mut screen = Self {
            today,
            started: Instant::now(),
            height: app.machine().target_height(),
            picker: None,
            press: None,
            drag: None,
            cell_areas: Vec::new(),
            events: Vec::new(),
            events_for: None,
            events_error: None,
            show_help: false,
            should_exit: false,
        };

        match today.to_native() {
            Some(native) => {
                let out = app.activate(native);
                screen.absorb(&out);
            }
            None => warn!("Cannot activate calendar for {}", today),
        }
        screen.send(app, GridEvent::FocusDate { date: initial });
        screen
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn picker(&self) -> Option<&PickerState> {
        self.picker.as_ref()
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn events_error(&self) -> Option<&str> {
        self.events_error.as_deref()
    }

    pub fn set_cell_areas(&mut self, areas: Vec<(Rect, GridCell)>) {
        self.cell_areas = areas;
    }

    /// Day the keyboard acts on: the selection, else the page anchor.
    pub fn focus(&self, app: &CalendarApp) -> DateKey {
        let snapshot = app.snapshot();
        snapshot
            .selected_date
            .unwrap_or(snapshot.visible_page_anchor)
    }

    /// Reload the event list when the focused day changed.
    pub fn sync_events(&mut self, app: &CalendarApp) {
        let focus = app.snapshot().selected_date;
        if focus == self.events_for {
            return;
        }
        self.events_for = focus;
        self.events_error = None;
        self.events = match focus {
            Some(date) => app.events_on(date).unwrap_or_else(|e| {
                warn!("Could not list events on {}: {:#}", date, e);
                self.events_error = Some(format!("{:#}", e));
                Vec::new()
            }),
            None => Vec::new(),
        };
    }

    /// Drop the cached event list so the next sync re-reads it.
    pub fn invalidate_events(&mut self) {
        self.events_for = None;
        self.events_error = None;
        self.events.clear();
    }

    pub fn handle_key(&mut self, app: &mut CalendarApp, key: KeyEvent) {
        if self.picker.is_some() {
            self.handle_picker_key(app, key);
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => self.should_exit = true,
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('d'), KeyModifiers::CONTROL) => self.should_exit = true,

            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => self.step_focus(app, -1),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => self.step_focus(app, 1),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => self.step_focus(app, -7),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => self.step_focus(app, 7),

            (KeyCode::PageUp, _) | (KeyCode::Char('['), _) => self.turn_page(app, -1),
            (KeyCode::PageDown, _) | (KeyCode::Char(']'), _) => self.turn_page(app, 1),

            (KeyCode::Enter, _) => {
                let date = self.focus(app);
                self.tap(app, GridCell {
                    date,
                    position: CellPosition::Current,
                });
            }
            (KeyCode::Tab, _) | (KeyCode::Char('s'), _) => self.send(app, GridEvent::ScopeToggle),
            (KeyCode::Char('t'), _) => self.send(app, GridEvent::FocusDate { date: self.today }),
            (KeyCode::Char('n'), _) => {
                let from = app
                    .snapshot()
                    .selected_date
                    .and_then(|date| app.machine().calendar().add_days(date, 1))
                    .unwrap_or(self.today);
                self.send(app, GridEvent::RevealNextEvent { from });
            }
            (KeyCode::Char('g'), _) => self.open_picker(app),
            (KeyCode::Char('r'), _) => {
                app.refresh_events();
                self.invalidate_events();
            }
            (KeyCode::Char('?'), _) => self.show_help = !self.show_help,
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, app: &mut CalendarApp, key: KeyEvent) {
        let Some(state) = self.picker.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.picker = None,
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                state.column = state.column.previous()
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                state.column = state.column.next()
            }
            KeyCode::Up | KeyCode::Char('k') => state.picker.step(state.column, -1),
            KeyCode::Down | KeyCode::Char('j') => state.picker.step(state.column, 1),
            KeyCode::Enter => {
                let date = state.picker.selected();
                self.picker = None;
                self.send(app, GridEvent::FocusDate { date });
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, app: &mut CalendarApp, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = None;
                self.press = Some(Press {
                    row: mouse.row,
                    cell: self.hit(mouse.column, mouse.row),
                });
            }
            MouseEventKind::Drag(MouseButton::Left) => self.on_drag(app, mouse.row),
            MouseEventKind::Up(MouseButton::Left) => self.on_release(app, mouse.column, mouse.row),
            MouseEventKind::ScrollUp if self.picker.is_none() => self.turn_page(app, -1),
            MouseEventKind::ScrollDown if self.picker.is_none() => self.turn_page(app, 1),
            _ => {}
        }
    }

    fn hit(&self, column: u16, row: u16) -> Option<GridCell> {
        let position = Position::new(column, row);
        self.cell_areas
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, cell)| *cell)
    }

    fn on_drag(&mut self, app: &mut CalendarApp, row: u16) {
        let Some(press) = &self.press else {
            return;
        };
        let last_row = self.drag.as_ref().map_or(press.row, |drag| drag.last_row);
        let delta = i32::from(row) - i32::from(last_row);

        if self.drag.is_none() {
            if delta == 0 || !app.machine().drag_allowed(delta as f32) {
                return;
            }
            debug!("Scope drag started at row {}", press.row);
            self.drag = Some(Drag {
                origin_row: press.row,
                last_row: press.row,
                start_height: app.machine().target_height(),
                inferred: app.snapshot().scope,
            });
        }

        let points_per_line = app.machine().options().metrics.row_height / f32::from(CELL_LINES);
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if delta < 0 {
            drag.inferred = ScopeState::Week;
        } else if delta > 0 {
            drag.inferred = ScopeState::Month;
        }
        drag.last_row = row;

        let travelled = (i32::from(row) - i32::from(drag.origin_row)) as f32;
        let target_height = drag.start_height + travelled * points_per_line;
        let inferred_scope = drag.inferred;
        let at_ms = self.elapsed_ms();
        self.send(app, GridEvent::ScopeDrag {
            target_height,
            inferred_scope,
            phase: DragPhase::Changed { at_ms },
        });
    }

    fn on_release(&mut self, app: &mut CalendarApp, column: u16, row: u16) {
        let press = self.press.take();

        if let Some(drag) = self.drag.take() {
            let points_per_line =
                app.machine().options().metrics.row_height / f32::from(CELL_LINES);
            let travelled = (i32::from(row) - i32::from(drag.origin_row)) as f32;
            self.send(app, GridEvent::ScopeDrag {
                target_height: drag.start_height + travelled * points_per_line,
                inferred_scope: drag.inferred,
                phase: DragPhase::Ended,
            });
            return;
        }

        if let Some(Press {
            cell: Some(cell), ..
        }) = press
        {
            if self.hit(column, row) == Some(cell) {
                self.tap(app, cell);
            }
        }
    }

    fn tap(&mut self, app: &mut CalendarApp, cell: GridCell) {
        self.send(app, GridEvent::CellTap {
            date: cell.date,
            position: cell.position,
        });
    }

    fn step_focus(&mut self, app: &mut CalendarApp, days: i64) {
        let focus = self.focus(app);
        match app.machine().calendar().add_days(focus, days) {
            Some(date) => self.send(app, GridEvent::FocusDate { date }),
            None => warn!("Cannot move {} days from {}", days, focus),
        }
    }

    /// Previous/next month in Month scope, previous/next week in Week scope.
    fn turn_page(&mut self, app: &mut CalendarApp, delta: i32) {
        match app.snapshot().scope {
            ScopeState::Month => {
                let anchor = app.snapshot().visible_page_anchor;
                let anchor = app.machine().calendar().add_months(anchor, delta);
                self.send(app, GridEvent::PageSwipe { anchor });
            }
            ScopeState::Week => self.step_focus(app, 7 * i64::from(delta)),
        }
    }

    fn open_picker(&mut self, app: &CalendarApp) {
        let bounds = app.machine().bounds();
        self.picker = DatePicker::bounded(bounds.min, bounds.max, self.focus(app)).map(|picker| {
            PickerState {
                picker,
                column: PickerColumn::Year,
            }
        });
    }

    fn send(&mut self, app: &mut CalendarApp, event: GridEvent) {
        let out = app.dispatch(event);
        self.absorb(&out);
    }

    fn absorb(&mut self, out: &[CalendarNotification]) {
        for notification in out {
            match notification {
                CalendarNotification::ScopeChanged { target_height, .. }
                | CalendarNotification::HeightChanged { target_height } => {
                    self.height = *target_height
                }
                _ => {}
            }
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
