use super::screen::{CELL_LINES, CalendarScreen, PickerState};
use super::theme::Theme;
use crate::application::CalendarApp;
use crate::domain::{
    CellFlags, DateKey, GridCell, PickerColumn, ScopeMetrics, ScopeState, project_page,
};
use chrono::{Datelike, Weekday};
use crossterm::ExecutableCommand;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, poll,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::tty::IsTty;
use log::info;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::io::{self, Stdout, stdout};
use std::time::Duration;

const HEADER_HEIGHT: u16 = 1;
const WEEKDAY_HEIGHT: u16 = 1;
const EVENTS_HEIGHT: u16 = 7;
const HELP_HEIGHT: u16 = 2;
const CALENDAR_WIDTH: u16 = 64;
const PICKER_WIDTH: u16 = 34;
const PICKER_HEIGHT: u16 = 9;

pub struct CalendarView<'a> {
    app: &'a mut CalendarApp,
    screen: CalendarScreen,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
}

impl<'a> CalendarView<'a> {
    pub fn new(app: &'a mut CalendarApp, today: DateKey, initial: DateKey) -> io::Result<Self> {
        if !IsTty::is_tty(&std::io::stdout()) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Not running in a TTY, cannot initialize terminal interface",
            ));
        }

        enable_raw_mode()
            .map_err(|e| io::Error::other(format!("Failed to enable raw mode: {}", e)))?;

        stdout()
            .execute(EnterAlternateScreen)
            .and_then(|out| out.execute(EnableMouseCapture))
            .map_err(|e| {
                let _ = disable_raw_mode();
                io::Error::other(format!("Failed to enter alternate screen: {}", e))
            })?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).map_err(|e| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(DisableMouseCapture);
            let _ = stdout().execute(LeaveAlternateScreen);
            io::Error::other(format!("Failed to create terminal: {}", e))
        })?;

        let theme = Theme::by_name(&app.config.settings.theme);
        let screen = CalendarScreen::start(app, today, initial);

        Ok(Self {
            app,
            screen,
            terminal,
            theme,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        info!("Calendar view started with {} theme", self.theme.name);

        loop {
            if self.screen.should_exit() {
                break;
            }

            if self.app.poll_events() {
                self.screen.invalidate_events();
            }
            self.screen.sync_events(self.app);

            let app: &CalendarApp = self.app;
            let screen = &self.screen;
            let theme = &self.theme;
            let mut areas = Vec::new();
            self.terminal.draw(|frame| {
                areas = draw(frame, app, screen, theme);
            })?;
            self.screen.set_cell_areas(areas);

            if poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.screen.handle_key(self.app, key);
                    }
                    Event::Mouse(mouse) => self.screen.handle_mouse(self.app, mouse),
                    _ => continue,
                }
            }
        }

        self.cleanup()
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(DisableMouseCapture)?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

impl Drop for CalendarView<'_> {
    fn drop(&mut self) {
        // Fallback cleanup if run() bailed out early
        let _ = self.cleanup();
    }
}

/// Calculate centered area with both horizontal and vertical centering
fn centered(available: Rect, width: u16, height: u16) -> Rect {
    let width = available.width.min(width);
    let height = available.height.min(height);
    Rect {
        x: available.x + (available.width - width) / 2,
        y: available.y + (available.height - height) / 2,
        width,
        height,
    }
}

/// Calendar rows to draw for a height directive: partial months while a
/// drag is in progress, always a single row in Week scope.
fn visible_rows(scope: ScopeState, height: f32, metrics: ScopeMetrics) -> u16 {
    match scope {
        ScopeState::Week => ScopeMetrics::WEEK_ROWS,
        ScopeState::Month => {
            if metrics.row_height <= 0.0 {
                return ScopeMetrics::MONTH_ROWS;
            }
            let rows = ((height - metrics.weekday_height) / metrics.row_height).ceil();
            (rows.max(1.0) as u16).min(ScopeMetrics::MONTH_ROWS)
        }
    }
}

fn is_weekend(date: DateKey) -> bool {
    date.to_native()
        .is_some_and(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}

/// Draw the whole screen and return the rectangle of every day cell.
fn draw(
    frame: &mut Frame,
    app: &CalendarApp,
    screen: &CalendarScreen,
    theme: &Theme,
) -> Vec<(Rect, GridCell)> {
    let snapshot = app.snapshot();
    let metrics = app.machine().options().metrics;
    let rows = visible_rows(snapshot.scope, screen.height(), metrics);
    let grid_height = rows * CELL_LINES;
    let total_height = HEADER_HEIGHT + WEEKDAY_HEIGHT + grid_height + EVENTS_HEIGHT + HELP_HEIGHT;

    let area = centered(frame.area(), CALENDAR_WIDTH, total_height);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(WEEKDAY_HEIGHT),
            Constraint::Length(grid_height),
            Constraint::Length(EVENTS_HEIGHT),
            Constraint::Length(HELP_HEIGHT),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            app.header(),
            theme.colors.header.to_ratatui_with_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", snapshot.scope), theme.colors.help_text.to_ratatui()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    let columns = week_columns(chunks[1]);
    for (weekday, column) in app.machine().calendar().weekday_labels().iter().zip(columns.iter()) {
        let style = if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            theme.colors.weekend.to_ratatui()
        } else {
            theme.colors.header.to_ratatui()
        };
        let label = Paragraph::new(Span::styled(weekday.to_string(), style))
            .alignment(Alignment::Center);
        frame.render_widget(label, *column);
    }

    let areas = draw_grid(frame, chunks[2], app, rows, theme);
    draw_events(frame, chunks[3], screen, snapshot.selected_date, theme);
    draw_help(frame, chunks[4], screen.show_help(), theme);

    if let Some(state) = screen.picker() {
        let full = frame.area();
        draw_picker(frame, full, state, theme);
    }

    areas
}

fn week_columns(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area)
        .to_vec()
}

fn draw_grid(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp,
    rows: u16,
    theme: &Theme,
) -> Vec<(Rect, GridCell)> {
    let snapshot = app.snapshot();
    let page = project_page(snapshot, app.machine().calendar());
    let weeks: Vec<&[(GridCell, CellFlags)]> = page.chunks(7).collect();

    // Keep the selected week on screen while the month is partly folded.
    let selected_week = snapshot
        .selected_date
        .and_then(|date| {
            weeks
                .iter()
                .position(|week| {
                    week.iter()
                        .any(|(cell, _)| cell.date == date && !cell.position.is_placeholder())
                })
        })
        .unwrap_or(0);
    let shown = usize::from(rows).min(weeks.len());
    let first = selected_week
        .saturating_sub(shown.saturating_sub(1))
        .min(weeks.len() - shown);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CELL_LINES); shown])
        .split(area);

    let mut areas = Vec::new();
    for (week, row_area) in weeks[first..first + shown].iter().zip(row_areas.iter()) {
        for ((cell, flags), cell_area) in week.iter().zip(week_columns(*row_area)) {
            let placeholder = cell.position.is_placeholder();
            let style = theme.cell_style(*flags, placeholder, is_weekend(cell.date));

            let day = if cell.date.day == 1 && !placeholder {
                format!("{} {}", month_abbrev(cell.date), cell.date.day)
            } else {
                cell.date.day.to_string()
            };
            let marker = if flags.has_event { "•" } else { " " };
            let content = vec![
                Line::from(Span::styled(day, style)),
                Line::from(Span::styled(marker, theme.colors.event_marker.to_ratatui())),
            ];

            frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), cell_area);
            areas.push((cell_area, *cell));
        }
    }
    areas
}

fn month_abbrev(date: DateKey) -> String {
    date.to_native()
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}

fn draw_events(
    frame: &mut Frame,
    area: Rect,
    screen: &CalendarScreen,
    selected: Option<DateKey>,
    theme: &Theme,
) {
    let title = match selected.and_then(DateKey::to_native) {
        Some(date) => format!(" {} ", date.format("%A, %B %d, %Y")),
        None => " No day selected ".to_string(),
    };

    let lines: Vec<Line> = if let Some(error) = screen.events_error() {
        vec![Line::from(Span::styled(
            format!("Could not load events: {}", error),
            theme.colors.error_text.to_ratatui(),
        ))]
    } else if screen.events().is_empty() {
        vec![Line::from(Span::styled(
            "No events",
            theme.colors.placeholder.to_ratatui(),
        ))]
    } else {
        screen
            .events()
            .iter()
            .map(|event| {
                Line::from(vec![
                    Span::styled("○ ", theme.colors.event_marker.to_ratatui()),
                    Span::styled(event.title.clone(), theme.colors.normal_text.to_ratatui()),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme.colors.border.to_ratatui())
        .title(title)
        .title_style(theme.colors.header.to_ratatui());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(frame: &mut Frame, area: Rect, show_help: bool, theme: &Theme) {
    let text = if show_help {
        concat!(
            "←→↑↓=Day/Week • PgUp/PgDn=Page • Enter=Tap • Tab=Fold • ",
            "n=Next event • g=Go to • t=Today • r=Reload • q=Quit",
        )
    } else {
        "?=Help"
    };
    let help = Paragraph::new(Span::styled(text, theme.colors.help_text.to_ratatui()))
        .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

fn draw_picker(frame: &mut Frame, available: Rect, state: &PickerState, theme: &Theme) {
    let area = centered(available, PICKER_WIDTH, PICKER_HEIGHT);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.colors.border.to_ratatui())
        .title(" Go to date ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(inner);

    let picker = &state.picker;
    let labels: [(PickerColumn, Vec<String>); 3] = [
        (
            PickerColumn::Year,
            picker.years().iter().map(|y| y.to_string()).collect(),
        ),
        (
            PickerColumn::Month,
            picker
                .months()
                .iter()
                .map(|m| month_abbrev(DateKey::new(2000, *m, 1)))
                .collect(),
        ),
        (
            PickerColumn::Day,
            picker.days().iter().map(|d| format!("{:02}", d)).collect(),
        ),
    ];

    let window = usize::from(inner.height);
    for ((column, values), column_area) in labels.iter().zip(columns.iter()) {
        let selected = picker.selected_row(*column);
        let start = selected
            .saturating_sub(window / 2)
            .min(values.len().saturating_sub(window));

        let lines: Vec<Line> = values
            .iter()
            .enumerate()
            .skip(start)
            .take(window)
            .map(|(row, value)| {
                let style = if row == selected && *column == state.column {
                    theme.colors.selected.to_ratatui_with_modifier(Modifier::BOLD)
                } else if row == selected {
                    theme.colors.accent.to_ratatui()
                } else {
                    theme.colors.placeholder.to_ratatui()
                };
                Line::from(Span::styled(value.clone(), style))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), *column_area);
    }
}
