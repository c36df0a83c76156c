use crate::domain::DateKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display mode of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeState {
    Month,
    Week,
}

impl ScopeState {
    pub fn toggled(self) -> Self {
        match self {
            ScopeState::Month => ScopeState::Week,
            ScopeState::Week => ScopeState::Month,
        }
    }
}

impl fmt::Display for ScopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeState::Month => write!(f, "month"),
            ScopeState::Week => write!(f, "week"),
        }
    }
}

/// Where a grid cell sits relative to the visible page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellPosition {
    Previous,
    Current,
    Next,
}

impl CellPosition {
    pub fn is_placeholder(self) -> bool {
        !matches!(self, CellPosition::Current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub date: DateKey,
    pub position: CellPosition,
}

/// Container heights reported alongside scope changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeMetrics {
    pub row_height: f32,
    pub weekday_height: f32,
}

impl ScopeMetrics {
    pub const MONTH_ROWS: u16 = 6;
    pub const WEEK_ROWS: u16 = 1;

    pub fn target_height(&self, scope: ScopeState) -> f32 {
        let rows = match scope {
            ScopeState::Month => Self::MONTH_ROWS,
            ScopeState::Week => Self::WEEK_ROWS,
        };
        self.weekday_height + self.row_height * f32::from(rows)
    }

    /// Height travelled between the week strip and the full month grid.
    pub fn span(&self) -> f32 {
        self.target_height(ScopeState::Month) - self.target_height(ScopeState::Week)
    }
}

impl Default for ScopeMetrics {
    fn default() -> Self {
        Self {
            row_height: 60.0,
            weekday_height: 36.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    /// In-progress report; `at_ms` is a monotonic timestamp from the surface.
    Changed { at_ms: u64 },
    Ended,
}

/// Interaction reported by the rendering surface or a sibling collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridEvent {
    CellTap {
        date: DateKey,
        position: CellPosition,
    },
    ScopeDrag {
        target_height: f32,
        inferred_scope: ScopeState,
        phase: DragPhase,
    },
    ScopeToggle,
    PageSwipe {
        anchor: DateKey,
    },
    /// A linked schedule list scrolled to `date`.
    FocusDate {
        date: DateKey,
    },
    /// Jump to the first event on or after `from`.
    RevealNextEvent {
        from: DateKey,
    },
}

/// Render flags for one day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellFlags {
    pub has_event: bool,
    pub is_selected: bool,
    pub is_today: bool,
}

/// Outbound notification produced by a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalendarNotification {
    PageChanged { anchor: DateKey, animated: bool },
    ScopeChanged { scope: ScopeState, target_height: f32 },
    HeightChanged { target_height: f32 },
    DateSelected(DateKey),
    CellRenderUpdate { date: DateKey, flags: CellFlags },
}
