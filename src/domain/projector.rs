use crate::domain::{Calendar, CalendarSnapshot, CellFlags, CellPosition, DateKey, GridCell};

/// Render flags for one cell of the current snapshot.
///
/// Placeholder cells never show as selected, even when they carry the
/// selected date.
pub fn project(date: DateKey, snapshot: &CalendarSnapshot, position: CellPosition) -> CellFlags {
    CellFlags {
        has_event: snapshot.event_dates.contains(date),
        is_selected: !position.is_placeholder() && snapshot.selected_date == Some(date),
        is_today: date == snapshot.today_date,
    }
}

/// Project every cell the surface currently shows.
pub fn project_page(
    snapshot: &CalendarSnapshot,
    calendar: &Calendar,
) -> Vec<(GridCell, CellFlags)> {
    snapshot
        .visible_cells(calendar)
        .into_iter()
        .map(|cell| (cell, project(cell.date, snapshot, cell.position)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventDateIndex, ScopeState};
    use std::sync::Arc;

    fn key(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::new(y, m, d)
    }

    fn snapshot() -> CalendarSnapshot {
        CalendarSnapshot {
            scope: ScopeState::Month,
            visible_page_anchor: key(2025, 6, 1),
            selected_date: Some(key(2025, 6, 20)),
            today_date: key(2025, 6, 15),
            event_dates: Arc::new(EventDateIndex::build([key(2025, 6, 20), key(2025, 7, 1)])),
        }
    }

    #[test]
    fn projection_is_idempotent() {
        let snap = snapshot();
        let first = project(key(2025, 6, 20), &snap, CellPosition::Current);
        let second = project(key(2025, 6, 20), &snap, CellPosition::Current);
        assert_eq!(first, second);
        assert_eq!(
            first,
            CellFlags {
                has_event: true,
                is_selected: true,
                is_today: false,
            }
        );
    }

    #[test]
    fn today_flag_ignores_selection() {
        let mut snap = snapshot();
        assert!(project(key(2025, 6, 15), &snap, CellPosition::Current).is_today);
        snap.selected_date = Some(key(2025, 6, 15));
        assert!(project(key(2025, 6, 15), &snap, CellPosition::Current).is_today);
        snap.selected_date = None;
        assert!(project(key(2025, 6, 15), &snap, CellPosition::Current).is_today);
    }

    #[test]
    fn placeholders_are_never_selected() {
        let mut snap = snapshot();
        snap.selected_date = Some(key(2025, 7, 1));
        let flags = project(key(2025, 7, 1), &snap, CellPosition::Next);
        assert!(!flags.is_selected);
        assert!(flags.has_event);
    }

    #[test]
    fn page_projection_is_order_independent() {
        let snap = snapshot();
        let calendar = Calendar::default();
        let page = project_page(&snap, &calendar);
        assert_eq!(page.len(), 42);

        let reversed: Vec<_> = page
            .iter()
            .rev()
            .map(|(cell, _)| (*cell, project(cell.date, &snap, cell.position)))
            .collect();
        for (cell, flags) in reversed {
            let (_, expected) = page.iter().find(|(c, _)| *c == cell).unwrap();
            assert_eq!(flags, *expected);
        }

        let selected: Vec<_> = page.iter().filter(|(_, f)| f.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].0.date, key(2025, 6, 20));
    }
}
