use std::collections::HashSet;

use chrono::NaiveDate;
use ratatui::layout::Rect;

use crate::app::AppState;
use crate::roster::{EmployeeId, ShiftKind, VacationPriority};
use crate::schedule::time::calendar_range;
use crate::schedule::{CellKey, CellState};
use crate::ui::viewport::Viewport;

pub const NAME_COLUMN_WIDTH: u16 = 20;
pub const HEADER_ROWS: u16 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub title: String,
    pub days: Vec<DayHeader>,
    pub rows: Vec<RowLayout>,
    pub scroll_row: usize,
    pub total_rows: usize,
    pub virtualized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayHeader {
    pub day: usize,
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub is_weekend: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub row: usize,
    pub employee_id: EmployeeId,
    pub name: String,
    pub scheduled_hours: f32,
    pub has_violation: bool,
    pub cells: Vec<CellLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Empty,
    Shift { label: String, kind: ShiftKind, malformed: bool },
    Vacation { priority: VacationPriority },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub key: CellKey,
    pub content: CellContent,
    pub is_cursor: bool,
    pub is_drag_source: bool,
    pub is_drop_target: bool,
    pub drop_blocked: bool,
    pub has_violation: bool,
    pub is_weekend: bool,
    pub is_today: bool,
}

impl CellContent {
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => "·".to_string(),
            CellContent::Shift { label, malformed: true, .. } => format!("{}!", label),
            CellContent::Shift { label, .. } => label.clone(),
            CellContent::Vacation { priority: VacationPriority::Fixed } => "VAC*".to_string(),
            CellContent::Vacation { .. } => "VAC".to_string(),
        }
    }
}

/// Screen placement of the grid, used both to size the viewport and to
/// map pointer positions back to cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub origin_x: u16,
    pub origin_y: u16,
    pub cell_width: u16,
    pub visible_rows: usize,
    pub visible_days: usize,
}

impl GridGeometry {
    /// Geometry for a bordered grid block drawn in `area`.
    pub fn for_area(area: Rect, cell_width: u16) -> Self {
        let inner_x = area.x.saturating_add(1);
        let inner_y = area.y.saturating_add(1);
        let inner_width = area.width.saturating_sub(2);
        let inner_height = area.height.saturating_sub(2);
        let cell_width = cell_width.max(1);

        Self {
            origin_x: inner_x.saturating_add(NAME_COLUMN_WIDTH),
            origin_y: inner_y.saturating_add(HEADER_ROWS),
            cell_width,
            visible_rows: inner_height.saturating_sub(HEADER_ROWS) as usize,
            visible_days: (inner_width.saturating_sub(NAME_COLUMN_WIDTH) / cell_width) as usize,
        }
    }

    /// Maps a terminal position to `(row, day)` in grid coordinates,
    /// accounting for scroll. `None` for headers, the name column and
    /// anything past the last row or day.
    pub fn hit_test(
        &self,
        column: u16,
        row: u16,
        viewport: &Viewport,
        total_rows: usize,
        total_days: usize,
    ) -> Option<(usize, usize)> {
        if column < self.origin_x || row < self.origin_y {
            return None;
        }
        let screen_row = (row - self.origin_y) as usize;
        let screen_day = ((column - self.origin_x) / self.cell_width) as usize;
        if screen_row >= self.visible_rows || screen_day >= self.visible_days {
            return None;
        }
        let grid_row = viewport.scroll_row + screen_row;
        let grid_day = viewport.scroll_day + screen_day;
        (grid_row < total_rows && grid_day < total_days).then_some((grid_row, grid_day))
    }

    pub fn cell_rect(&self, screen_row: usize, screen_day: usize) -> Rect {
        Rect::new(
            self.origin_x + screen_day as u16 * self.cell_width,
            self.origin_y + screen_row as u16,
            self.cell_width,
            1,
        )
    }
}

impl AppState {
    /// Cell under a terminal position, if any.
    pub fn cell_at(&self, column: u16, row: u16) -> Option<CellKey> {
        let geometry = self.geometry.as_ref()?;
        let (grid_row, day) =
            geometry.hit_test(column, row, &self.viewport, self.row_count(), self.period().days)?;
        self.store.context().key_at(grid_row, day)
    }
}

pub fn calculate_layout(state: &AppState) -> GridLayout {
    let store = &state.store;
    let period = state.period();
    let day_range = state.day_window();

    let days: Vec<DayHeader> = calendar_range(&period, state.today)
        .into_iter()
        .filter(|day| day_range.contains(&day.index))
        .map(|day| DayHeader {
            day: day.index,
            date: day.date,
            weekday: day.weekday_label(),
            is_weekend: day.is_weekend,
            is_today: day.is_today,
        })
        .collect();

    let mut violation_cells: HashSet<CellKey> = HashSet::new();
    let mut violation_rows: HashSet<&EmployeeId> = HashSet::new();
    for violation in store.violations() {
        violation_rows.insert(&violation.employee_id);
        if let Some(day) = violation.date.and_then(|d| period.index_of(d)) {
            violation_cells.insert(CellKey::new(violation.employee_id.clone(), day));
        }
    }

    let cursor_key = state.selected_key();
    let drag = state.drag.state();

    let rows = state
        .row_window()
        .filter_map(|row| {
            let employee = store.roster().get(row)?;
            let cells = days
                .iter()
                .map(|header| {
                    let key = CellKey::new(employee.id.clone(), header.day);
                    let content = match store.cell_state(&key) {
                        CellState::Rest => CellContent::Empty,
                        CellState::Vacation(vacation) => {
                            CellContent::Vacation { priority: vacation.priority }
                        }
                        CellState::Work(shift) => CellContent::Shift {
                            label: shift.bounds.label(),
                            kind: shift.kind,
                            malformed: shift.duration_minutes().is_none(),
                        },
                    };
                    let is_drag_source = drag.is_some_and(|d| d.source == key);
                    let is_drop_target =
                        drag.is_some_and(|d| d.hover.as_ref() == Some(&key)) && !is_drag_source;
                    CellLayout {
                        is_cursor: cursor_key.as_ref() == Some(&key),
                        is_drag_source,
                        is_drop_target,
                        drop_blocked: is_drop_target && store.grid().is_occupied(&key),
                        has_violation: violation_cells.contains(&key),
                        is_weekend: header.is_weekend,
                        is_today: header.is_today,
                        key,
                        content,
                    }
                })
                .collect();

            Some(RowLayout {
                row,
                employee_id: employee.id.clone(),
                name: employee.name.clone(),
                scheduled_hours: store.scheduled_minutes(employee) as f32 / 60.0,
                has_violation: violation_rows.contains(&employee.id),
                cells,
            })
        })
        .collect();

    GridLayout {
        title: period.label(),
        days,
        rows,
        scroll_row: state.viewport.scroll_row,
        total_rows: state.row_count(),
        virtualized: state.is_virtualized(),
    }
}
