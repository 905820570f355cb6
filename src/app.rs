use std::ops::Range;

use chrono::{DateTime, Local, NaiveDate, Utc};
use regex::Regex;

use crate::roster::Shift;
use crate::schedule::{
    CellKey, DragCoordinator, DragSession, DropOutcome, GridAction, GridError, GridStore, Outcome,
    RosterSnapshot, SchedulePeriod,
};
use crate::storage::config::UiConfig;
use crate::sync::{LoadSequencer, LoadTicket};
use crate::ui::grid_view::GridGeometry;
use crate::ui::theme::Theme;
use crate::ui::viewport::{RowWindowing, Viewport, WindowingMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Drag,
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Synced,
    Syncing,
    Offline,
    Cached(DateTime<Utc>),
    Error(String),
}

/// A local action the roster source has not confirmed yet. Moves carry
/// the id of the pushed shift so a confirmation can retire them.
#[derive(Debug, Clone, PartialEq)]
struct LocalEdit {
    action: GridAction,
    shift_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub row: usize,
    pub day: usize,
}

pub struct AppState {
    pub mode: Mode,
    pub store: GridStore,
    pub cursor: Cursor,
    pub viewport: Viewport,
    pub drag: DragCoordinator,
    pub sync_status: SyncStatus,
    pub banner: Option<String>,
    pub notice: Option<String>,
    pub command_buffer: String,
    pub search_query: Option<String>,
    pub show_help: bool,
    pub help_scroll: usize,
    pub theme: Theme,
    pub windowing: WindowingMode,
    pub virtualize_threshold: usize,
    pub row_buffer: usize,
    pub cell_width: u16,
    pub sequencer: LoadSequencer,
    pub today: NaiveDate,
    pub geometry: Option<GridGeometry>,
    pending_pushes: Vec<Shift>,
    local_edits: Vec<LocalEdit>,
}

impl AppState {
    pub fn new(period: SchedulePeriod) -> Self {
        let defaults = UiConfig::default();
        Self {
            mode: Mode::Normal,
            store: GridStore::empty(period),
            cursor: Cursor::default(),
            viewport: Viewport::default(),
            drag: DragCoordinator::new(),
            sync_status: SyncStatus::Offline,
            banner: None,
            notice: None,
            command_buffer: String::new(),
            search_query: None,
            show_help: false,
            help_scroll: 0,
            theme: Theme::default(),
            windowing: defaults.windowing,
            virtualize_threshold: defaults.virtualize_threshold,
            row_buffer: defaults.row_buffer,
            cell_width: defaults.cell_width,
            sequencer: LoadSequencer::new(),
            today: Local::now().date_naive(),
            geometry: None,
            pending_pushes: Vec::new(),
            local_edits: Vec::new(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_ui_config(mut self, ui: &UiConfig) -> Self {
        self.windowing = ui.windowing;
        self.virtualize_threshold = ui.virtualize_threshold;
        self.row_buffer = ui.row_buffer;
        self.cell_width = ui.cell_width.max(3);
        self
    }

    pub fn with_store(mut self, store: GridStore) -> Self {
        self.store = store;
        self.clamp_cursor();
        self
    }

    pub fn period(&self) -> SchedulePeriod {
        *self.store.period()
    }

    pub fn row_count(&self) -> usize {
        self.store.roster().len()
    }

    pub fn selected_key(&self) -> Option<CellKey> {
        self.store.context().key_at(self.cursor.row, self.cursor.day)
    }

    pub fn is_virtualized(&self) -> bool {
        self.windowing.is_virtualized(self.row_count(), self.virtualize_threshold)
    }

    pub fn row_window(&self) -> Range<usize> {
        let strategy: Box<dyn RowWindowing> =
            self.windowing
                .strategy(self.row_count(), self.virtualize_threshold, self.row_buffer);
        strategy.window(self.row_count(), self.viewport.scroll_row, self.viewport.rows)
    }

    pub fn day_window(&self) -> Range<usize> {
        let days = self.period().days;
        let start = self.viewport.scroll_day.min(days);
        let end = if self.viewport.days == 0 {
            days
        } else {
            (start + self.viewport.days).min(days)
        };
        start..end
    }

    pub fn set_geometry(&mut self, geometry: GridGeometry) {
        self.viewport.rows = geometry.visible_rows;
        self.viewport.days = geometry.visible_days;
        self.geometry = Some(geometry);
        self.viewport.follow(self.cursor.row, self.cursor.day);
    }

    pub fn move_cursor(&mut self, rows: isize, days: isize) {
        self.cursor.row = self.cursor.row.saturating_add_signed(rows);
        self.cursor.day = self.cursor.day.saturating_add_signed(days);
        self.clamp_cursor();
    }

    pub fn goto_first_row(&mut self) {
        self.cursor.row = 0;
        self.clamp_cursor();
    }

    pub fn goto_last_row(&mut self) {
        self.cursor.row = self.row_count().saturating_sub(1);
        self.clamp_cursor();
    }

    pub fn page(&mut self, pages: isize) {
        let step = self.viewport.rows.max(1) as isize;
        self.move_cursor(pages * step, 0);
    }

    pub fn select_cell(&mut self, row: usize, day: usize) {
        self.cursor = Cursor { row, day };
        self.clamp_cursor();
    }

    pub fn scroll_rows(&mut self, delta: isize) {
        let total = self.row_count();
        self.viewport.scroll_rows_by(delta, total);
    }

    fn clamp_cursor(&mut self) {
        self.cursor.row = self.cursor.row.min(self.row_count().saturating_sub(1));
        self.cursor.day = self.cursor.day.min(self.period().days.saturating_sub(1));
        self.viewport.follow(self.cursor.row, self.cursor.day);
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn show_banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    pub fn dismiss_banner(&mut self) -> bool {
        self.banner.take().is_some()
    }

    /// Applies a grid action. A rejection only produces a notice.
    pub fn apply(&mut self, action: GridAction) -> Result<Outcome, GridError> {
        let result = self.store.dispatch(action.clone());
        match &result {
            Ok(Outcome::Applied) => {
                self.sequencer.mark_local_change();
                self.local_edits.push(LocalEdit { action, shift_id: None });
            }
            Ok(Outcome::NoOp) => {}
            Err(e) => {
                tracing::debug!("Action rejected: {}", e);
                self.set_notice(e.to_string());
            }
        }
        result
    }

    pub fn delete_selected(&mut self) {
        if let Some(cell) = self.selected_key() {
            let _ = self.apply(GridAction::Delete { cell });
        }
    }

    pub fn extend_selected(&mut self, hours: i32) {
        if let Some(cell) = self.selected_key() {
            let _ = self.apply(GridAction::Extend { cell, hours });
        }
    }

    pub fn add_emergency_at_cursor(&mut self) {
        if let Some(cell) = self.selected_key() {
            let _ = self.apply(GridAction::AddEmergency { cell });
        }
    }

    pub fn drag_session(&mut self) -> DragSession<'_> {
        DragSession::new(&mut self.drag, &mut self.store)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Book-keeping after a gesture finished a drag.
    pub fn record_drop(&mut self, outcome: DropOutcome) {
        self.mode = Mode::Normal;
        match outcome {
            DropOutcome::Moved { from, to } => {
                self.sequencer.mark_local_change();
                if let Some(row) = self.store.roster().row_of(&to.employee_id) {
                    self.select_cell(row, to.day);
                }
                let moved = self.store.shift_at(&to).cloned();
                let shift_id = moved.as_ref().map(|shift| shift.id.clone());
                self.pending_pushes.extend(moved);
                self.local_edits.push(LocalEdit {
                    action: GridAction::Move { from, to },
                    shift_id,
                });
            }
            DropOutcome::Rejected(e) => self.set_notice(format!("Move rejected: {}", e)),
            DropOutcome::SameCell | DropOutcome::Cancelled | DropOutcome::Idle => {}
        }
    }

    pub fn take_pending_pushes(&mut self) -> Vec<Shift> {
        std::mem::take(&mut self.pending_pushes)
    }

    pub fn has_local_edits(&self) -> bool {
        !self.local_edits.is_empty()
    }

    /// The source accepted a pushed move. Loads issued before this point
    /// may predate the move on the server, so they become stale.
    pub fn confirm_push(&mut self, shift_id: &str) {
        let before = self.local_edits.len();
        self.local_edits
            .retain(|edit| edit.shift_id.as_deref() != Some(shift_id));
        if self.local_edits.len() != before {
            self.sequencer.mark_local_change();
        }
    }

    /// Forgets unconfirmed edits so the next load shows the source as is.
    pub fn discard_local_edits(&mut self) {
        if !self.local_edits.is_empty() {
            tracing::info!("Discarding {} unsaved local edits", self.local_edits.len());
        }
        self.local_edits.clear();
        self.pending_pushes.clear();
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.sync_status = SyncStatus::Syncing;
        self.sequencer.issue()
    }

    /// Replaces the grid with a loaded snapshot unless something newer has
    /// happened since the load was issued.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        period: SchedulePeriod,
        snapshot: RosterSnapshot,
    ) -> bool {
        if !self.sequencer.is_current(ticket) || period != self.period() {
            tracing::debug!("Dropping stale roster load for {}", period.label());
            return false;
        }
        let store = GridStore::from_snapshot(period, snapshot);
        self.replace_store(store);
        self.replay_local_edits();
        self.sync_status = SyncStatus::Synced;
        true
    }

    /// Reapplies unconfirmed edits over freshly loaded data. Edits that no
    /// longer fit are dropped.
    fn replay_local_edits(&mut self) {
        let edits = std::mem::take(&mut self.local_edits);
        let mut dropped = 0;
        for edit in edits {
            if let (GridAction::Move { to, .. }, Some(id)) = (&edit.action, &edit.shift_id)
                && self.store.shift_at(to).is_some_and(|shift| &shift.id == id)
            {
                continue;
            }
            match self.store.dispatch(edit.action.clone()) {
                Ok(_) => self.local_edits.push(edit),
                Err(e) => {
                    tracing::info!("Local edit no longer applies: {}", e);
                    dropped += 1;
                }
            }
        }
        if dropped > 0 {
            self.set_notice(format!("{} local edits no longer apply", dropped));
        }
    }

    /// Records a failed load. Returns true when the failure belongs to the
    /// current load, i.e. a fallback should be shown.
    pub fn load_failed(&mut self, ticket: LoadTicket, message: &str) -> bool {
        if !self.sequencer.is_current(ticket) {
            return false;
        }
        self.sync_status = SyncStatus::Error(message.to_string());
        self.show_banner(format!("Could not load roster: {}", message));
        true
    }

    pub fn apply_cached(&mut self, snapshot: RosterSnapshot, saved_at: DateTime<Utc>) {
        let period = self.period();
        self.replace_store(GridStore::from_snapshot(period, snapshot));
        self.replay_local_edits();
        self.sync_status = SyncStatus::Cached(saved_at);
    }

    fn replace_store(&mut self, store: GridStore) {
        self.drag.cancel();
        if self.mode == Mode::Drag {
            self.mode = Mode::Normal;
        }
        self.store = store;
        self.clamp_cursor();
    }

    /// Switches to another period, keeping the roster and rules until the
    /// new period's data arrives.
    pub fn switch_period(&mut self, period: SchedulePeriod) {
        if period == self.period() {
            return;
        }
        let mut snapshot = self.store.to_snapshot();
        snapshot.shifts.clear();
        snapshot.vacations.clear();
        self.sequencer.mark_local_change();
        self.discard_local_edits();
        self.replace_store(GridStore::from_snapshot(period, snapshot));
    }

    /// Moves the cursor to the next employee whose name matches, wrapping.
    pub fn find(&mut self, pattern: &Regex) -> bool {
        let total = self.row_count();
        let roster = self.store.roster();
        let found = (1..=total)
            .map(|offset| (self.cursor.row + offset) % total.max(1))
            .find(|&row| roster.get(row).is_some_and(|e| pattern.is_match(&e.name)));
        match found {
            Some(row) => {
                self.select_cell(row, self.cursor.day);
                true
            }
            None => {
                self.set_notice(format!("No employee matches /{}/", pattern.as_str()));
                false
            }
        }
    }

    pub fn set_windowing(&mut self, mode: WindowingMode) {
        self.windowing = mode;
        self.clamp_cursor();
    }

    pub fn total_shifts(&self) -> usize {
        self.store.grid().len()
    }
}
