use serde::{Deserialize, Serialize};

use crate::roster::{Employee, Roster, RuleBook, Shift, VacationAssignment, WorkRule};
use crate::schedule::grid::{CellKey, CellState, GridError, Outcome, ScheduleContext, ScheduleGrid};
use crate::schedule::time::SchedulePeriod;
use crate::schedule::validator::{validate, Violation};

/// Everything loaded for one period, from the roster source or the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub employees: Vec<Employee>,
    pub rules: Vec<WorkRule>,
    pub shifts: Vec<Shift>,
    pub vacations: Vec<VacationAssignment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridAction {
    Move { from: CellKey, to: CellKey },
    Extend { cell: CellKey, hours: i32 },
    Delete { cell: CellKey },
    AddEmergency { cell: CellKey },
}

/// Owns the grid for one period and keeps the violation list in step with
/// every applied action.
#[derive(Debug, Clone, Default)]
pub struct GridStore {
    ctx: ScheduleContext,
    grid: ScheduleGrid,
    violations: Vec<Violation>,
}

impl GridStore {
    pub fn new(ctx: ScheduleContext, grid: ScheduleGrid) -> Self {
        let violations = validate(&ctx, &grid);
        Self { ctx, grid, violations }
    }

    pub fn empty(period: SchedulePeriod) -> Self {
        Self::new(
            ScheduleContext::new(period, Roster::default(), RuleBook::default(), vec![]),
            ScheduleGrid::new(),
        )
    }

    pub fn from_snapshot(period: SchedulePeriod, snapshot: RosterSnapshot) -> Self {
        let ctx = ScheduleContext::new(
            period,
            Roster::new(snapshot.employees),
            RuleBook::new(snapshot.rules),
            snapshot.vacations,
        );
        let grid = ScheduleGrid::from_shifts(&ctx, snapshot.shifts);
        tracing::info!(
            "Loaded {} employees and {} shifts for {}",
            ctx.roster.len(),
            grid.len(),
            period.label()
        );
        Self::new(ctx, grid)
    }

    pub fn to_snapshot(&self) -> RosterSnapshot {
        let mut shifts: Vec<Shift> = self.grid.shifts().map(|(_, s)| s.clone()).collect();
        shifts.sort_by(|a, b| (&a.employee_id, a.date).cmp(&(&b.employee_id, b.date)));
        RosterSnapshot {
            employees: self.ctx.roster.employees().to_vec(),
            rules: self.ctx.rules.values().cloned().collect(),
            shifts,
            vacations: self.ctx.vacations().cloned().collect(),
        }
    }

    pub fn context(&self) -> &ScheduleContext {
        &self.ctx
    }

    pub fn period(&self) -> &SchedulePeriod {
        &self.ctx.period
    }

    pub fn roster(&self) -> &Roster {
        &self.ctx.roster
    }

    pub fn grid(&self) -> &ScheduleGrid {
        &self.grid
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn shift_at(&self, key: &CellKey) -> Option<&Shift> {
        self.grid.get(key)
    }

    pub fn cell_state(&self, key: &CellKey) -> CellState<'_> {
        self.ctx.cell_state(&self.grid, key)
    }

    /// Scheduled minutes for one employee, vacation days excluded.
    pub fn scheduled_minutes(&self, employee: &Employee) -> u32 {
        (0..self.ctx.period.days)
            .filter_map(|day| match self.cell_state(&CellKey::new(employee.id.clone(), day)) {
                CellState::Work(shift) => shift.duration_minutes(),
                _ => None,
            })
            .sum()
    }

    pub fn dispatch(&mut self, action: GridAction) -> Result<Outcome, GridError> {
        let outcome = match &action {
            GridAction::Move { from, to } => self.grid.move_shift(&self.ctx, from, to)?,
            GridAction::Extend { cell, hours } => self.grid.extend_shift(cell, *hours)?,
            GridAction::Delete { cell } => self.grid.delete_shift(cell),
            GridAction::AddEmergency { cell } => self.grid.add_emergency_shift(&self.ctx, cell)?,
        };
        if outcome == Outcome::Applied {
            tracing::info!("Applied {:?}", action);
            self.revalidate();
        }
        Ok(outcome)
    }

    pub fn revalidate(&mut self) {
        self.violations = validate(&self.ctx, &self.grid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::ShiftKind;
    use crate::schedule::grid::fixtures::*;

    fn store_with(cells: &[(usize, usize)]) -> GridStore {
        let ctx = context(2, rule(5, 11));
        let grid = grid_with(&ctx, cells);
        GridStore::new(ctx, grid)
    }

    #[test]
    fn store_validates_on_construction() {
        let store = store_with(&[(1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7)]);

        assert_eq!(store.violations().len(), 1);
    }

    #[test]
    fn moving_a_shift_out_of_a_streak_clears_the_violation() {
        let mut store = store_with(&[(1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7)]);

        let outcome = store
            .dispatch(GridAction::Move { from: key(1, 7), to: key(2, 7) })
            .unwrap();

        assert_eq!(outcome, Outcome::Applied);
        assert!(store.violations().is_empty());
        assert_eq!(store.grid().len(), 6);
    }

    #[test]
    fn rejected_move_leaves_state_and_violations_alone() {
        let mut store = store_with(&[(1, 2), (2, 2)]);
        let grid_before = store.grid().clone();
        let violations_before = store.violations().to_vec();

        let result = store.dispatch(GridAction::Move { from: key(1, 2), to: key(2, 2) });

        assert!(matches!(result, Err(GridError::CellOccupied(_))));
        assert_eq!(store.grid(), &grid_before);
        assert_eq!(store.violations(), violations_before.as_slice());
    }

    #[test]
    fn delete_then_emergency_add_restores_shift_count() {
        let mut store = store_with(&[(1, 4)]);

        store.dispatch(GridAction::Delete { cell: key(1, 4) }).unwrap();
        assert_eq!(store.grid().len(), 0);

        store.dispatch(GridAction::AddEmergency { cell: key(1, 4) }).unwrap();
        assert_eq!(store.shift_at(&key(1, 4)).unwrap().kind, ShiftKind::Overtime);
    }

    #[test]
    fn extension_revalidates_rest_gaps() {
        let ctx = context(1, rule(5, 11));
        let grid = ScheduleGrid::from_shifts(
            &ctx,
            vec![shift(&ctx, 1, 2, t(8, 0), t(16, 0)), shift(&ctx, 1, 3, t(8, 0), t(16, 0))],
        );
        let mut store = GridStore::new(ctx, grid);
        assert!(store.violations().is_empty());

        store.dispatch(GridAction::Extend { cell: key(1, 2), hours: 6 }).unwrap();

        assert_eq!(store.violations().len(), 1);
    }

    #[test]
    fn scheduled_minutes_sums_work_cells() {
        let store = store_with(&[(1, 2), (1, 9), (2, 3)]);
        let employee = store.roster().get(0).unwrap().clone();

        assert_eq!(store.scheduled_minutes(&employee), 16 * 60);
    }

    #[test]
    fn snapshot_round_trips_through_store() {
        let store = store_with(&[(1, 2), (2, 3)]);

        let rebuilt = GridStore::from_snapshot(*store.period(), store.to_snapshot());

        assert_eq!(rebuilt.grid(), store.grid());
        assert_eq!(rebuilt.roster(), store.roster());
    }
}
