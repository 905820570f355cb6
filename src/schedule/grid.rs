use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::roster::{
    EmployeeId, Roster, RuleBook, Shift, ShiftError, ShiftKind, VacationAssignment,
};
use crate::schedule::time::SchedulePeriod;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub employee_id: EmployeeId,
    pub day: usize,
}

impl CellKey {
    pub fn new(employee_id: EmployeeId, day: usize) -> Self {
        Self { employee_id, day }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.employee_id, self.day)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GridError {
    #[error("Cell {0} already holds a shift")]
    CellOccupied(CellKey),
    #[error("Cell {0} holds no shift")]
    NoShift(CellKey),
    #[error("Cell {0} is outside the roster or period")]
    OutOfRange(CellKey),
    #[error("Cell {0} is not a rest day")]
    NotRestDay(CellKey),
    #[error("Employee {0} has no shift template")]
    NoShiftTemplate(EmployeeId),
    #[error("Invalid shift: {0}")]
    InvalidShift(#[from] ShiftError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NoOp,
}

/// What a cell shows once vacations and shifts are both considered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellState<'a> {
    Rest,
    Work(&'a Shift),
    Vacation(&'a VacationAssignment),
}

impl CellState<'_> {
    pub fn is_work(&self) -> bool {
        matches!(self, CellState::Work(_))
    }
}

/// Everything the grid is evaluated against, loaded once per period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleContext {
    pub period: SchedulePeriod,
    pub roster: Roster,
    pub rules: RuleBook,
    vacations: HashMap<EmployeeId, Vec<VacationAssignment>>,
}

impl ScheduleContext {
    pub fn new(
        period: SchedulePeriod,
        roster: Roster,
        rules: RuleBook,
        vacations: Vec<VacationAssignment>,
    ) -> Self {
        let mut by_employee: HashMap<EmployeeId, Vec<VacationAssignment>> = HashMap::new();
        for vacation in vacations {
            by_employee.entry(vacation.employee_id.clone()).or_default().push(vacation);
        }
        Self { period, roster, rules, vacations: by_employee }
    }

    pub fn key_at(&self, row: usize, day: usize) -> Option<CellKey> {
        if day >= self.period.days {
            return None;
        }
        self.roster.get(row).map(|e| CellKey::new(e.id.clone(), day))
    }

    pub fn is_valid_key(&self, key: &CellKey) -> bool {
        key.day < self.period.days && self.roster.contains(&key.employee_id)
    }

    pub fn vacation_at(&self, key: &CellKey) -> Option<&VacationAssignment> {
        let date = self.period.date_of(key.day)?;
        self.vacations
            .get(&key.employee_id)?
            .iter()
            .find(|v| v.covers(date))
    }

    pub fn vacations(&self) -> impl Iterator<Item = &VacationAssignment> {
        self.vacations.values().flatten()
    }

    /// Vacation wins over work on the same cell.
    pub fn cell_state<'a>(&'a self, grid: &'a ScheduleGrid, key: &CellKey) -> CellState<'a> {
        if let Some(vacation) = self.vacation_at(key) {
            return CellState::Vacation(vacation);
        }
        match grid.get(key) {
            Some(shift) => CellState::Work(shift),
            None => CellState::Rest,
        }
    }
}

/// `(employee, day) -> Shift`, at most one shift per cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleGrid {
    cells: HashMap<CellKey, Shift>,
}

impl ScheduleGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the grid from loaded shifts, dropping shifts outside the
    /// period or roster and duplicates for an already occupied cell.
    pub fn from_shifts(ctx: &ScheduleContext, shifts: Vec<Shift>) -> Self {
        let mut grid = Self::new();
        for shift in shifts {
            let Some(day) = ctx.period.index_of(shift.date) else {
                tracing::debug!("Shift {} on {} is outside the period", shift.id, shift.date);
                continue;
            };
            if !ctx.roster.contains(&shift.employee_id) {
                tracing::warn!("Shift {} belongs to unknown employee {}", shift.id, shift.employee_id);
                continue;
            }
            if !shift.bounds.is_well_formed() {
                tracing::warn!("Shift {} has malformed bounds {:?}", shift.id, shift.bounds);
            }
            let key = CellKey::new(shift.employee_id.clone(), day);
            if grid.cells.contains_key(&key) {
                tracing::warn!("Duplicate shift {} for cell {}, keeping first", shift.id, key);
                continue;
            }
            grid.cells.insert(key, shift);
        }
        grid
    }

    pub fn get(&self, key: &CellKey) -> Option<&Shift> {
        self.cells.get(key)
    }

    pub fn is_occupied(&self, key: &CellKey) -> bool {
        self.cells.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn shifts(&self) -> impl Iterator<Item = (&CellKey, &Shift)> {
        self.cells.iter()
    }

    pub fn insert(&mut self, key: CellKey, shift: Shift) -> Result<(), GridError> {
        if self.cells.contains_key(&key) {
            return Err(GridError::CellOccupied(key));
        }
        self.cells.insert(key, shift);
        Ok(())
    }

    /// Moves the shift at `from` to the empty cell `to`, re-keying it with
    /// the target employee and date. On any error the grid is untouched.
    pub fn move_shift(
        &mut self,
        ctx: &ScheduleContext,
        from: &CellKey,
        to: &CellKey,
    ) -> Result<Outcome, GridError> {
        if from == to {
            return Ok(Outcome::NoOp);
        }
        if !self.cells.contains_key(from) {
            return Err(GridError::NoShift(from.clone()));
        }
        if !ctx.is_valid_key(to) {
            return Err(GridError::OutOfRange(to.clone()));
        }
        if self.cells.contains_key(to) {
            return Err(GridError::CellOccupied(to.clone()));
        }
        let date = ctx
            .period
            .date_of(to.day)
            .ok_or_else(|| GridError::OutOfRange(to.clone()))?;

        let Some(mut shift) = self.cells.remove(from) else {
            return Err(GridError::NoShift(from.clone()));
        };
        shift.employee_id = to.employee_id.clone();
        shift.date = date;
        self.cells.insert(to.clone(), shift);
        Ok(Outcome::Applied)
    }

    pub fn extend_shift(&mut self, key: &CellKey, hours: i32) -> Result<Outcome, GridError> {
        let shift = self
            .cells
            .get_mut(key)
            .ok_or_else(|| GridError::NoShift(key.clone()))?;
        if hours == 0 {
            return Ok(Outcome::NoOp);
        }
        let mut extended = shift.clone();
        extended.extend_by_hours(hours)?;
        *shift = extended;
        Ok(Outcome::Applied)
    }

    pub fn delete_shift(&mut self, key: &CellKey) -> Outcome {
        match self.cells.remove(key) {
            Some(_) => Outcome::Applied,
            None => Outcome::NoOp,
        }
    }

    /// Inserts an overtime shift built from the employee's first shift
    /// template. Only rest cells (no shift, no vacation) accept it.
    pub fn add_emergency_shift(
        &mut self,
        ctx: &ScheduleContext,
        key: &CellKey,
    ) -> Result<Outcome, GridError> {
        if !ctx.is_valid_key(key) {
            return Err(GridError::OutOfRange(key.clone()));
        }
        if !matches!(ctx.cell_state(self, key), CellState::Rest) {
            return Err(GridError::NotRestDay(key.clone()));
        }
        let template = ctx
            .roster
            .by_id(&key.employee_id)
            .and_then(|e| e.work_rule_id.as_deref())
            .and_then(|rule_id| ctx.rules.get(rule_id))
            .and_then(|rule| rule.first_template())
            .ok_or_else(|| GridError::NoShiftTemplate(key.employee_id.clone()))?;
        let date = ctx
            .period
            .date_of(key.day)
            .ok_or_else(|| GridError::OutOfRange(key.clone()))?;

        let mut shift = Shift::new(
            format!("emergency-{}", Uuid::new_v4()),
            key.employee_id.clone(),
            date,
            template.bounds()?,
            ShiftKind::Overtime,
        );
        shift.status = "emergency".to_string();
        self.insert(key.clone(), shift)?;
        Ok(Outcome::Applied)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::roster::{
        Employee, RotationMode, ShiftBounds, ShiftDefinition, WorkRule,
    };

    pub fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    pub fn rule(max_days: u32, min_rest: u32) -> WorkRule {
        WorkRule {
            id: "std".to_string(),
            name: "Standard".to_string(),
            rotation: RotationMode::WithoutRotation,
            timezone: "UTC".to_string(),
            shifts: vec![ShiftDefinition {
                name: "Day".to_string(),
                start: t(8, 0),
                duration_minutes: 480,
                kind: ShiftKind::Day,
            }],
            min_hours_between_shifts: min_rest,
            max_consecutive_hours: 100,
            max_consecutive_days: max_days,
        }
    }

    /// March 2025 (starts on a Saturday; day 2 is Monday the 3rd).
    pub fn context(employees: usize, rule: WorkRule) -> ScheduleContext {
        let roster = Roster::new(
            (1..=employees)
                .map(|i| Employee::new(format!("emp{i}"), format!("Employee {i}")).with_rule("std"))
                .collect(),
        );
        ScheduleContext::new(
            SchedulePeriod::month(2025, 3).unwrap(),
            roster,
            RuleBook::new(vec![rule]),
            vec![],
        )
    }

    pub fn key(employee: usize, day: usize) -> CellKey {
        CellKey::new(EmployeeId::new(format!("emp{employee}")), day)
    }

    pub fn shift(ctx: &ScheduleContext, employee: usize, day: usize, start: NaiveTime, end: NaiveTime) -> Shift {
        let date: NaiveDate = ctx.period.date_of(day).unwrap();
        Shift::new(
            format!("s-{employee}-{day}"),
            EmployeeId::new(format!("emp{employee}")),
            date,
            ShiftBounds::wrapping(start, end),
            ShiftKind::Day,
        )
    }

    pub fn grid_with(ctx: &ScheduleContext, cells: &[(usize, usize)]) -> ScheduleGrid {
        ScheduleGrid::from_shifts(
            ctx,
            cells.iter().map(|&(e, d)| shift(ctx, e, d, t(8, 0), t(16, 0))).collect(),
        )
    }
}


#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::fixtures::*;
    use super::*;
    use crate::schedule::time::{shift_duration_minutes, MINUTES_PER_DAY};
    use crate::schedule::validator::{validate, ViolationKind};

    fn cells() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((1usize..=4, 0usize..31), 0..40)
    }

    proptest! {
        #[test]
        fn move_never_creates_or_loses_shifts(
            occupied in cells(),
            from in (1usize..=4, 0usize..31),
            to in (1usize..=4, 0usize..31),
        ) {
            let ctx = context(4, rule(5, 11));
            let mut grid = grid_with(&ctx, &occupied);
            let before = grid.len();
            let target_was_empty = !grid.is_occupied(&key(to.0, to.1));

            let result = grid.move_shift(&ctx, &key(from.0, from.1), &key(to.0, to.1));

            prop_assert_eq!(grid.len(), before);
            if result == Ok(Outcome::Applied) {
                prop_assert!(target_was_empty);
                prop_assert!(grid.is_occupied(&key(to.0, to.1)));
                prop_assert!(!grid.is_occupied(&key(from.0, from.1)));
            }
        }

        #[test]
        fn moving_onto_itself_is_a_no_op(occupied in cells(), cell in (1usize..=4, 0usize..31)) {
            let ctx = context(4, rule(5, 11));
            let mut grid = grid_with(&ctx, &occupied);
            let before = grid.clone();

            let result = grid.move_shift(&ctx, &key(cell.0, cell.1), &key(cell.0, cell.1));

            prop_assert_eq!(result, Ok(Outcome::NoOp));
            prop_assert_eq!(grid, before);
        }

        #[test]
        fn moving_onto_an_occupied_cell_changes_nothing(
            occupied in cells(),
            from in (1usize..=4, 0usize..31),
            to in (1usize..=4, 0usize..31),
        ) {
            prop_assume!(from != to);
            let ctx = context(4, rule(5, 11));
            let mut all = occupied.clone();
            all.push(from);
            all.push(to);
            let mut grid = grid_with(&ctx, &all);
            let before = grid.clone();

            let result = grid.move_shift(&ctx, &key(from.0, from.1), &key(to.0, to.1));

            prop_assert_eq!(result, Err(GridError::CellOccupied(key(to.0, to.1))));
            prop_assert_eq!(grid, before);
        }

        #[test]
        fn duration_stays_within_a_day(sh in 0u32..24, sm in 0u32..60, eh in 0u32..24, em in 0u32..60) {
            let minutes = shift_duration_minutes(t(sh, sm), t(eh, em));

            prop_assert!(minutes < MINUTES_PER_DAY);
        }

        #[test]
        fn streak_longer_than_allowed_is_flagged(
            start in 0usize..15,
            length in 1usize..=12,
            max_days in 1u32..8,
        ) {
            let ctx = context(1, rule(max_days, 11));
            let run: Vec<(usize, usize)> = (start..start + length).map(|d| (1, d)).collect();
            let grid = grid_with(&ctx, &run);

            let flagged = validate(&ctx, &grid)
                .iter()
                .any(|v| matches!(v.kind, ViolationKind::ConsecutiveDays { .. }));

            prop_assert_eq!(flagged, length > max_days as usize);
        }

        #[test]
        fn raising_the_day_limit_never_adds_violations(occupied in cells(), max_days in 1u32..10) {
            let count = |limit: u32| {
                let ctx = context(4, rule(limit, 11));
                let grid = grid_with(&ctx, &occupied);
                validate(&ctx, &grid)
                    .iter()
                    .filter(|v| matches!(v.kind, ViolationKind::ConsecutiveDays { .. }))
                    .count()
            };

            prop_assert!(count(max_days + 1) <= count(max_days));
        }
    }
}
