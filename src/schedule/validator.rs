//! Labor-rule checks over a schedule grid.
//!
//! Violations are advisory: the schedule stays editable and nothing here
//! fails. Output order is roster order, then date order within an employee,
//! with period-level hour checks last.

use std::fmt;

use chrono::NaiveDate;

use crate::roster::{Employee, EmployeeId, PerformanceStandard, Shift, WorkRule};
use crate::schedule::grid::{CellKey, CellState, ScheduleContext, ScheduleGrid};
use crate::schedule::time::rest_minutes;

#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    ConsecutiveDays { observed: u32, allowed: u32 },
    ConsecutiveHours { observed_minutes: u32, allowed_hours: u32 },
    InsufficientRest { observed_minutes: i64, required_hours: u32 },
    UndefinedDuration,
    MonthlyHours { scheduled_minutes: u32, target_hours: u32 },
    WeeklyHours { week_start: NaiveDate, scheduled_minutes: u32, target_hours: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub date: Option<NaiveDate>,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn hours(minutes: i64) -> String {
    format!("{:.1}h", minutes as f64 / 60.0)
}

fn deviation(scheduled_minutes: u32, target_hours: u32) -> String {
    let diff = scheduled_minutes as i64 - target_hours as i64 * 60;
    let sign = if diff > 0 { "+" } else { "" };
    format!("{}{}", sign, hours(diff))
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.employee_name;
        let date = self
            .date
            .map(|d| d.format("%a %Y-%m-%d").to_string())
            .unwrap_or_default();
        match &self.kind {
            ViolationKind::ConsecutiveDays { observed, allowed } => write!(
                f,
                "{}: {} consecutive work days reached on {} (max {})",
                name, observed, date, allowed
            ),
            ViolationKind::ConsecutiveHours { observed_minutes, allowed_hours } => write!(
                f,
                "{}: {} of consecutive work reached on {} (max {}h)",
                name,
                hours(*observed_minutes as i64),
                date,
                allowed_hours
            ),
            ViolationKind::InsufficientRest { observed_minutes, required_hours } => write!(
                f,
                "{}: only {} rest before shift on {} (min {}h)",
                name,
                hours(*observed_minutes),
                date,
                required_hours
            ),
            ViolationKind::UndefinedDuration => write!(
                f,
                "{}: shift on {} has an undefined duration",
                name, date
            ),
            ViolationKind::MonthlyHours { scheduled_minutes, target_hours } => write!(
                f,
                "{}: {} scheduled this month, target {}h ({})",
                name,
                hours(*scheduled_minutes as i64),
                target_hours,
                deviation(*scheduled_minutes, *target_hours)
            ),
            ViolationKind::WeeklyHours { week_start, scheduled_minutes, target_hours } => write!(
                f,
                "{}: {} scheduled in week of {}, target {}h ({})",
                name,
                hours(*scheduled_minutes as i64),
                week_start.format("%Y-%m-%d"),
                target_hours,
                deviation(*scheduled_minutes, *target_hours)
            ),
        }
    }
}

/// Validates every employee in the roster against their work rule and
/// performance standard.
pub fn validate(ctx: &ScheduleContext, grid: &ScheduleGrid) -> Vec<Violation> {
    let mut violations = Vec::new();
    for employee in ctx.roster.iter() {
        validate_employee(ctx, grid, employee, &mut violations);
    }
    violations
}

#[derive(Default)]
struct Streak {
    days: u32,
    minutes: u32,
    days_reported: bool,
    hours_reported: bool,
}

fn validate_employee(
    ctx: &ScheduleContext,
    grid: &ScheduleGrid,
    employee: &Employee,
    out: &mut Vec<Violation>,
) {
    let rule = employee
        .work_rule_id
        .as_deref()
        .and_then(|id| ctx.rules.get(id));

    let violation = |date: Option<NaiveDate>, kind: ViolationKind| Violation {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        date,
        kind,
    };

    let mut streak = Streak::default();
    let mut previous: Option<&Shift> = None;
    let mut daily_minutes = vec![0u32; ctx.period.days];

    for day in 0..ctx.period.days {
        let key = CellKey::new(employee.id.clone(), day);
        let CellState::Work(shift) = ctx.cell_state(grid, &key) else {
            streak = Streak::default();
            continue;
        };

        let duration = shift.duration_minutes();
        match duration {
            Some(minutes) => daily_minutes[day] = minutes,
            None => out.push(violation(Some(shift.date), ViolationKind::UndefinedDuration)),
        }

        streak.days += 1;
        streak.minutes += duration.unwrap_or(0);

        if let Some(rule) = rule {
            if duration.is_some() {
                check_rest(rule, previous, shift, &violation, out);
            }
            check_streak(rule, &mut streak, shift.date, &violation, out);
        }

        if duration.is_some() {
            previous = Some(shift);
        }
    }

    check_performance(ctx, employee.performance, &daily_minutes, &violation, out);
}

fn check_rest(
    rule: &WorkRule,
    previous: Option<&Shift>,
    shift: &Shift,
    violation: &impl Fn(Option<NaiveDate>, ViolationKind) -> Violation,
    out: &mut Vec<Violation>,
) {
    let Some(rest) = previous.and_then(|p| rest_minutes(p, shift)) else {
        return;
    };
    if rest < rule.min_hours_between_shifts as i64 * 60 {
        out.push(violation(
            Some(shift.date),
            ViolationKind::InsufficientRest {
                observed_minutes: rest,
                required_hours: rule.min_hours_between_shifts,
            },
        ));
    }
}

fn check_streak(
    rule: &WorkRule,
    streak: &mut Streak,
    date: NaiveDate,
    violation: &impl Fn(Option<NaiveDate>, ViolationKind) -> Violation,
    out: &mut Vec<Violation>,
) {
    if streak.days > rule.max_consecutive_days && !streak.days_reported {
        streak.days_reported = true;
        out.push(violation(
            Some(date),
            ViolationKind::ConsecutiveDays {
                observed: streak.days,
                allowed: rule.max_consecutive_days,
            },
        ));
    }
    if streak.minutes > rule.max_consecutive_hours * 60 && !streak.hours_reported {
        streak.hours_reported = true;
        out.push(violation(
            Some(date),
            ViolationKind::ConsecutiveHours {
                observed_minutes: streak.minutes,
                allowed_hours: rule.max_consecutive_hours,
            },
        ));
    }
}

fn check_performance(
    ctx: &ScheduleContext,
    performance: PerformanceStandard,
    daily_minutes: &[u32],
    violation: &impl Fn(Option<NaiveDate>, ViolationKind) -> Violation,
    out: &mut Vec<Violation>,
) {
    match performance {
        PerformanceStandard::None => {}
        PerformanceStandard::Monthly { target_hours } => {
            let scheduled_minutes: u32 = daily_minutes.iter().sum();
            if scheduled_minutes != target_hours * 60 {
                out.push(violation(
                    None,
                    ViolationKind::MonthlyHours { scheduled_minutes, target_hours },
                ));
            }
        }
        PerformanceStandard::Weekly { target_hours } => {
            for week in ctx.period.full_weeks() {
                let Some(week_start) = ctx.period.date_of(week.start) else {
                    continue;
                };
                let scheduled_minutes: u32 = daily_minutes[week].iter().sum();
                if scheduled_minutes != target_hours * 60 {
                    out.push(violation(
                        Some(week_start),
                        ViolationKind::WeeklyHours { week_start, scheduled_minutes, target_hours },
                    ));
                }
            }
        }
    }
}
