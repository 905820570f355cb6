use chrono::NaiveTime;
use wfm_grid::{
    roster::{
        Employee, PerformanceStandard, RotationMode, Shift, ShiftDefinition, ShiftKind,
        VacationAssignment, VacationPriority, VacationStatus, WorkRule,
    },
    schedule::{RosterSnapshot, SchedulePeriod},
};

const FIRST_NAMES: [&str; 12] = [
    "Ana", "Ben", "Chloe", "Dario", "Elif", "Femi", "Greta", "Hugo", "Ines", "Jonas", "Kira", "Luca",
];
const LAST_NAMES: [&str; 8] = [
    "Novak", "Okafor", "Silva", "Tanaka", "Weber", "Rossi", "Haddad", "Lind",
];

fn time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn sample_rules() -> Vec<WorkRule> {
    vec![
        WorkRule {
            id: "day-std".to_string(),
            name: "Standard day".to_string(),
            rotation: RotationMode::WithRotation,
            timezone: "UTC".to_string(),
            shifts: vec![
                ShiftDefinition { name: "Early".to_string(), start: time(6), duration_minutes: 480, kind: ShiftKind::Day },
                ShiftDefinition { name: "Late".to_string(), start: time(14), duration_minutes: 480, kind: ShiftKind::Day },
            ],
            min_hours_between_shifts: 11,
            max_consecutive_hours: 48,
            max_consecutive_days: 5,
        },
        WorkRule {
            id: "night".to_string(),
            name: "Night desk".to_string(),
            rotation: RotationMode::WithoutRotation,
            timezone: "Europe/Berlin".to_string(),
            shifts: vec![ShiftDefinition {
                name: "Night".to_string(),
                start: time(22),
                duration_minutes: 480,
                kind: ShiftKind::Night,
            }],
            min_hours_between_shifts: 12,
            max_consecutive_hours: 40,
            max_consecutive_days: 4,
        },
    ]
}

/// A roster of `size` employees for `period` with a realistic mix of
/// rotations and a few deliberate rule breaches.
pub fn build_sample_roster(period: &SchedulePeriod, size: usize) -> RosterSnapshot {
    let rules = sample_rules();
    let mut employees = Vec::with_capacity(size);
    let mut shifts = Vec::new();
    let mut vacations = Vec::new();

    for i in 0..size {
        let name = format!(
            "{} {}",
            FIRST_NAMES[i % FIRST_NAMES.len()],
            LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()]
        );
        let night_worker = i % 4 == 3;
        let rule = if night_worker { &rules[1] } else { &rules[0] };
        let performance = match i % 3 {
            0 => PerformanceStandard::Monthly { target_hours: 160 },
            1 => PerformanceStandard::Weekly { target_hours: 40 },
            _ => PerformanceStandard::None,
        };
        let employee = Employee::new(format!("emp-{:03}", i + 1), name)
            .with_role(if i % 10 == 0 { "Team Lead" } else { "Agent" })
            .with_rule(rule.id.clone())
            .with_performance(performance);

        let on_days = if i % 5 == 4 { 6 } else { 5 };
        let template = if night_worker {
            &rule.shifts[0]
        } else {
            &rule.shifts[i % rule.shifts.len()]
        };

        for day in 0..period.days {
            if (day + i) % 7 >= on_days {
                continue;
            }
            let (Some(date), Ok(bounds)) = (period.date_of(day), template.bounds()) else {
                continue;
            };
            shifts.push(Shift::new(
                format!("sample-{}-{}", i + 1, day),
                employee.id.clone(),
                date,
                bounds,
                template.kind,
            ));
        }

        if i % 9 == 0
            && let (Some(start), Some(end)) = (period.date_of(10), period.date_of(14))
        {
            vacations.push(VacationAssignment {
                employee_id: employee.id.clone(),
                start,
                end,
                priority: if i % 2 == 0 { VacationPriority::Fixed } else { VacationPriority::Normal },
                status: VacationStatus::Approved,
            });
        }

        employees.push(employee);
    }

    tracing::info!(
        "Generated sample roster: {} employees, {} shifts",
        employees.len(),
        shifts.len()
    );

    RosterSnapshot { employees, rules, shifts, vacations }
}
