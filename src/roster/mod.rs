pub mod employee;
pub mod shift;
pub mod vacation;
pub mod work_rule;

pub use employee::{Employee, EmployeeId, PerformanceStandard, Roster};
pub use shift::{Shift, ShiftBounds, ShiftError, ShiftKind};
pub use vacation::{VacationAssignment, VacationPriority, VacationStatus};
pub use work_rule::{RotationMode, RuleBook, RuleError, ShiftDefinition, WorkRule};
