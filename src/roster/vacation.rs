use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::roster::EmployeeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacationPriority {
    Normal,
    Priority,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacationStatus {
    Requested,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationAssignment {
    pub employee_id: EmployeeId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub priority: VacationPriority,
    pub status: VacationStatus,
}

impl VacationAssignment {
    /// Rejected requests never block a cell.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.status != VacationStatus::Rejected && self.start <= date && date <= self.end
    }
}
