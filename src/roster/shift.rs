use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::EmployeeId;
use crate::schedule::time::{minutes_of_day, shift_duration_minutes, MINUTES_PER_DAY};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShiftError {
    #[error("Shift ends at {end} before it starts at {start} and is not overnight")]
    EndBeforeStart { start: NaiveTime, end: NaiveTime },
    #[error("Shift duration must be between 1 and 1439 minutes, got {0}")]
    InvalidDuration(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    Day,
    Night,
    Overtime,
}

/// Start/end time of day. `overnight` marks shifts that finish on the
/// following calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBounds {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub overnight: bool,
}

impl ShiftBounds {
    pub fn new(start: NaiveTime, end: NaiveTime, overnight: bool) -> Result<Self, ShiftError> {
        if !overnight && end <= start {
            return Err(ShiftError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end, overnight })
    }

    /// Bounds that wrap past midnight whenever `end <= start`.
    pub fn wrapping(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end, overnight: end <= start }
    }

    pub fn from_duration(start: NaiveTime, duration_minutes: u32) -> Result<Self, ShiftError> {
        if duration_minutes == 0 || duration_minutes >= MINUTES_PER_DAY {
            return Err(ShiftError::InvalidDuration(duration_minutes as i64));
        }
        let end = start + Duration::minutes(duration_minutes as i64);
        Ok(Self {
            start,
            end,
            overnight: minutes_of_day(start) + duration_minutes >= MINUTES_PER_DAY,
        })
    }

    /// Bounds as delivered by an external source, kept even when malformed.
    pub fn unchecked(start: NaiveTime, end: NaiveTime, overnight: bool) -> Self {
        Self { start, end, overnight }
    }

    pub fn is_well_formed(&self) -> bool {
        self.overnight || self.end > self.start
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.is_well_formed()
            .then(|| shift_duration_minutes(self.start, self.end))
    }

    pub fn label(&self) -> String {
        if self.start.minute() == 0 && self.end.minute() == 0 {
            format!("{:02}-{:02}", self.start.hour(), self.end.hour())
        } else {
            format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub bounds: ShiftBounds,
    pub kind: ShiftKind,
    pub status: String,
}

impl Shift {
    pub fn new(
        id: impl Into<String>,
        employee_id: EmployeeId,
        date: NaiveDate,
        bounds: ShiftBounds,
        kind: ShiftKind,
    ) -> Self {
        Self {
            id: id.into(),
            employee_id,
            date,
            bounds,
            kind,
            status: "scheduled".to_string(),
        }
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.bounds.duration_minutes()
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.bounds.start)
    }

    /// End as a real datetime, `None` when the bounds are malformed.
    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        let minutes = self.duration_minutes()?;
        Some(self.starts_at() + Duration::minutes(minutes as i64))
    }

    /// Lengthens (or shortens) the shift by whole hours, keeping the start.
    pub fn extend_by_hours(&mut self, hours: i32) -> Result<(), ShiftError> {
        let current = self.duration_minutes().ok_or(ShiftError::EndBeforeStart {
            start: self.bounds.start,
            end: self.bounds.end,
        })? as i64;
        let total = current + hours as i64 * 60;
        if total <= 0 || total >= MINUTES_PER_DAY as i64 {
            return Err(ShiftError::InvalidDuration(total));
        }
        self.bounds = ShiftBounds::from_duration(self.bounds.start, total as u32)?;
        if hours > 0 {
            self.kind = ShiftKind::Overtime;
        }
        Ok(())
    }
}
