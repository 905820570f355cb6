use std::collections::HashMap;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::shift::{ShiftBounds, ShiftError, ShiftKind};
use crate::schedule::time::MINUTES_PER_DAY;

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("Rest between shifts must be 8-24 hours, got {0}")]
    RestOutOfRange(u32),
    #[error("Maximum consecutive days must be at least 1")]
    NoConsecutiveDays,
    #[error("Maximum consecutive hours must be at least 1")]
    NoConsecutiveHours,
    #[error("Shift template '{0}' has an invalid duration")]
    InvalidTemplate(String),
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    WithRotation,
    WithoutRotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub name: String,
    pub start: NaiveTime,
    pub duration_minutes: u32,
    pub kind: ShiftKind,
}

impl ShiftDefinition {
    pub fn bounds(&self) -> Result<ShiftBounds, ShiftError> {
        ShiftBounds::from_duration(self.start, self.duration_minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRule {
    pub id: String,
    pub name: String,
    pub rotation: RotationMode,
    pub timezone: String,
    pub shifts: Vec<ShiftDefinition>,
    pub min_hours_between_shifts: u32,
    pub max_consecutive_hours: u32,
    pub max_consecutive_days: u32,
}

impl WorkRule {
    pub fn validate(&self) -> Result<(), RuleError> {
        if !(8..=24).contains(&self.min_hours_between_shifts) {
            return Err(RuleError::RestOutOfRange(self.min_hours_between_shifts));
        }
        if self.max_consecutive_days == 0 {
            return Err(RuleError::NoConsecutiveDays);
        }
        if self.max_consecutive_hours == 0 {
            return Err(RuleError::NoConsecutiveHours);
        }
        if let Some(bad) = self
            .shifts
            .iter()
            .find(|s| s.duration_minutes == 0 || s.duration_minutes >= MINUTES_PER_DAY)
        {
            return Err(RuleError::InvalidTemplate(bad.name.clone()));
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, RuleError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| RuleError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn first_template(&self) -> Option<&ShiftDefinition> {
        self.shifts.first()
    }
}

/// Work rules keyed by id. Only rules that pass validation get in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleBook {
    rules: HashMap<String, WorkRule>,
}

impl RuleBook {
    pub fn new(rules: Vec<WorkRule>) -> Self {
        let mut book = Self::default();
        for rule in rules {
            if let Err(e) = book.insert(rule) {
                tracing::warn!("Dropping work rule: {}", e);
            }
        }
        book
    }

    pub fn insert(&mut self, rule: WorkRule) -> Result<(), RuleError> {
        rule.validate()?;
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&WorkRule> {
        self.rules.get(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &WorkRule> {
        self.rules.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> WorkRule {
        WorkRule {
            id: "std".to_string(),
            name: "Standard".to_string(),
            rotation: RotationMode::WithoutRotation,
            timezone: "Europe/Berlin".to_string(),
            shifts: vec![ShiftDefinition {
                name: "Early".to_string(),
                start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                duration_minutes: 480,
                kind: ShiftKind::Day,
            }],
            min_hours_between_shifts: 11,
            max_consecutive_hours: 60,
            max_consecutive_days: 5,
        }
    }

    #[test]
    fn consistent_rule_validates() {
        assert_eq!(rule().validate(), Ok(()));
    }

    #[test]
    fn rest_below_eight_hours_is_rejected() {
        let mut r = rule();
        r.min_hours_between_shifts = 6;

        assert_eq!(r.validate(), Err(RuleError::RestOutOfRange(6)));
    }

    #[test]
    fn rest_above_a_day_is_rejected() {
        let mut r = rule();
        r.min_hours_between_shifts = 25;

        assert_eq!(r.validate(), Err(RuleError::RestOutOfRange(25)));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut r = rule();
        r.timezone = "Mars/Olympus".to_string();

        assert!(matches!(r.validate(), Err(RuleError::UnknownTimezone(_))));
    }

    #[test]
    fn zero_length_template_is_rejected() {
        let mut r = rule();
        r.shifts[0].duration_minutes = 0;

        assert_eq!(r.validate(), Err(RuleError::InvalidTemplate("Early".to_string())));
    }

    #[test]
    fn rule_book_skips_invalid_rules() {
        let mut bad = rule();
        bad.id = "bad".to_string();
        bad.max_consecutive_days = 0;

        let book = RuleBook::new(vec![rule(), bad]);

        assert_eq!(book.len(), 1);
        assert!(book.get("bad").is_none());
    }
}
