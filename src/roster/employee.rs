use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an employee's scheduled hours are measured against a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PerformanceStandard {
    #[default]
    None,
    Monthly { target_hours: u32 },
    Weekly { target_hours: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    pub contracted_hours: f32,
    pub scheduled_hours: f32,
    pub skills: Vec<String>,
    pub work_rule_id: Option<String>,
    pub performance: PerformanceStandard,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: EmployeeId::new(id),
            name: name.into(),
            role: String::new(),
            contracted_hours: 0.0,
            scheduled_hours: 0.0,
            skills: vec![],
            work_rule_id: None,
            performance: PerformanceStandard::None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.work_rule_id = Some(rule_id.into());
        self
    }

    pub fn with_performance(mut self, performance: PerformanceStandard) -> Self {
        self.performance = performance;
        self
    }
}

/// Ordered employee list with an id index, so row lookups stay O(1)
/// regardless of roster size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    employees: Vec<Employee>,
    index: HashMap<EmployeeId, usize>,
}

impl Roster {
    pub fn new(employees: Vec<Employee>) -> Self {
        let mut roster = Self::default();
        for employee in employees {
            if roster.index.contains_key(&employee.id) {
                tracing::warn!("Duplicate employee {} in roster, keeping first", employee.id);
                continue;
            }
            roster.index.insert(employee.id.clone(), roster.employees.len());
            roster.employees.push(employee);
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Employee> {
        self.employees.get(row)
    }

    pub fn by_id(&self, id: &EmployeeId) -> Option<&Employee> {
        self.index.get(id).and_then(|&row| self.employees.get(row))
    }

    pub fn row_of(&self, id: &EmployeeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &EmployeeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter()
    }

    pub fn slice(&self, rows: std::ops::Range<usize>) -> &[Employee] {
        let end = rows.end.min(self.employees.len());
        let start = rows.start.min(end);
        &self.employees[start..end]
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_indexes_employees_by_id() {
        let roster = Roster::new(vec![Employee::new("e1", "Ann"), Employee::new("e2", "Bob")]);

        assert_eq!(roster.row_of(&EmployeeId::new("e2")), Some(1));
        assert_eq!(roster.by_id(&EmployeeId::new("e1")).map(|e| e.name.as_str()), Some("Ann"));
    }

    #[test]
    fn roster_drops_duplicate_ids() {
        let roster = Roster::new(vec![Employee::new("e1", "Ann"), Employee::new("e1", "Other")]);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(0).unwrap().name, "Ann");
    }

    #[test]
    fn slice_clamps_to_roster_length() {
        let roster = Roster::new((0..5).map(|i| Employee::new(format!("e{i}"), "x")).collect());

        assert_eq!(roster.slice(3..10).len(), 2);
        assert!(roster.slice(8..10).is_empty());
    }

    #[test]
    fn performance_standard_parses_from_tagged_json() {
        let parsed: PerformanceStandard =
            serde_json::from_str(r#"{"type":"monthly","target_hours":160}"#).unwrap();

        assert_eq!(parsed, PerformanceStandard::Monthly { target_hours: 160 });
    }
}
