use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::{
    Employee, EmployeeId, PerformanceStandard, RotationMode, Shift, ShiftBounds,
    ShiftDefinition, ShiftKind, VacationAssignment, VacationPriority, VacationStatus, WorkRule,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Accepts `H:MM`, `HH:MM` and `HH:MM:SS`.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, ApiError> {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    let pattern = TIME_RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("invalid time regex")
    });

    let caps = pattern
        .captures(input.trim())
        .ok_or_else(|| ApiError::ParseError(format!("Invalid time: {}", input)))?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok()).unwrap_or(0);

    NaiveTime::from_hms_opt(field(1), field(2), field(3))
        .ok_or_else(|| ApiError::ParseError(format!("Time out of range: {}", input)))
}

fn parse_kind(value: Option<&str>) -> ShiftKind {
    match value {
        Some("night") => ShiftKind::Night,
        Some("overtime") => ShiftKind::Overtime,
        _ => ShiftKind::Day,
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PerformanceRecord {
    standard: String,
    target_hours: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeRecord {
    id: String,
    name: String,
    role: Option<String>,
    scheduled_hours: Option<f32>,
    contracted_hours: Option<f32>,
    #[serde(default)]
    skills: Vec<String>,
    work_rule_id: Option<String>,
    performance: Option<PerformanceRecord>,
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        let performance = match record.performance {
            Some(PerformanceRecord { standard, target_hours: Some(target_hours) }) => {
                match standard.as_str() {
                    "monthly" => PerformanceStandard::Monthly { target_hours },
                    "weekly" => PerformanceStandard::Weekly { target_hours },
                    _ => PerformanceStandard::None,
                }
            }
            _ => PerformanceStandard::None,
        };
        Employee {
            id: EmployeeId::new(record.id),
            name: record.name,
            role: record.role.unwrap_or_default(),
            contracted_hours: record.contracted_hours.unwrap_or_default(),
            scheduled_hours: record.scheduled_hours.unwrap_or_default(),
            skills: record.skills,
            work_rule_id: record.work_rule_id,
            performance,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShiftTemplateRecord {
    name: String,
    start_time: String,
    duration_minutes: u32,
    shift_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkRuleRecord {
    id: String,
    name: String,
    mode: Option<String>,
    timezone: Option<String>,
    #[serde(default)]
    shifts: Vec<ShiftTemplateRecord>,
    min_hours_between_shifts: u32,
    max_consecutive_hours: u32,
    max_consecutive_days: u32,
}

impl TryFrom<WorkRuleRecord> for WorkRule {
    type Error = ApiError;

    fn try_from(record: WorkRuleRecord) -> Result<Self, Self::Error> {
        let shifts = record
            .shifts
            .into_iter()
            .map(|s| {
                Ok(ShiftDefinition {
                    name: s.name,
                    start: parse_time_of_day(&s.start_time)?,
                    duration_minutes: s.duration_minutes,
                    kind: parse_kind(s.shift_type.as_deref()),
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(WorkRule {
            id: record.id,
            name: record.name,
            rotation: match record.mode.as_deref() {
                Some("with_rotation") => RotationMode::WithRotation,
                _ => RotationMode::WithoutRotation,
            },
            timezone: record.timezone.unwrap_or_else(|| "UTC".to_string()),
            shifts,
            min_hours_between_shifts: record.min_hours_between_shifts,
            max_consecutive_hours: record.max_consecutive_hours,
            max_consecutive_days: record.max_consecutive_days,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub status: String,
    pub shift_type: Option<String>,
    pub overnight: Option<bool>,
}

impl TryFrom<ShiftRecord> for Shift {
    type Error = ApiError;

    fn try_from(record: ShiftRecord) -> Result<Self, Self::Error> {
        let start = parse_time_of_day(&record.start_time)?;
        let end = parse_time_of_day(&record.end_time)?;
        let kind = parse_kind(record.shift_type.as_deref());
        let overnight = record
            .overnight
            .unwrap_or(kind == ShiftKind::Night && end <= start);
        let bounds = ShiftBounds::new(start, end, overnight).unwrap_or_else(|e| {
            tracing::warn!("Shift {} from source: {}", record.id, e);
            ShiftBounds::unchecked(start, end, overnight)
        });
        Ok(Shift {
            id: record.id,
            employee_id: EmployeeId::new(record.employee_id),
            date: record.date,
            bounds,
            kind,
            status: record.status,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VacationRecord {
    employee_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    priority: Option<String>,
    status: Option<String>,
}

impl From<VacationRecord> for VacationAssignment {
    fn from(record: VacationRecord) -> Self {
        VacationAssignment {
            employee_id: EmployeeId::new(record.employee_id),
            start: record.start_date,
            end: record.end_date,
            priority: match record.priority.as_deref() {
                Some("fixed") => VacationPriority::Fixed,
                Some("priority") => VacationPriority::Priority,
                _ => VacationPriority::Normal,
            },
            status: match record.status.as_deref() {
                Some("approved") => VacationStatus::Approved,
                Some("rejected") => VacationStatus::Rejected,
                _ => VacationStatus::Requested,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveShiftRequest {
    pub shift_id: String,
    pub new_employee_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub shift_type: ShiftKind,
    pub overnight: bool,
}

impl From<&Shift> for MoveShiftRequest {
    fn from(shift: &Shift) -> Self {
        Self {
            shift_id: shift.id.clone(),
            new_employee_id: shift.employee_id.to_string(),
            date: shift.date,
            start_time: shift.bounds.start.format("%H:%M").to_string(),
            end_time: shift.bounds.end.format("%H:%M").to_string(),
            shift_type: shift.kind,
            overnight: shift.bounds.overnight,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterApi: Send + Sync {
    async fn fetch_employees(&self) -> Result<Vec<Employee>, ApiError>;

    async fn fetch_work_rules(&self) -> Result<Vec<WorkRule>, ApiError>;

    async fn fetch_shifts(&self, range: DateRange) -> Result<Vec<Shift>, ApiError>;

    async fn fetch_vacations(&self, range: DateRange) -> Result<Vec<VacationAssignment>, ApiError>;

    async fn move_shift(&self, request: MoveShiftRequest) -> Result<Shift, ApiError>;
}

pub struct RestRosterClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RestRosterClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        tracing::info!("{} response status: {}", what, status);

        if status == 401 {
            tracing::error!("Authentication failed for {}", what);
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Not found: {}", what);
            return Err(ApiError::NotFound(what.to_string()));
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed {}. Status: {}, Body: {}", what, status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::ParseError(format!("{}: {}", what, e)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        range: Option<DateRange>,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.authorize(self.client.get(&url));
        if let Some(range) = range {
            request = request.query(&[
                ("from", range.start.to_string()),
                ("to", range.end.to_string()),
            ]);
        }
        let response = request.send().await?;
        Self::read_json(response, path).await
    }
}

#[async_trait]
impl RosterApi for RestRosterClient {
    async fn fetch_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let records: Vec<EmployeeRecord> = self.get("employees", None).await?;
        tracing::info!("Fetched {} employees", records.len());
        Ok(records.into_iter().map(Employee::from).collect())
    }

    async fn fetch_work_rules(&self) -> Result<Vec<WorkRule>, ApiError> {
        let records: Vec<WorkRuleRecord> = self.get("work-rules", None).await?;
        Ok(records
            .into_iter()
            .filter_map(|r| {
                let id = r.id.clone();
                WorkRule::try_from(r)
                    .map_err(|e| tracing::warn!("Skipping work rule {}: {}", id, e))
                    .ok()
            })
            .collect())
    }

    async fn fetch_shifts(&self, range: DateRange) -> Result<Vec<Shift>, ApiError> {
        tracing::info!("Fetching shifts from {} to {}", range.start, range.end);
        let records: Vec<ShiftRecord> = self.get("shifts", Some(range)).await?;
        let shifts: Vec<Shift> = records
            .into_iter()
            .filter_map(|r| {
                let id = r.id.clone();
                Shift::try_from(r)
                    .map_err(|e| tracing::warn!("Skipping shift {}: {}", id, e))
                    .ok()
            })
            .collect();
        tracing::info!("Fetched {} shifts successfully", shifts.len());
        Ok(shifts)
    }

    async fn fetch_vacations(&self, range: DateRange) -> Result<Vec<VacationAssignment>, ApiError> {
        let records: Vec<VacationRecord> = self.get("vacations", Some(range)).await?;
        Ok(records.into_iter().map(VacationAssignment::from).collect())
    }

    async fn move_shift(&self, request: MoveShiftRequest) -> Result<Shift, ApiError> {
        let url = format!("{}/shifts/{}/move", self.base_url, request.shift_id);

        tracing::info!(
            "Moving shift {} to {} on {}",
            request.shift_id,
            request.new_employee_id,
            request.date
        );
        tracing::debug!("PUT {} with payload: {:?}", url, request);

        let response = self
            .authorize(self.client.put(&url))
            .json(&request)
            .send()
            .await?;

        let record: ShiftRecord = Self::read_json(response, "move shift").await?;
        Shift::try_from(record)
    }
}
