use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::roster::Shift;
use crate::schedule::{RosterSnapshot, SchedulePeriod};
use crate::storage::config::Config;
use crate::sync::roster_api::{ApiError, DateRange, MoveShiftRequest, RestRosterClient, RosterApi};
use crate::sync::sequence::LoadTicket;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("No roster source configured")]
    Offline,
}

/// Results of background work, delivered to the UI loop.
#[derive(Debug)]
pub enum SyncMessage {
    Loaded {
        ticket: LoadTicket,
        period: SchedulePeriod,
        result: Result<RosterSnapshot, String>,
    },
    MovePushed {
        shift_id: String,
        result: Result<Shift, String>,
    },
}

/// Loads whole periods from the roster source and pushes confirmed moves
/// back to it. Cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct SyncEngine {
    api: Arc<dyn RosterApi>,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn RosterApi>) -> Self {
        Self { api }
    }

    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        if !config.is_online() {
            return Err(SyncError::Offline);
        }
        let base_url = config.api.base_url.clone().ok_or(SyncError::Offline)?;
        let client = RestRosterClient::new(base_url).with_token(config.api.token.clone());
        Ok(Self::new(Arc::new(client)))
    }

    pub async fn load_period(&self, period: SchedulePeriod) -> Result<RosterSnapshot, SyncError> {
        let range = DateRange::new(period.start, period.end());
        tracing::info!("Loading roster for {}", period.label());

        let (employees, rules, shifts, vacations) = tokio::try_join!(
            self.api.fetch_employees(),
            self.api.fetch_work_rules(),
            self.api.fetch_shifts(range),
            self.api.fetch_vacations(range),
        )?;

        Ok(RosterSnapshot { employees, rules, shifts, vacations })
    }

    pub async fn push_move(&self, shift: &Shift) -> Result<Shift, SyncError> {
        let confirmed = self.api.move_shift(MoveShiftRequest::from(shift)).await?;
        tracing::info!("Roster source confirmed move of shift {}", confirmed.id);
        Ok(confirmed)
    }

    pub fn spawn_load(
        &self,
        ticket: LoadTicket,
        period: SchedulePeriod,
        tx: UnboundedSender<SyncMessage>,
    ) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine.load_period(period).await.map_err(|e| {
                tracing::error!("Loading {} failed: {}", period.label(), e);
                e.to_string()
            });
            if tx.send(SyncMessage::Loaded { ticket, period, result }).is_err() {
                tracing::debug!("UI loop gone, dropping load result");
            }
        });
    }

    pub fn spawn_push(&self, shift: Shift, tx: UnboundedSender<SyncMessage>) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine.push_move(&shift).await.map_err(|e| {
                tracing::error!("Pushing move of shift {} failed: {}", shift.id, e);
                e.to_string()
            });
            let _ = tx.send(SyncMessage::MovePushed { shift_id: shift.id, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Employee, EmployeeId, ShiftBounds, ShiftKind};
    use crate::sync::roster_api::MockRosterApi;
    use chrono::{NaiveDate, NaiveTime};

    fn sample_shift(employee: &str) -> Shift {
        Shift::new(
            "s1",
            EmployeeId::new(employee),
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            ShiftBounds::wrapping(
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            ),
            ShiftKind::Day,
        )
    }

    fn march() -> SchedulePeriod {
        SchedulePeriod::month(2025, 3).unwrap()
    }

    #[tokio::test]
    async fn load_period_queries_the_whole_month() {
        let mut api = MockRosterApi::new();
        api.expect_fetch_employees()
            .returning(|| Ok(vec![Employee::new("e1", "Ann")]));
        api.expect_fetch_work_rules().returning(|| Ok(vec![]));
        api.expect_fetch_shifts()
            .withf(|range| {
                range.start == NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
                    && range.end == NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
            })
            .returning(|_| Ok(vec![sample_shift("e1")]));
        api.expect_fetch_vacations().returning(|_| Ok(vec![]));

        let engine = SyncEngine::new(Arc::new(api));
        let snapshot = engine.load_period(march()).await.unwrap();

        assert_eq!(snapshot.employees.len(), 1);
        assert_eq!(snapshot.shifts.len(), 1);
    }

    #[tokio::test]
    async fn load_period_fails_when_any_fetch_fails() {
        let mut api = MockRosterApi::new();
        api.expect_fetch_employees().returning(|| Ok(vec![]));
        api.expect_fetch_work_rules().returning(|| Ok(vec![]));
        api.expect_fetch_shifts().returning(|_| Err(ApiError::RateLimited));
        api.expect_fetch_vacations().returning(|_| Ok(vec![]));

        let engine = SyncEngine::new(Arc::new(api));
        let result = engine.load_period(march()).await;

        assert!(matches!(result, Err(SyncError::ApiError(ApiError::RateLimited))));
    }

    #[tokio::test]
    async fn push_move_sends_the_new_owner() {
        let mut api = MockRosterApi::new();
        api.expect_move_shift()
            .withf(|request| request.shift_id == "s1" && request.new_employee_id == "e2")
            .times(1)
            .returning(|_| Ok(sample_shift("e2")));

        let engine = SyncEngine::new(Arc::new(api));
        let confirmed = engine.push_move(&sample_shift("e2")).await.unwrap();

        assert_eq!(confirmed.employee_id, EmployeeId::new("e2"));
    }

    #[tokio::test]
    async fn spawned_load_reports_back_with_its_ticket() {
        let mut api = MockRosterApi::new();
        api.expect_fetch_employees().returning(|| Ok(vec![]));
        api.expect_fetch_work_rules().returning(|| Ok(vec![]));
        api.expect_fetch_shifts().returning(|_| Ok(vec![]));
        api.expect_fetch_vacations().returning(|_| Err(ApiError::AuthenticationFailed));

        let engine = SyncEngine::new(Arc::new(api));
        let mut sequencer = crate::sync::LoadSequencer::new();
        let ticket = sequencer.issue();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        engine.spawn_load(ticket, march(), tx);

        match rx.recv().await {
            Some(SyncMessage::Loaded { ticket: received, result, .. }) => {
                assert_eq!(received, ticket);
                assert!(result.is_err());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn engine_is_not_built_without_base_url() {
        let result = SyncEngine::from_config(&Config::default());

        assert!(matches!(result, Err(SyncError::Offline)));
    }
}
