use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

use crate::schedule::{RosterSnapshot, SchedulePeriod};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Failed to prepare cache directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// Last known roster state per period, used when the roster source is
/// unreachable.
pub struct Cache {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    pub snapshot: RosterSnapshot,
    pub saved_at: chrono::DateTime<Utc>,
}

impl Cache {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let cache = Self::new(Connection::open(path)?);
        cache.initialize()?;
        Ok(cache)
    }

    pub fn initialize(&self) -> Result<(), CacheError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshots (
                period_start TEXT PRIMARY KEY,
                days INTEGER NOT NULL,
                data TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn store_snapshot(
        &self,
        period: &SchedulePeriod,
        snapshot: &RosterSnapshot,
    ) -> Result<(), CacheError> {
        let data = serde_json::to_string(snapshot)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshots (period_start, days, data, saved_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                period.start.to_string(),
                period.days as i64,
                &data,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tracing::debug!(
            "Cached {} shifts for {}",
            snapshot.shifts.len(),
            period.label()
        );
        Ok(())
    }

    /// Snapshot for exactly this period; a cached period of a different
    /// length is treated as missing.
    pub fn load_snapshot(
        &self,
        period: &SchedulePeriod,
    ) -> Result<Option<CachedSnapshot>, CacheError> {
        let row: Option<(i64, String, String)> = self
            .conn
            .query_row(
                "SELECT days, data, saved_at FROM snapshots WHERE period_start = ?1",
                [period.start.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((days, data, saved_at)) = row else {
            return Ok(None);
        };
        if days != period.days as i64 {
            return Ok(None);
        }

        let snapshot: RosterSnapshot = serde_json::from_str(&data)?;
        let saved_at = chrono::DateTime::parse_from_rfc3339(&saved_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        Ok(Some(CachedSnapshot { snapshot, saved_at }))
    }
}
