//! Append-only walk log backed by SQLite.
//!
//! Two tables:
//! - `walkers(id, display_name)`: one row per walker, first-seen name wins
//! - `walks(timestamp, walker_id)`: one row per walk, UTC milliseconds
//!
//! All access goes through one connection behind a mutex, so a write and a
//! concurrent read never interleave.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::{domain::WalkerId, Result};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Per-walker aggregate returned by [`EventStore::walk_statistics`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkStats {
    pub walker_id: WalkerId,
    pub display_name: String,
    pub count: u64,
    /// `count * 100 / total`, truncated.
    pub percentage: u32,
}

pub struct EventStore {
    conn: Mutex<Connection>,
}

impl EventStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::bootstrap(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn bootstrap(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS walkers (
                id           TEXT PRIMARY KEY,
                display_name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS walks (
                timestamp INTEGER NOT NULL,
                walker_id TEXT NOT NULL REFERENCES walkers(id)
            );

            CREATE INDEX IF NOT EXISTS idx_walks_timestamp ON walks(timestamp);
            "#,
        )?;
        Ok(())
    }

    // A panic while holding the lock cannot leave a half-applied write behind:
    // the open transaction rolls back when dropped.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_walk(&self, walker_id: &WalkerId, display_name: &str) -> Result<()> {
        self.record_walk_at(walker_id, display_name, Utc::now())
    }

    /// Upsert the walker and append one walk, atomically.
    pub fn record_walk_at(
        &self,
        walker_id: &WalkerId,
        display_name: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO walkers (id, display_name) VALUES (?1, ?2)",
            params![walker_id.as_str(), display_name],
        )?;
        tx.execute(
            "INSERT INTO walks (timestamp, walker_id) VALUES (?1, ?2)",
            params![at.timestamp_millis(), walker_id.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Timestamp of the most recent walk by any walker.
    pub fn last_walk_at(&self) -> Result<Option<DateTime<Utc>>> {
        let last_ms = self.last_walk_millis()?;
        Ok(last_ms.and_then(DateTime::<Utc>::from_timestamp_millis))
    }

    fn last_walk_millis(&self) -> Result<Option<i64>> {
        let conn = self.conn();
        let last: Option<i64> =
            conn.query_row("SELECT MAX(timestamp) FROM walks", [], |row| row.get(0))?;
        Ok(last)
    }

    pub fn elapsed_hours_since_last_walk(&self) -> Result<f64> {
        self.elapsed_hours_since_last_walk_at(Utc::now())
    }

    /// Fractional hours between the latest walk and `now`.
    ///
    /// `f64::INFINITY` when nothing has been recorded yet. A walk stamped in
    /// the future counts as zero elapsed.
    pub fn elapsed_hours_since_last_walk_at(&self, now: DateTime<Utc>) -> Result<f64> {
        let Some(last_ms) = self.last_walk_millis()? else {
            return Ok(f64::INFINITY);
        };
        let elapsed_ms = now.timestamp_millis().saturating_sub(last_ms).max(0);
        Ok(elapsed_ms as f64 / MILLIS_PER_HOUR)
    }

    pub fn walk_count(&self) -> Result<u64> {
        let conn = self.conn();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM walks", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    /// Walk counts per walker, most walks first.
    pub fn walk_statistics(&self) -> Result<Vec<WalkStats>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT walkers.id, walkers.display_name, COUNT(*) AS walk_count
            FROM walks
            JOIN walkers ON walks.walker_id = walkers.id
            GROUP BY walkers.id
            ORDER BY walk_count DESC, walkers.display_name ASC, walkers.id ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let name: String = row.get(1)?;
                let count: i64 = row.get(2)?;
                Ok((id, name, count.max(0) as u64))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let total: u64 = rows.iter().map(|(_, _, count)| count).sum();
        if total == 0 {
            return Ok(Vec::new());
        }

        Ok(rows
            .into_iter()
            .map(|(id, display_name, count)| WalkStats {
                walker_id: WalkerId(id),
                display_name,
                count,
                percentage: (count * 100 / total) as u32,
            })
            .collect())
    }
}
