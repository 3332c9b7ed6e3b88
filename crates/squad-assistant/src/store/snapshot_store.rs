//! SQLite-backed leaderboard snapshot reads plus the ingest write path.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension;

use crate::leaderboard::{LeaderboardEntry, LeaderboardSnapshot, Scope, SnapshotStore};
use crate::store::SqlitePool;

pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist one posted board. Snapshots are append-only; duplicate
    /// (scope, period) rows are resolved at read time by `posted_at`.
    pub fn insert(&self, snapshot: &LeaderboardSnapshot) -> anyhow::Result<i64> {
        let conn = self.pool.get()?;
        let entries = serde_json::to_string(&snapshot.entries)?;
        conn.execute(
            "INSERT INTO leaderboard_snapshots (scope, period_start, period_end, posted_at, entries)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                snapshot.scope.as_str(),
                snapshot.period_start.to_string(),
                snapshot.period_end.to_string(),
                snapshot.posted_at.map(|ts| ts.to_rfc3339()),
                entries,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn row_to_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSnapshotRow> {
        Ok(RawSnapshotRow {
            scope: row.get(0)?,
            period_start: row.get(1)?,
            period_end: row.get(2)?,
            posted_at: row.get(3)?,
            entries: row.get(4)?,
        })
    }
}

struct RawSnapshotRow {
    scope: String,
    period_start: String,
    period_end: String,
    posted_at: Option<String>,
    entries: String,
}

impl RawSnapshotRow {
    fn parse(self) -> anyhow::Result<LeaderboardSnapshot> {
        let entries: Vec<LeaderboardEntry> = serde_json::from_str(&self.entries)?;
        Ok(LeaderboardSnapshot {
            scope: self.scope.parse()?,
            period_start: NaiveDate::parse_from_str(&self.period_start, "%Y-%m-%d")?,
            period_end: NaiveDate::parse_from_str(&self.period_end, "%Y-%m-%d")?,
            posted_at: match self.posted_at {
                Some(ts) => Some(DateTime::parse_from_rfc3339(&ts)?.with_timezone(&Utc)),
                None => None,
            },
            entries,
        })
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn snapshot_for(
        &self,
        scope: Scope,
        date: NaiveDate,
    ) -> anyhow::Result<Option<LeaderboardSnapshot>> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT scope, period_start, period_end, posted_at, entries
                 FROM leaderboard_snapshots
                 WHERE scope = ?1 AND period_start <= ?2 AND period_end >= ?2
                 ORDER BY posted_at DESC, period_end DESC
                 LIMIT 1",
                rusqlite::params![scope.as_str(), date.to_string()],
                Self::row_to_snapshot,
            )
            .optional()?;
        row.map(RawSnapshotRow::parse).transpose()
    }

    fn previous_week_before(
        &self,
        before: NaiveDate,
    ) -> anyhow::Result<Option<LeaderboardSnapshot>> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT scope, period_start, period_end, posted_at, entries
                 FROM leaderboard_snapshots
                 WHERE scope = 'week' AND period_end < ?1
                 ORDER BY period_end DESC, posted_at DESC
                 LIMIT 1",
                rusqlite::params![before.to_string()],
                Self::row_to_snapshot,
            )
            .optional()?;
        row.map(RawSnapshotRow::parse).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AssistantDatabase;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(
        scope: Scope,
        start: NaiveDate,
        end: NaiveDate,
        posted_at: Option<DateTime<Utc>>,
        entries: Vec<(u32, &str, f64)>,
    ) -> LeaderboardSnapshot {
        LeaderboardSnapshot {
            scope,
            period_start: start,
            period_end: end,
            posted_at,
            entries: entries
                .into_iter()
                .map(|(rank, username, minutes)| LeaderboardEntry {
                    rank,
                    username: username.to_string(),
                    minutes,
                    title: None,
                    emojis: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let db = AssistantDatabase::new_in_memory().unwrap();
        let snap = snapshot(
            Scope::Day,
            date(2024, 5, 1),
            date(2024, 5, 1),
            None,
            vec![(1, "alice", 120.0), (2, "bob", 95.0)],
        );
        db.snapshots.insert(&snap).unwrap();

        let loaded = db
            .snapshots
            .snapshot_for(Scope::Day, date(2024, 5, 1))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.entries[1].username, "bob");
    }

    #[test]
    fn test_window_containment() {
        let db = AssistantDatabase::new_in_memory().unwrap();
        let snap = snapshot(
            Scope::Week,
            date(2024, 4, 29),
            date(2024, 5, 5),
            None,
            vec![(1, "charlie", 540.0)],
        );
        db.snapshots.insert(&snap).unwrap();

        assert!(db
            .snapshots
            .snapshot_for(Scope::Week, date(2024, 5, 3))
            .unwrap()
            .is_some());
        assert!(db
            .snapshots
            .snapshot_for(Scope::Week, date(2024, 5, 6))
            .unwrap()
            .is_none());
        // scope mismatch never matches
        assert!(db
            .snapshots
            .snapshot_for(Scope::Day, date(2024, 5, 3))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_duplicate_periods_resolved_by_posted_at() {
        let db = AssistantDatabase::new_in_memory().unwrap();
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        db.snapshots
            .insert(&snapshot(
                Scope::Day,
                date(2024, 5, 1),
                date(2024, 5, 1),
                Some(early),
                vec![(1, "stale", 1.0)],
            ))
            .unwrap();
        db.snapshots
            .insert(&snapshot(
                Scope::Day,
                date(2024, 5, 1),
                date(2024, 5, 1),
                Some(late),
                vec![(1, "fresh", 2.0)],
            ))
            .unwrap();

        let loaded = db
            .snapshots
            .snapshot_for(Scope::Day, date(2024, 5, 1))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.entries[0].username, "fresh");
    }

    #[test]
    fn test_previous_week_picks_nearest_earlier() {
        let db = AssistantDatabase::new_in_memory().unwrap();
        for (start, end, name) in [
            (date(2024, 4, 15), date(2024, 4, 21), "older"),
            (date(2024, 4, 22), date(2024, 4, 28), "nearest"),
            (date(2024, 4, 29), date(2024, 5, 5), "current"),
        ] {
            db.snapshots
                .insert(&snapshot(Scope::Week, start, end, None, vec![(1, name, 1.0)]))
                .unwrap();
        }

        let previous = db
            .snapshots
            .previous_week_before(date(2024, 4, 29))
            .unwrap()
            .unwrap();
        assert_eq!(previous.entries[0].username, "nearest");
    }
}
