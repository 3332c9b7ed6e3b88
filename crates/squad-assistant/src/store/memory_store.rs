//! User memories and the per-user memory opt-in preference.

use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::warn;

use crate::store::schema::MemoryEntry;
use crate::store::SqlitePool;

/// Most memories shown to the generator per turn.
pub const MEMORY_CONTEXT_LIMIT: u32 = 5;

pub struct MemoryStore {
    pool: SqlitePool,
}

impl MemoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether memory extraction runs for this user. Missing rows and
    /// read failures both report enabled, so a broken preferences table
    /// never silences the feature.
    pub fn preference(&self, user_id: &str) -> bool {
        match self.read_preference(user_id) {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!("Failed to read memory preference for {}: {}", user_id, e);
                true
            }
        }
    }

    fn read_preference(&self, user_id: &str) -> anyhow::Result<bool> {
        let conn = self.pool.get()?;
        let enabled: Option<i32> = conn
            .query_row(
                "SELECT memory_enabled FROM chat_preferences WHERE user_id = ?1",
                rusqlite::params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(enabled.map(|v| v != 0).unwrap_or(true))
    }

    pub fn set_preference(&self, user_id: &str, enabled: bool) -> anyhow::Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO chat_preferences (user_id, memory_enabled, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id) DO UPDATE SET
                 memory_enabled = excluded.memory_enabled,
                 updated_at = excluded.updated_at",
            rusqlite::params![user_id, enabled as i32, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Upsert extracted facts; repeated keys overwrite the stored value.
    pub fn upsert(&self, user_id: &str, entries: &[MemoryEntry]) -> anyhow::Result<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        for entry in entries {
            tx.execute(
                "INSERT INTO user_memories (user_id, memory_key, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, memory_key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                rusqlite::params![user_id, entry.key, entry.value, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Most recently updated memories first.
    pub fn list(&self, user_id: &str, limit: u32) -> anyhow::Result<Vec<MemoryEntry>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT memory_key, value FROM user_memories
             WHERE user_id = ?1
             ORDER BY updated_at DESC, memory_key ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(rusqlite::params![user_id, limit], |row| {
            Ok(MemoryEntry {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AssistantDatabase;

    fn entry(key: &str, value: &str) -> MemoryEntry {
        MemoryEntry {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_upsert_overwrites_by_key() {
        let db = AssistantDatabase::new_in_memory().unwrap();
        db.memories
            .upsert("u1", &[entry("name", "Alice"), entry("goal", "focus more")])
            .unwrap();
        db.memories.upsert("u1", &[entry("name", "Alicia")]).unwrap();

        let entries = db.memories.list("u1", MEMORY_CONTEXT_LIMIT).unwrap();
        assert_eq!(entries.len(), 2);
        let name = entries.iter().find(|e| e.key == "name").unwrap();
        assert_eq!(name.value, "Alicia");
    }

    #[test]
    fn test_list_respects_limit_and_user() {
        let db = AssistantDatabase::new_in_memory().unwrap();
        for i in 0..8 {
            db.memories
                .upsert("u1", &[entry(&format!("k{i}"), "v")])
                .unwrap();
        }
        db.memories.upsert("u2", &[entry("other", "v")]).unwrap();

        let entries = db.memories.list("u1", MEMORY_CONTEXT_LIMIT).unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| e.key.starts_with('k')));
    }

    #[test]
    fn test_preference_defaults_enabled() {
        let db = AssistantDatabase::new_in_memory().unwrap();
        assert!(db.memories.preference("nobody"));

        db.memories.set_preference("u1", false).unwrap();
        assert!(!db.memories.preference("u1"));

        db.memories.set_preference("u1", true).unwrap();
        assert!(db.memories.preference("u1"));
    }
}
