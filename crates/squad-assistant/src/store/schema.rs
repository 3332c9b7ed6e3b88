//! SQLite schema and row types for the assistant's stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full schema, applied on first open.
pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS leaderboard_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scope TEXT NOT NULL CHECK (scope IN ('day', 'week', 'month')),
    period_start TEXT NOT NULL,
    period_end TEXT NOT NULL,
    posted_at TEXT,
    entries TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS idx_snapshots_scope_period
    ON leaderboard_snapshots (scope, period_start, period_end);

CREATE TABLE IF NOT EXISTS chat_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT,
    session_id TEXT NOT NULL,
    language TEXT NOT NULL,
    input TEXT NOT NULL,
    reply TEXT NOT NULL,
    used_rag INTEGER NOT NULL DEFAULT 0,
    rating INTEGER,
    redaction_status TEXT NOT NULL DEFAULT 'skipped',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chat_logs_created ON chat_logs (created_at DESC);
CREATE INDEX IF NOT EXISTS idx_chat_logs_user ON chat_logs (user_id);

CREATE TABLE IF NOT EXISTS user_memories (
    user_id TEXT NOT NULL,
    memory_key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, memory_key)
);

CREATE TABLE IF NOT EXISTS chat_preferences (
    user_id TEXT PRIMARY KEY,
    memory_enabled INTEGER NOT NULL DEFAULT 1,
    updated_at TEXT NOT NULL
);
";

/// One persisted chat log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLogRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub session_id: String,
    pub language: String,
    pub input: String,
    pub reply: String,
    pub used_rag: bool,
    pub rating: Option<i32>,
    pub redaction_status: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Extracted user fact, keyed so repeated mentions overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub key: String,
    pub value: String,
}
