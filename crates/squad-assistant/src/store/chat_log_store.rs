//! Chat log persistence: one row per classified request, keyset-paginated
//! listing for the admin view, and rating updates.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store::schema::ChatLogRecord;
use crate::store::SqlitePool;

/// Insert payload; id and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct ChatLogInsert {
    pub user_id: Option<String>,
    pub session_id: String,
    pub language: String,
    pub input: String,
    pub reply: String,
    pub used_rag: bool,
    pub redaction_status: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct ListChatLogsOptions {
    pub user_id: Option<String>,
    pub used_rag: Option<bool>,
    /// RFC 3339 bounds on `created_at`, inclusive.
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: Option<u32>,
    /// Opaque cursor from a previous page's `next_cursor`.
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatLogPage {
    pub logs: Vec<ChatLogRecord>,
    pub next_cursor: Option<String>,
}

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 200;

pub struct ChatLogStore {
    pool: SqlitePool,
}

impl ChatLogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist one turn. Returns the generated log id.
    pub fn insert(&self, log: ChatLogInsert) -> anyhow::Result<String> {
        let conn = self.pool.get()?;
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO chat_logs
                 (id, user_id, session_id, language, input, reply,
                  used_rag, redaction_status, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                id,
                log.user_id,
                log.session_id,
                log.language,
                log.input,
                log.reply,
                log.used_rag as i32,
                log.redaction_status,
                log.metadata.to_string(),
                created_at,
            ],
        )?;
        Ok(id)
    }

    /// Newest-first listing. The cursor is `created_at|id` of the last row
    /// of the previous page; ties on created_at break on id.
    pub fn list(&self, options: ListChatLogsOptions) -> anyhow::Result<ChatLogPage> {
        let limit = options
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let conn = self.pool.get()?;

        let mut sql = String::from(
            "SELECT id, user_id, session_id, language, input, reply,
                    used_rag, rating, redaction_status, metadata, created_at
             FROM chat_logs WHERE 1=1",
        );
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        if let Some(user_id) = &options.user_id {
            sql.push_str(" AND user_id = ?");
            params.push(Box::new(user_id.clone()));
        }
        if let Some(used_rag) = options.used_rag {
            sql.push_str(" AND used_rag = ?");
            params.push(Box::new(used_rag as i32));
        }
        if let Some(since) = &options.since {
            sql.push_str(" AND created_at >= ?");
            params.push(Box::new(since.clone()));
        }
        if let Some(until) = &options.until {
            sql.push_str(" AND created_at <= ?");
            params.push(Box::new(until.clone()));
        }
        if let Some(cursor) = &options.cursor {
            let (created_at, id) = cursor
                .split_once('|')
                .ok_or_else(|| anyhow::anyhow!("Malformed chat log cursor"))?;
            sql.push_str(" AND (created_at < ? OR (created_at = ? AND id < ?))");
            params.push(Box::new(created_at.to_string()));
            params.push(Box::new(created_at.to_string()));
            params.push(Box::new(id.to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        // fetch one extra row to learn whether another page exists
        params.push(Box::new(limit + 1));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            Self::row_to_record,
        )?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.parse()?);
        }

        let next_cursor = if logs.len() as u32 > limit {
            logs.truncate(limit as usize);
            logs.last()
                .map(|last| format!("{}|{}", last.created_at.to_rfc3339(), last.id))
        } else {
            None
        };
        Ok(ChatLogPage { logs, next_cursor })
    }

    /// Record a thumbs rating on an existing log. Returns false when the
    /// log id does not exist.
    pub fn update_rating(&self, log_id: &str, rating: i32) -> anyhow::Result<bool> {
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE chat_logs SET rating = ?1 WHERE id = ?2",
            rusqlite::params![rating, log_id],
        )?;
        Ok(updated > 0)
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLogRow> {
        Ok(RawLogRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            session_id: row.get(2)?,
            language: row.get(3)?,
            input: row.get(4)?,
            reply: row.get(5)?,
            used_rag: row.get::<_, i32>(6)? != 0,
            rating: row.get(7)?,
            redaction_status: row.get(8)?,
            metadata: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

struct RawLogRow {
    id: String,
    user_id: Option<String>,
    session_id: String,
    language: String,
    input: String,
    reply: String,
    used_rag: bool,
    rating: Option<i32>,
    redaction_status: String,
    metadata: String,
    created_at: String,
}

impl RawLogRow {
    fn parse(self) -> anyhow::Result<ChatLogRecord> {
        Ok(ChatLogRecord {
            id: self.id,
            user_id: self.user_id,
            session_id: self.session_id,
            language: self.language,
            input: self.input,
            reply: self.reply,
            used_rag: self.used_rag,
            rating: self.rating,
            redaction_status: self.redaction_status,
            metadata: serde_json::from_str(&self.metadata).unwrap_or(serde_json::Value::Null),
            created_at: DateTime::parse_from_rfc3339(&self.created_at)?.with_timezone(&Utc),
        })
    }
}
