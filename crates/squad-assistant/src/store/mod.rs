//! Assistant database - SQLite-based storage for leaderboard snapshots,
//! chat logs, user memories and preferences.
pub mod chat_log_store;
pub mod memory_store;
pub mod schema;
pub mod snapshot_store;

pub use chat_log_store::{ChatLogInsert, ChatLogStore, ListChatLogsOptions, ChatLogPage};
pub use memory_store::MemoryStore;
pub use schema::{ChatLogRecord, MemoryEntry};
pub use snapshot_store::SqliteSnapshotStore;

use std::path::Path;
use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

pub type SqlitePool = Arc<Pool<SqliteConnectionManager>>;

/// Facade over the per-concern stores sharing one connection pool.
pub struct AssistantDatabase {
    pub snapshots: SqliteSnapshotStore,
    pub chat_logs: ChatLogStore,
    pub memories: MemoryStore,
    #[allow(dead_code)]
    pool: SqlitePool,
}

impl AssistantDatabase {
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        info!("Opening assistant database at: {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let manager = SqliteConnectionManager::file(db_path).with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        );
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create connection pool: {}", e))?;

        {
            let conn = pool.get()?;
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            conn.execute_batch(schema::SCHEMA_SQL)?;
        }
        let pool = Arc::new(pool);
        info!("Assistant database initialized successfully");
        Ok(Self::from_pool(pool))
    }

    pub fn new_in_memory() -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        {
            let conn = pool.get()?;
            conn.execute_batch(schema::SCHEMA_SQL)?;
        }
        Ok(Self::from_pool(Arc::new(pool)))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            snapshots: SqliteSnapshotStore::new(Arc::clone(&pool)),
            chat_logs: ChatLogStore::new(Arc::clone(&pool)),
            memories: MemoryStore::new(Arc::clone(&pool)),
            pool,
        }
    }
}
