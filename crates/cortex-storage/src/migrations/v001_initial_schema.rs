use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

/// `memories`, `memory_revisions`, `jobs` and the indices §6 requires:
/// `memories(scope_keys..., deleted_at)`, `memory_revisions(memory_id,
/// revision_number UNIQUE)`, `jobs(status, created_at)`.
pub fn apply(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE memories (
            id TEXT PRIMARY KEY,
            scope_key TEXT NOT NULL,
            scope_json TEXT NOT NULL,
            fact TEXT NOT NULL,
            topic TEXT,
            category TEXT NOT NULL,
            confidence REAL NOT NULL,
            importance REAL NOT NULL,
            source_type TEXT NOT NULL,
            source_session_id TEXT,
            source_memory_ids_json TEXT NOT NULL,
            embedding_json TEXT,
            embedding_model_id TEXT,
            revision_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            expires_at TEXT,
            deleted_at TEXT
        );

        CREATE INDEX idx_memories_scope_deleted ON memories(scope_key, deleted_at);

        CREATE TABLE memory_revisions (
            id TEXT PRIMARY KEY,
            memory_id TEXT NOT NULL REFERENCES memories(id),
            revision_number INTEGER NOT NULL,
            fact TEXT NOT NULL,
            action TEXT NOT NULL,
            source_session_id TEXT,
            source_memory_ids_json TEXT,
            previous_fact TEXT,
            confidence REAL NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(memory_id, revision_number)
        );

        CREATE TABLE jobs (
            id TEXT PRIMARY KEY,
            scope_json TEXT NOT NULL,
            kind TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            status TEXT NOT NULL,
            attempt_count INTEGER NOT NULL DEFAULT 0,
            last_error TEXT,
            created_at TEXT NOT NULL,
            started_at TEXT,
            completed_at TEXT,
            result_json TEXT
        );

        CREATE INDEX idx_jobs_status_created ON jobs(status, created_at);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
