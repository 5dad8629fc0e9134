/// Relational Store Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("memory {id} not found")]
    MemoryNotFound { id: String },

    #[error("job {id} not found")]
    JobNotFound { id: String },

    #[error(
        "concurrent modification on memory {id}: expected revision {expected}, found {actual}"
    )]
    ConcurrentModification {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("revision chain for memory {id} is not contiguous: expected {expected}, found {found}")]
    RevisionGap {
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("connection pool exhausted: {active_connections} active connections")]
    ConnectionPoolExhausted { active_connections: usize },
}
