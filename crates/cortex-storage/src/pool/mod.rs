//! Single-connection pool over SQLite. WAL mode lets readers proceed
//! without blocking on the writer, so one guarded connection is sufficient
//! for the write-heavy, low-concurrency access pattern of a Coordinator
//! process (relational writes happen inside a per-job transaction anyway).

pub mod pragmas;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub struct ConnectionPool {
    conn: Mutex<Connection>,
}

impl ConnectionPool {
    pub fn open(path: &Path) -> CortexResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> CortexResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> CortexResult<T>
    where
        F: FnOnce(&Connection) -> CortexResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("connection pool lock poisoned: {e}")))?;
        f(&guard)
    }

    /// Same as `with_conn` but hands out `&mut Connection`, for callers that
    /// need to open a `rusqlite::Transaction` (which borrows mutably).
    pub fn with_conn_mut<F, T>(&self, f: F) -> CortexResult<T>
    where
        F: FnOnce(&mut Connection) -> CortexResult<T>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("connection pool lock poisoned: {e}")))?;
        f(&mut guard)
    }
}
