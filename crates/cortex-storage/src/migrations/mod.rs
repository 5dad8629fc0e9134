//! Schema migrations. One `v{n}_*.rs` module per migration, applied in
//! order and tracked in a `schema_migrations` table so `apply_all` is safe
//! to call on every startup.

mod v001_initial_schema;

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn apply_all(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL)",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let migrations: &[(u32, fn(&Connection) -> CortexResult<()>)] =
        &[(1, v001_initial_schema::apply)];

    for (version, apply) in migrations {
        let already_applied: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?1)",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        if already_applied {
            continue;
        }
        apply(conn)?;
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            [version],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}
