use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use cortex_core::errors::{CortexError, CortexResult, StorageError};
use cortex_core::job::{Job, JobKind, JobPayload, JobResult, JobStatus};
use cortex_core::Scope;

use crate::to_storage_err;

fn uuid_to_str(id: Uuid) -> String {
    id.to_string()
}

fn parse_uuid(raw: &str) -> CortexResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| to_storage_err(format!("corrupt job uuid: {e}")))
}

fn parse_timestamp(raw: &str) -> CortexResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("corrupt timestamp {raw}: {e}")))
}

fn status_as_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Running => "running",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    }
}

fn parse_status(raw: &str) -> CortexResult<JobStatus> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(to_storage_err(format!("corrupt job status: {other}"))),
    }
}

fn kind_as_str(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Extract => "extract",
        JobKind::Consolidate => "consolidate",
    }
}

pub fn insert_job(conn: &Connection, job: &Job) -> CortexResult<()> {
    let scope_json = serde_json::to_string(&job.scope).map_err(CortexError::SerializationError)?;
    let payload_json = serde_json::to_string(&job.payload).map_err(CortexError::SerializationError)?;
    let result_json = job
        .result
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(CortexError::SerializationError)?;

    conn.execute(
        "INSERT INTO jobs (
            id, scope_json, kind, payload_json, status, attempt_count, last_error,
            created_at, started_at, completed_at, result_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            uuid_to_str(job.id),
            scope_json,
            kind_as_str(job.kind()),
            payload_json,
            status_as_str(job.status),
            job.attempt_count,
            job.last_error,
            job.created_at.to_rfc3339(),
            job.started_at.map(|t| t.to_rfc3339()),
            job.completed_at.map(|t| t.to_rfc3339()),
            result_json,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_job(conn: &Connection, job: &Job) -> CortexResult<()> {
    let result_json = job
        .result
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(CortexError::SerializationError)?;

    let affected = conn
        .execute(
            "UPDATE jobs SET status = ?2, attempt_count = ?3, last_error = ?4,
                started_at = ?5, completed_at = ?6, result_json = ?7
             WHERE id = ?1",
            params![
                uuid_to_str(job.id),
                status_as_str(job.status),
                job.attempt_count,
                job.last_error,
                job.started_at.map(|t| t.to_rfc3339()),
                job.completed_at.map(|t| t.to_rfc3339()),
                result_json,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if affected == 0 {
        return Err(CortexError::StorageError(StorageError::JobNotFound {
            id: job.id.to_string(),
        }));
    }
    Ok(())
}

pub fn get_job(conn: &Connection, id: Uuid) -> CortexResult<Option<Job>> {
    conn.query_row(
        "SELECT id, scope_json, payload_json, status, attempt_count, last_error,
                created_at, started_at, completed_at, result_json
         FROM jobs WHERE id = ?1",
        params![uuid_to_str(id)],
        |row| {
            let id: String = row.get(0)?;
            let scope_json: String = row.get(1)?;
            let payload_json: String = row.get(2)?;
            let status: String = row.get(3)?;
            let attempt_count: u32 = row.get(4)?;
            let last_error: Option<String> = row.get(5)?;
            let created_at: String = row.get(6)?;
            let started_at: Option<String> = row.get(7)?;
            let completed_at: Option<String> = row.get(8)?;
            let result_json: Option<String> = row.get(9)?;
            Ok((
                id,
                scope_json,
                payload_json,
                status,
                attempt_count,
                last_error,
                created_at,
                started_at,
                completed_at,
                result_json,
            ))
        },
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))?
    .map(
        |(id, scope_json, payload_json, status, attempt_count, last_error, created_at, started_at, completed_at, result_json)| {
            Ok(Job {
                id: parse_uuid(&id)?,
                scope: serde_json::from_str::<Scope>(&scope_json)
                    .map_err(|e| to_storage_err(format!("corrupt scope_json: {e}")))?,
                payload: serde_json::from_str::<JobPayload>(&payload_json)
                    .map_err(|e| to_storage_err(format!("corrupt payload_json: {e}")))?,
                status: parse_status(&status)?,
                attempt_count,
                last_error,
                created_at: parse_timestamp(&created_at)?,
                started_at: started_at.map(|t| parse_timestamp(&t)).transpose()?,
                completed_at: completed_at.map(|t| parse_timestamp(&t)).transpose()?,
                result: result_json
                    .map(|raw| serde_json::from_str::<JobResult>(&raw))
                    .transpose()
                    .map_err(|e| to_storage_err(format!("corrupt result_json: {e}")))?,
            })
        },
    )
    .transpose()
}
