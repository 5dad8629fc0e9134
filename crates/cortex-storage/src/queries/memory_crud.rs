use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use cortex_core::errors::{CortexError, CortexResult, StorageError};
use cortex_core::memory::{Category, MemoryRevision, RevisionAction};
use cortex_core::{Memory, MemoryFilter, Scope, SourceType};

use crate::to_storage_err;

fn uuid_to_str(id: Uuid) -> String {
    id.to_string()
}

fn parse_uuid(raw: &str, what: &str) -> CortexResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| to_storage_err(format!("corrupt {what} uuid: {e}")))
}

fn parse_category(raw: &str) -> CortexResult<Category> {
    Category::parse(raw).ok_or_else(|| to_storage_err(format!("corrupt category: {raw}")))
}

fn parse_source_type(raw: &str) -> CortexResult<SourceType> {
    match raw {
        "extracted" => Ok(SourceType::Extracted),
        "consolidated" => Ok(SourceType::Consolidated),
        "direct" => Ok(SourceType::Direct),
        "imported" => Ok(SourceType::Imported),
        other => Err(to_storage_err(format!("corrupt source_type: {other}"))),
    }
}

fn parse_action(raw: &str) -> CortexResult<RevisionAction> {
    match raw {
        "created" => Ok(RevisionAction::Created),
        "updated" => Ok(RevisionAction::Updated),
        "merged" => Ok(RevisionAction::Merged),
        "deleted" => Ok(RevisionAction::Deleted),
        "rollback" => Ok(RevisionAction::Rollback),
        other => Err(to_storage_err(format!("corrupt revision action: {other}"))),
    }
}

fn action_as_str(action: RevisionAction) -> &'static str {
    match action {
        RevisionAction::Created => "created",
        RevisionAction::Updated => "updated",
        RevisionAction::Merged => "merged",
        RevisionAction::Deleted => "deleted",
        RevisionAction::Rollback => "rollback",
    }
}

fn source_type_as_str(source_type: SourceType) -> &'static str {
    match source_type {
        SourceType::Extracted => "extracted",
        SourceType::Consolidated => "consolidated",
        SourceType::Direct => "direct",
        SourceType::Imported => "imported",
    }
}

fn row_to_memory(row: &Row<'_>) -> rusqlite::Result<CortexResult<Memory>> {
    let id: String = row.get("id")?;
    let scope_json: String = row.get("scope_json")?;
    let fact: String = row.get("fact")?;
    let topic: Option<String> = row.get("topic")?;
    let category: String = row.get("category")?;
    let confidence: f64 = row.get("confidence")?;
    let importance: f64 = row.get("importance")?;
    let source_type: String = row.get("source_type")?;
    let source_session_id: Option<String> = row.get("source_session_id")?;
    let source_memory_ids_json: String = row.get("source_memory_ids_json")?;
    let embedding_json: Option<String> = row.get("embedding_json")?;
    let embedding_model_id: Option<String> = row.get("embedding_model_id")?;
    let revision_count: i64 = row.get("revision_count")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let expires_at: Option<String> = row.get("expires_at")?;
    let deleted_at: Option<String> = row.get("deleted_at")?;

    let parsed = (|| -> CortexResult<Memory> {
        Ok(Memory {
            id: parse_uuid(&id, "memory")?,
            scope: serde_json::from_str::<Scope>(&scope_json)
                .map_err(|e| to_storage_err(format!("corrupt scope_json: {e}")))?,
            fact,
            topic,
            category: parse_category(&category)?,
            confidence: confidence.into(),
            importance: importance.into(),
            source_type: parse_source_type(&source_type)?,
            source_session_id,
            source_memory_ids: serde_json::from_str(&source_memory_ids_json)
                .map_err(|e| to_storage_err(format!("corrupt source_memory_ids_json: {e}")))?,
            embedding: embedding_json
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(|e| to_storage_err(format!("corrupt embedding_json: {e}")))?,
            embedding_model_id,
            revision_count: revision_count as u64,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
            expires_at: expires_at.map(|raw| parse_timestamp(&raw)).transpose()?,
            deleted_at: deleted_at.map(|raw| parse_timestamp(&raw)).transpose()?,
        })
    })();

    Ok(parsed)
}

fn parse_timestamp(raw: &str) -> CortexResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("corrupt timestamp {raw}: {e}")))
}

/// Insert `memory` and its genesis revision (`revision_number = 1`, action
/// `CREATED`) in one transaction, so the chain's first row is never missing.
pub fn insert_memory_with_genesis_revision(conn: &mut Connection, memory: &Memory) -> CortexResult<()> {
    let tx = conn.transaction().map_err(|e| to_storage_err(e.to_string()))?;

    let scope_json = serde_json::to_string(&memory.scope).map_err(CortexError::SerializationError)?;
    let source_memory_ids_json =
        serde_json::to_string(&memory.source_memory_ids).map_err(CortexError::SerializationError)?;
    let embedding_json = memory
        .embedding
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(CortexError::SerializationError)?;

    tx.execute(
        "INSERT INTO memories (
            id, scope_key, scope_json, fact, topic, category, confidence, importance,
            source_type, source_session_id, source_memory_ids_json, embedding_json,
            embedding_model_id, revision_count, created_at, updated_at, expires_at, deleted_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1, ?14, ?15, ?16, ?17)",
        params![
            uuid_to_str(memory.id),
            memory.scope.canonical_key(),
            scope_json,
            memory.fact,
            memory.topic,
            memory.category.as_str(),
            f64::from(memory.confidence),
            f64::from(memory.importance),
            source_type_as_str(memory.source_type),
            memory.source_session_id,
            source_memory_ids_json,
            embedding_json,
            memory.embedding_model_id,
            memory.created_at.to_rfc3339(),
            memory.updated_at.to_rfc3339(),
            memory.expires_at.map(|t| t.to_rfc3339()),
            memory.deleted_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tx.execute(
        "INSERT INTO memory_revisions (
            id, memory_id, revision_number, fact, action, source_session_id,
            source_memory_ids_json, previous_fact, confidence, created_at
        ) VALUES (?1, ?2, 1, ?3, 'created', ?4, ?5, NULL, ?6, ?7)",
        params![
            Uuid::new_v4().to_string(),
            uuid_to_str(memory.id),
            memory.fact,
            memory.source_session_id,
            source_memory_ids_json,
            f64::from(memory.confidence),
            memory.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_memory(conn: &Connection, id: Uuid) -> CortexResult<Option<Memory>> {
    let row = conn
        .query_row(
            "SELECT * FROM memories WHERE id = ?1",
            params![uuid_to_str(id)],
            row_to_memory,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.transpose()
}

pub fn list_memories(
    conn: &Connection,
    scope: &Scope,
    filter: &MemoryFilter,
) -> CortexResult<Vec<Memory>> {
    let mut sql =
        "SELECT * FROM memories WHERE scope_key = ?1".to_string();
    if !filter.include_deleted {
        sql.push_str(" AND deleted_at IS NULL");
    }
    if let Some(category) = filter.category {
        sql.push_str(&format!(" AND category = '{}'", category.as_str()));
    }
    if let Some(min_confidence) = filter.min_confidence {
        sql.push_str(&format!(" AND confidence >= {min_confidence}"));
    }
    if let Some(topic) = &filter.topic {
        let escaped = topic.replace('\'', "''");
        sql.push_str(&format!(" AND topic = '{escaped}'"));
    }
    sql.push_str(" ORDER BY created_at ASC");

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![scope.canonical_key()], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut memories = Vec::new();
    for row in rows {
        let memory = row.map_err(|e| to_storage_err(e.to_string()))??;
        memories.push(memory);
    }
    Ok(memories)
}

/// Update `memory` and append a revision in one transaction. If
/// `expected_revision_count` is given and doesn't match the stored value,
/// the whole transaction rolls back with `ConcurrentModification`.
pub fn update_memory_with_revision(
    conn: &mut Connection,
    memory: &Memory,
    action: RevisionAction,
    expected_revision_count: Option<u64>,
    previous_fact: Option<String>,
) -> CortexResult<MemoryRevision> {
    let tx = conn.transaction().map_err(|e| to_storage_err(e.to_string()))?;

    let current: i64 = tx
        .query_row(
            "SELECT revision_count FROM memories WHERE id = ?1",
            params![uuid_to_str(memory.id)],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .ok_or_else(|| {
            CortexError::StorageError(StorageError::MemoryNotFound {
                id: memory.id.to_string(),
            })
        })?;

    if let Some(expected) = expected_revision_count {
        if current as u64 != expected {
            return Err(CortexError::StorageError(StorageError::ConcurrentModification {
                id: memory.id.to_string(),
                expected,
                actual: current as u64,
            }));
        }
    }

    let new_revision_count = current + 1;
    let scope_json = serde_json::to_string(&memory.scope).map_err(CortexError::SerializationError)?;
    let source_memory_ids_json =
        serde_json::to_string(&memory.source_memory_ids).map_err(CortexError::SerializationError)?;
    let embedding_json = memory
        .embedding
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(CortexError::SerializationError)?;

    tx.execute(
        "UPDATE memories SET
            scope_json = ?2, fact = ?3, topic = ?4, category = ?5, confidence = ?6,
            importance = ?7, source_type = ?8, source_memory_ids_json = ?9,
            embedding_json = ?10, embedding_model_id = ?11, revision_count = ?12,
            updated_at = ?13, expires_at = ?14, deleted_at = ?15
        WHERE id = ?1",
        params![
            uuid_to_str(memory.id),
            scope_json,
            memory.fact,
            memory.topic,
            memory.category.as_str(),
            f64::from(memory.confidence),
            f64::from(memory.importance),
            source_type_as_str(memory.source_type),
            source_memory_ids_json,
            embedding_json,
            memory.embedding_model_id,
            new_revision_count,
            memory.updated_at.to_rfc3339(),
            memory.expires_at.map(|t| t.to_rfc3339()),
            memory.deleted_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let revision = MemoryRevision {
        id: Uuid::new_v4(),
        memory_id: memory.id,
        revision_number: new_revision_count as u64,
        fact: memory.fact.clone(),
        action,
        source_session_id: memory.source_session_id.clone(),
        source_memory_ids: Some(memory.source_memory_ids.clone()),
        previous_fact,
        confidence: memory.confidence,
        created_at: Utc::now(),
    };

    tx.execute(
        "INSERT INTO memory_revisions (
            id, memory_id, revision_number, fact, action, source_session_id,
            source_memory_ids_json, previous_fact, confidence, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            uuid_to_str(revision.id),
            uuid_to_str(revision.memory_id),
            revision.revision_number as i64,
            revision.fact,
            action_as_str(revision.action),
            revision.source_session_id,
            revision
                .source_memory_ids
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(CortexError::SerializationError)?,
            revision.previous_fact,
            f64::from(revision.confidence),
            revision.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
    Ok(revision)
}

pub fn soft_delete_memory(
    conn: &mut Connection,
    id: Uuid,
    expected_revision_count: Option<u64>,
) -> CortexResult<()> {
    let existing = {
        let tx = conn.transaction().map_err(|e| to_storage_err(e.to_string()))?;
        let row = tx
            .query_row("SELECT * FROM memories WHERE id = ?1", params![uuid_to_str(id)], row_to_memory)
            .optional()
            .map_err(|e| to_storage_err(e.to_string()))?;
        tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
        row
    };
    let mut memory = existing
        .ok_or_else(|| CortexError::StorageError(StorageError::MemoryNotFound { id: id.to_string() }))??;

    let previous_fact = memory.fact.clone();
    memory.deleted_at = Some(Utc::now());
    memory.updated_at = memory.deleted_at.unwrap();

    update_memory_with_revision(
        conn,
        &memory,
        RevisionAction::Deleted,
        expected_revision_count,
        Some(previous_fact),
    )
    .map(|_| ())
}

pub fn list_revisions(conn: &Connection, memory_id: Uuid) -> CortexResult<Vec<MemoryRevision>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, memory_id, revision_number, fact, action, source_session_id,
                    source_memory_ids_json, previous_fact, confidence, created_at
             FROM memory_revisions WHERE memory_id = ?1 ORDER BY revision_number ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![uuid_to_str(memory_id)], |row| {
            let id: String = row.get(0)?;
            let memory_id: String = row.get(1)?;
            let revision_number: i64 = row.get(2)?;
            let fact: String = row.get(3)?;
            let action: String = row.get(4)?;
            let source_session_id: Option<String> = row.get(5)?;
            let source_memory_ids_json: Option<String> = row.get(6)?;
            let previous_fact: Option<String> = row.get(7)?;
            let confidence: f64 = row.get(8)?;
            let created_at: String = row.get(9)?;
            Ok((
                id,
                memory_id,
                revision_number,
                fact,
                action,
                source_session_id,
                source_memory_ids_json,
                previous_fact,
                confidence,
                created_at,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut revisions = Vec::new();
    for row in rows {
        let (
            id,
            memory_id,
            revision_number,
            fact,
            action,
            source_session_id,
            source_memory_ids_json,
            previous_fact,
            confidence,
            created_at,
        ) = row.map_err(|e| to_storage_err(e.to_string()))?;

        revisions.push(MemoryRevision {
            id: parse_uuid(&id, "memory_revision")?,
            memory_id: parse_uuid(&memory_id, "memory")?,
            revision_number: revision_number as u64,
            fact,
            action: parse_action(&action)?,
            source_session_id,
            source_memory_ids: source_memory_ids_json
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(|e| to_storage_err(format!("corrupt source_memory_ids_json: {e}")))?,
            previous_fact,
            confidence: confidence.into(),
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(revisions)
}
