use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::confidence::{Confidence, Importance};
use crate::errors::{CortexError, CortexResult};
use crate::scope::Scope;

/// How a memory came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Extracted,
    Consolidated,
    Direct,
    Imported,
}

/// The central entity of the system: one scoped fact, with its embedding and
/// revision history. Mutated only through the Coordinator, which is what
/// guarantees every change is mirrored by a `MemoryRevision`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub scope: Scope,
    pub fact: String,
    pub topic: Option<String>,
    pub category: Category,
    pub confidence: Confidence,
    pub importance: Importance,
    pub source_type: SourceType,
    pub source_session_id: Option<String>,
    pub source_memory_ids: Vec<Uuid>,
    pub embedding: Option<Vec<f32>>,
    pub embedding_model_id: Option<String>,
    pub revision_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Memory {
    /// Validate `fact`: 1-500 chars after trimming, UTF-8 (guaranteed by
    /// `String`). Returns the trimmed fact on success.
    pub fn validate_fact(fact: &str) -> CortexResult<String> {
        let trimmed = fact.trim();
        if trimmed.is_empty() {
            return Err(CortexError::InvalidInput {
                reason: "fact must not be empty after trimming".to_string(),
            });
        }
        if trimmed.chars().count() > 500 {
            return Err(CortexError::InvalidInput {
                reason: format!(
                    "fact is {} chars, maximum is 500",
                    trimmed.chars().count()
                ),
            });
        }
        Ok(trimmed.to_string())
    }

    /// Whether this memory is excluded from searches and consolidation: soft
    /// deleted or past its expiry.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        if self.deleted_at.is_some() {
            return false;
        }
        match self.expires_at {
            Some(expiry) => expiry > now,
            None => true,
        }
    }

    /// blake3 content hash over the fact, used for dedup and embedding-cache
    /// keys. Deliberately excludes mutable fields (confidence, importance)
    /// so re-extracting the same fact hits the same cache entry.
    pub fn content_hash(&self) -> String {
        blake3::hash(self.fact.as_bytes()).to_hex().to_string()
    }

    /// `source_type = consolidated` requires a non-empty `source_memory_ids`.
    pub fn validate_consolidated_sources(&self) -> CortexResult<()> {
        if self.source_type == SourceType::Consolidated && self.source_memory_ids.is_empty() {
            return Err(CortexError::InvalidInput {
                reason: "consolidated memory must carry non-empty source_memory_ids".to_string(),
            });
        }
        Ok(())
    }
}
