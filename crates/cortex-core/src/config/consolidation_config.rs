use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONFLICT_THRESHOLD, DEFAULT_MAX_CONSOLIDATION_BATCH, DEFAULT_MERGE_BOOST,
    DEFAULT_MERGE_THRESHOLD,
};

/// Survivor-selection policy for a merged connected component. See the
/// consolidation stage's tie-break rules for each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    HighestConfidence,
    MostRecent,
    Longest,
}

impl Default for MergeStrategy {
    fn default() -> Self {
        Self::HighestConfidence
    }
}

/// Consolidation Stage configuration. `CONSOLIDATION_` env var prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub merge_threshold: f64,
    pub conflict_threshold: f64,
    pub merge_strategy: MergeStrategy,
    pub confidence_boost: f64,
    pub max_batch: usize,
    /// Extraction jobs publish a follow-up `CONSOLIDATE` job once a scope's
    /// active memory count has grown by this many since its last
    /// consolidation run. `0` disables auto-triggering.
    pub auto_consolidate_threshold: usize,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            conflict_threshold: DEFAULT_CONFLICT_THRESHOLD,
            merge_strategy: MergeStrategy::default(),
            confidence_boost: DEFAULT_MERGE_BOOST,
            max_batch: DEFAULT_MAX_CONSOLIDATION_BATCH,
            auto_consolidate_threshold: 50,
        }
    }
}
