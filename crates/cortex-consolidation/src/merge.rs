//! Survivor selection for one merged connected component.

use cortex_core::config::MergeStrategy;
use cortex_core::memory::Memory;
use uuid::Uuid;

/// One merged output, not yet a persisted `Memory` — the Coordinator decides
/// whether it updates an existing row or inserts a new one.
#[derive(Debug, Clone)]
pub struct MergedMemory {
    pub fact: String,
    pub confidence: f64,
    pub importance: f64,
    pub source_memory_ids: Vec<Uuid>,
    pub survivor_id: Uuid,
    pub merge_reason: &'static str,
}

/// Pick the survivor of a component per the configured strategy, then apply
/// the confidence boost. `members` must have at least 2 entries; panics
/// otherwise (callers only ever reach here for components of size ≥ 2).
pub fn merge_component(members: &[&Memory], strategy: MergeStrategy, boost: f64) -> MergedMemory {
    assert!(members.len() >= 2, "merge_component requires at least two members");

    let survivor = match strategy {
        MergeStrategy::HighestConfidence => pick(members, by_confidence_desc, by_length_desc, by_created_at_desc),
        MergeStrategy::MostRecent => pick(members, by_created_at_desc, by_confidence_desc, by_length_desc),
        MergeStrategy::Longest => pick(members, by_length_desc, by_confidence_desc, by_created_at_desc),
    };

    let max_confidence = members
        .iter()
        .map(|m| m.confidence.value())
        .fold(0.0f64, f64::max);

    MergedMemory {
        fact: survivor.fact.clone(),
        confidence: (max_confidence + boost).min(1.0),
        importance: survivor.importance.value(),
        source_memory_ids: members.iter().map(|m| m.id).collect(),
        survivor_id: survivor.id,
        merge_reason: strategy_name(strategy),
    }
}

fn strategy_name(strategy: MergeStrategy) -> &'static str {
    match strategy {
        MergeStrategy::HighestConfidence => "highest_confidence",
        MergeStrategy::MostRecent => "most_recent",
        MergeStrategy::Longest => "longest",
    }
}

fn by_confidence_desc(a: &&Memory, b: &&Memory) -> std::cmp::Ordering {
    b.confidence.value().partial_cmp(&a.confidence.value()).unwrap_or(std::cmp::Ordering::Equal)
}

fn by_length_desc(a: &&Memory, b: &&Memory) -> std::cmp::Ordering {
    b.fact.chars().count().cmp(&a.fact.chars().count())
}

fn by_created_at_desc(a: &&Memory, b: &&Memory) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

type Tiebreak = fn(&&Memory, &&Memory) -> std::cmp::Ordering;

/// Sort by `primary`, falling back to `secondary` then `tertiary` on ties,
/// and return the first element. Stable sort makes this deterministic for
/// the commutativity property in §8.
fn pick<'a>(members: &[&'a Memory], primary: Tiebreak, secondary: Tiebreak, tertiary: Tiebreak) -> &'a Memory {
    let mut sorted: Vec<&Memory> = members.to_vec();
    sorted.sort_by(|a, b| primary(a, b).then_with(|| secondary(a, b)).then_with(|| tertiary(a, b)).then_with(|| a.id.cmp(&b.id)));
    sorted[0]
}
