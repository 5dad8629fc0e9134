use cortex_core::constants::{DEFAULT_MAX_FACT_LEN, DEFAULT_MIN_FACT_LEN};
use cortex_core::memory::candidate::ExtractionCandidate;
use cortex_core::memory::{Category, Confidence, Importance};
use serde_json::Value;
use tracing::debug;

/// Why a raw LLM-returned item was dropped before becoming a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    MissingFact,
    FactLength(usize),
    UnknownCategory(String),
    MissingConfidence,
    ConfidenceOutOfRange(f64),
    BelowMinConfidence { confidence: f64, min: f64 },
}

/// Validate one raw `{fact, category, confidence, topic?, importance?}`
/// object per §4.5 step 4-5. `raw_index` is carried through purely for
/// diagnostic logging of drop reasons, per the expanded spec's
/// `ExtractionCandidate::raw_index` note.
pub fn validate_item(
    item: &Value,
    min_confidence: f64,
    raw_index: usize,
) -> Result<ExtractionCandidate, DropReason> {
    let fact = item
        .get("fact")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or(DropReason::MissingFact)?;

    let len = fact.chars().count();
    if !(DEFAULT_MIN_FACT_LEN..=DEFAULT_MAX_FACT_LEN).contains(&len) {
        return Err(DropReason::FactLength(len));
    }

    let category_raw = item
        .get("category")
        .and_then(Value::as_str)
        .ok_or_else(|| DropReason::UnknownCategory(String::new()))?;
    let category =
        Category::parse(category_raw).ok_or_else(|| DropReason::UnknownCategory(category_raw.to_string()))?;

    let confidence = item
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or(DropReason::MissingConfidence)?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(DropReason::ConfidenceOutOfRange(confidence));
    }
    if confidence < min_confidence {
        return Err(DropReason::BelowMinConfidence {
            confidence,
            min: min_confidence,
        });
    }

    let importance = item.get("importance").and_then(Value::as_f64).unwrap_or(0.5);
    let topic = item
        .get("topic")
        .and_then(Value::as_str)
        .map(str::to_string);

    debug!(raw_index, fact, "validated extraction candidate");

    let mut candidate = ExtractionCandidate::new(
        fact.to_string(),
        category,
        Confidence::new(confidence),
        Importance::new(importance),
    );
    candidate.topic = topic;
    Ok(candidate)
}
