//! # cortex-extraction
//!
//! Extraction Stage: builds the extraction prompt from a chronological event
//! sequence, invokes the `LlmProvider`, and validates/filters the structured
//! output into `ExtractionCandidate`s. Pure with respect to storage — this
//! crate never writes anything; the Coordinator decides what survives.

mod prompt;
mod validation;

pub use prompt::{build_prompt, response_schema};
pub use validation::{validate_item, DropReason};

use cortex_core::config::ExtractionConfig;
use cortex_core::errors::LlmError;
use cortex_core::events::ConversationEvent;
use cortex_core::memory::candidate::ExtractionCandidate;
use cortex_core::traits::LlmProvider;
use cortex_core::CortexResult;
use tracing::{info, warn};

/// Why extraction produced no candidates without that being an error — a
/// job completing with zero memories is success, per §7.
#[derive(Debug, Clone, PartialEq)]
pub enum EmptyReason {
    InsufficientEvents { have: usize, need: usize },
    NoCandidatesReturned,
    AllCandidatesFiltered,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub candidates: Vec<ExtractionCandidate>,
    pub raw_response: Option<String>,
    pub empty_reason: Option<EmptyReason>,
}

/// Run the Extraction Stage over one session's events. See §4.5 for the
/// numbered algorithm this implements step-for-step.
pub async fn extract(
    provider: &dyn LlmProvider,
    events: &[ConversationEvent],
    config: &ExtractionConfig,
) -> CortexResult<ExtractionResult> {
    if events.len() < config.min_events {
        return Ok(ExtractionResult {
            empty_reason: Some(EmptyReason::InsufficientEvents {
                have: events.len(),
                need: config.min_events,
            }),
            ..Default::default()
        });
    }

    let (system_prompt, user_prompt) = prompt::build_prompt(events, &config.few_shot_examples);
    let schema = prompt::response_schema();

    let response = provider
        .extract_structured(&system_prompt, &user_prompt, &schema)
        .await?;

    let parsed: serde_json::Value = serde_json::from_str(&response.raw_text).map_err(|e| {
        cortex_core::errors::CortexError::LlmError(LlmError::Unparseable {
            reason: format!("extraction output was not valid JSON: {e}"),
        })
    })?;

    let raw_items = parsed
        .get("facts")
        .and_then(serde_json::Value::as_array)
        .cloned()
        .unwrap_or_default();

    if raw_items.is_empty() {
        return Ok(ExtractionResult {
            raw_response: Some(response.raw_text),
            empty_reason: Some(EmptyReason::NoCandidatesReturned),
            ..Default::default()
        });
    }

    let mut candidates = Vec::new();
    for (index, item) in raw_items.iter().enumerate() {
        match validation::validate_item(item, config.min_confidence, index) {
            Ok(candidate) => candidates.push(candidate),
            Err(reason) => warn!(raw_index = index, ?reason, "dropped extraction candidate"),
        }
    }

    // Truncate to MAX_FACTS_PER_EXTRACTION, preserving order — insertion
    // order, since we don't assume the model pre-sorted by confidence.
    candidates.truncate(config.max_facts);

    if candidates.is_empty() {
        return Ok(ExtractionResult {
            raw_response: Some(response.raw_text),
            empty_reason: Some(EmptyReason::AllCandidatesFiltered),
            ..Default::default()
        });
    }

    info!(count = candidates.len(), "extraction produced candidates");
    Ok(ExtractionResult {
        candidates,
        raw_response: Some(response.raw_text),
        empty_reason: None,
    })
}
