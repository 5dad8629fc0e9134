use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EXTRACTION_MIN_CONFIDENCE, DEFAULT_MAX_FACTS_PER_EXTRACTION, DEFAULT_MIN_EVENTS,
};

/// One inlined few-shot example: a short transcript snippet and the fact it
/// should yield, used to steer the LLM toward the house style of a
/// first-person, categorized statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FewShotExample {
    pub transcript: String,
    pub fact: String,
    pub category: String,
    pub confidence: f64,
}

/// Extraction Stage configuration. `EXTRACTION_` env var prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_events: usize,
    pub max_facts: usize,
    pub min_confidence: f64,
    /// Fixed, config-controlled few-shot examples inlined into the prompt.
    pub few_shot_examples: Vec<FewShotExample>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_events: DEFAULT_MIN_EVENTS,
            max_facts: DEFAULT_MAX_FACTS_PER_EXTRACTION,
            min_confidence: DEFAULT_EXTRACTION_MIN_CONFIDENCE,
            few_shot_examples: vec![
                FewShotExample {
                    transcript: "user: I just moved to Austin last month\nagent: Welcome! How's the move going?".to_string(),
                    fact: "User lives in Austin".to_string(),
                    category: "location".to_string(),
                    confidence: 0.95,
                },
                FewShotExample {
                    transcript: "user: I try to go for a run every morning before work\nagent: That's a great habit".to_string(),
                    fact: "User runs every morning before work".to_string(),
                    category: "habit".to_string(),
                    confidence: 0.9,
                },
            ],
        }
    }
}
