use cortex_core::config::FewShotExample;
use cortex_core::events::ConversationEvent;
use cortex_core::memory::Category;
use serde_json::{json, Value};

const SYSTEM_INSTRUCTION: &str = "You extract structured, memorable user facts from an \
agent conversation transcript. A fact is a short, first-person-about-the-user statement: \
something true about the user that would be useful to recall in a future conversation. \
Only extract facts stated or clearly implied by the user; do not invent facts, and do not \
extract facts about the agent or about third parties. Return an empty array if the \
transcript carries no memorable facts.";

/// JSON-schema-like description of the expected output: an array of
/// `{fact, category, confidence, topic?, importance?}` objects.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "facts": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "fact": {"type": "string"},
                        "category": {"type": "string", "enum": Category::ALL.map(Category::as_str)},
                        "confidence": {"type": "number", "minimum": 0.0, "maximum": 1.0},
                        "topic": {"type": "string"},
                        "importance": {"type": "number", "minimum": 0.0, "maximum": 1.0},
                    },
                    "required": ["fact", "category", "confidence"],
                },
            },
        },
        "required": ["facts"],
    })
}

/// Render events as chronological `speaker: content` lines, as required by
/// §4.5 step 2 — ordering must be preserved from the input sequence.
fn render_transcript(events: &[ConversationEvent]) -> String {
    events
        .iter()
        .map(ConversationEvent::as_prompt_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_few_shot(examples: &[FewShotExample]) -> String {
    if examples.is_empty() {
        return String::new();
    }
    let rendered = examples
        .iter()
        .map(|ex| {
            format!(
                "Transcript:\n{}\nExtracted: {{\"fact\": \"{}\", \"category\": \"{}\", \"confidence\": {}}}",
                ex.transcript, ex.fact, ex.category, ex.confidence
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Examples:\n\n{rendered}\n\n")
}

/// Build the `(system_prompt, user_prompt)` pair for one extraction call.
pub fn build_prompt(events: &[ConversationEvent], few_shot_examples: &[FewShotExample]) -> (String, String) {
    let categories = Category::ALL.map(Category::as_str).join(", ");
    let system_prompt = format!("{SYSTEM_INSTRUCTION}\n\nAllowed categories: {categories}.");

    let user_prompt = format!(
        "{few_shot}Conversation:\n{transcript}",
        few_shot = render_few_shot(few_shot_examples),
        transcript = render_transcript(events),
    );

    (system_prompt, user_prompt)
}
