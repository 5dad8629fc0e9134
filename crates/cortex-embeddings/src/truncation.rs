/// Deterministically truncate `text` to approximately `max_tokens`, using a
/// 4-characters-per-token approximation. Idempotent: truncating an
/// already-truncated string at the same budget is a no-op.
pub fn truncate_to_token_budget(text: &str, max_tokens: usize) -> String {
    let max_chars = max_tokens.saturating_mul(4);
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
