// src/core/token_budget.rs — Output-token budget from a context-length proxy

use crate::infra::errors::QueryError;
use crate::provider::{Message, Parameters};

/// Logical key: the model's total budget, before context is subtracted.
pub const MAX_OUTPUT_TOKENS_KEY: &str = "max_output_tokens";
/// Wire key understood by OpenAI-compatible servers.
pub const MAX_TOKENS_KEY: &str = "max_tokens";

/// Characters per token when no tokenizer is at hand.
const CHARS_PER_TOKEN: f64 = 1.5;

/// Unicode scalar count over every message content.
pub fn context_chars(history: &[Message]) -> usize {
    history.iter().map(|m| m.content.chars().count()).sum()
}

/// `hint - chars / 1.5`, truncated toward zero. May be negative.
pub fn effective_budget(hint: f64, context_chars: usize) -> i64 {
    (hint - context_chars as f64 / CHARS_PER_TOKEN) as i64
}

/// Rewrite `max_output_tokens` into `max_tokens` when the caller did not set
/// `max_tokens` explicitly. The logical key never reaches the wire.
pub fn apply_token_budget(parameters: &mut Parameters, history: &[Message]) -> Result<(), QueryError> {
    let Some(hint) = parameters.remove(MAX_OUTPUT_TOKENS_KEY) else {
        return Ok(());
    };

    if parameters.contains_key(MAX_TOKENS_KEY) {
        return Ok(());
    }

    let hint = hint.as_f64().ok_or_else(|| {
        QueryError::InvalidRequest(format!("'{MAX_OUTPUT_TOKENS_KEY}' must be a number, got {hint}"))
    })?;

    let budget = effective_budget(hint, context_chars(history));
    tracing::debug!(hint, budget, "Derived max_tokens from context length");
    parameters.insert(MAX_TOKENS_KEY.into(), serde_json::json!(budget));

    Ok(())
}
