// src/core/result.rs — Normalized record returned by every query

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::provider::{Message, Parameters};

/// Caller-side model-selection bookkeeping, carried through untouched.
pub type ModelPosteriors = BTreeMap<String, f64>;

/// Outcome of one successful round-trip.
///
/// `message_history` holds the prior turns plus the new user and assistant
/// turns, in that order. Costs are zero on transports without pricing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub content: String,
    /// Reasoning text, empty when the server sends none.
    pub thought: String,
    pub msg: String,
    pub system_msg: String,
    pub message_history: Vec<Message>,
    pub model_name: String,
    /// Parameters actually sent, after the token-budget rewrite.
    pub call_parameters: Parameters,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub model_posteriors: Option<ModelPosteriors>,
}

impl QueryResult {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// The assistant turn appended by this call.
    pub fn last_turn(&self) -> Option<&Message> {
        self.message_history.last()
    }
}
