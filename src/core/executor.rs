// src/core/executor.rs — One request/response round-trip against a chat endpoint
//
// Builds `[system] + history + [user]`, applies the token-budget rewrite, calls
// the client under the retry policy and normalizes the reply into a QueryResult.

use super::result::{ModelPosteriors, QueryResult};
use super::token_budget::apply_token_budget;
use crate::infra::config::Config;
use crate::infra::errors::QueryError;
use crate::provider::retry::RetryPolicy;
use crate::provider::{ChatCompletionClient, CompletionRequest, Message, Parameters};

/// Everything a caller supplies for one query.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub model: String,
    pub msg: String,
    pub system_msg: String,
    pub msg_history: Vec<Message>,
    /// Structured-output schema. Not supported on this transport.
    pub output_schema: Option<serde_json::Value>,
    pub parameters: Parameters,
    pub model_posteriors: Option<ModelPosteriors>,
}

impl QueryRequest {
    pub fn new(
        model: impl Into<String>,
        msg: impl Into<String>,
        system_msg: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            msg: msg.into(),
            system_msg: system_msg.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.msg_history = history;
        self
    }

    pub fn with_output_schema(mut self, schema: serde_json::Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_model_posteriors(mut self, posteriors: ModelPosteriors) -> Self {
        self.model_posteriors = Some(posteriors);
        self
    }
}

/// Stateless query runner; share one across tasks freely.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    retry: RetryPolicy,
}

impl QueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_retry(RetryPolicy::with_config(config.retry.to_retry_config()))
    }

    pub async fn query(
        &self,
        client: &dyn ChatCompletionClient,
        request: QueryRequest,
    ) -> Result<QueryResult, QueryError> {
        if request.output_schema.is_some() {
            return Err(QueryError::UnsupportedFeature(
                "Structured output not supported for locally hosted models".into(),
            ));
        }

        let QueryRequest {
            model,
            msg,
            system_msg,
            msg_history,
            parameters,
            model_posteriors,
            ..
        } = request;

        let mut new_history = msg_history;
        new_history.push(Message::user(msg.clone()));

        let mut call_parameters = parameters;
        apply_token_budget(&mut call_parameters, &new_history)?;

        let mut messages = Vec::with_capacity(new_history.len() + 1);
        messages.push(Message::system(system_msg.clone()));
        messages.extend(new_history.iter().cloned());

        let completion_request = CompletionRequest {
            model: model.clone(),
            messages,
            parameters: call_parameters,
        };

        tracing::debug!(
            model = %model,
            turns = completion_request.messages.len(),
            "Dispatching chat completion"
        );

        let completion = self
            .retry
            .run(|| client.create(&completion_request))
            .await?;

        let (input_tokens, output_tokens) = completion.token_counts();
        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| QueryError::InvalidResponse("Completion has no choices".into()))?;

        let content = message.content.unwrap_or_default();
        let thought = message.reasoning_content.unwrap_or_default();

        new_history.push(Message::assistant(content.clone()));

        Ok(QueryResult {
            content,
            thought,
            msg,
            system_msg,
            message_history: new_history,
            model_name: model,
            call_parameters: completion_request.parameters,
            input_tokens,
            output_tokens,
            input_cost: 0.0,
            output_cost: 0.0,
            total_cost: 0.0,
            model_posteriors,
        })
    }
}

/// Query a locally hosted server with the default retry policy.
pub async fn query_local(
    client: &dyn ChatCompletionClient,
    request: QueryRequest,
) -> Result<QueryResult, QueryError> {
    QueryExecutor::new().query(client, request).await
}
