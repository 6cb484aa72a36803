// src/provider/openai_compat.rs — Client for any OpenAI-compatible endpoint
//
// Used for locally hosted servers (vLLM, SGLang, llama.cpp server) as well as
// hosted APIs that speak the `/chat/completions` dialect.

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatCompletion, ChatCompletionClient, CompletionRequest};
use crate::infra::config::ClientConfig;
use crate::infra::errors::QueryError;

/// Bearer token sent when the server needs none (vLLM convention).
const EMPTY_API_KEY: &str = "EMPTY";

pub struct OpenAICompatClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAICompatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.unwrap_or_else(|| EMPTY_API_KEY.to_string()),
            client,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, QueryError> {
        Self::new(config.base_url.clone(), config.api_key(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map a transport failure onto the classified error kinds.
fn classify_transport_error(e: &reqwest::Error) -> QueryError {
    if e.is_timeout() {
        QueryError::Timeout {
            message: e.to_string(),
        }
    } else {
        QueryError::Connection {
            message: e.to_string(),
        }
    }
}

/// `Retry-After` in seconds, as sent with HTTP 429.
fn retry_after_ms(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64)
        .unwrap_or(0)
}

#[async_trait]
impl ChatCompletionClient for OpenAICompatClient {
    async fn create(&self, request: &CompletionRequest) -> Result<ChatCompletion, QueryError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(
                "User-Agent",
                format!("shinka-llm/{}", env!("CARGO_PKG_VERSION")),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(QueryError::RateLimited {
                retry_after_ms: retry_after_ms(response.headers()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        serde_json::from_slice(&body)
            .map_err(|e| QueryError::InvalidResponse(format!("Failed to decode completion: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            OpenAICompatClient::new("http://localhost:8000/v1/", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/v1");
    }

    #[test]
    fn test_missing_key_uses_placeholder() {
        let client =
            OpenAICompatClient::new("http://localhost:8000/v1", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.api_key, "EMPTY");
    }

    #[test]
    fn test_from_config() {
        let client = OpenAICompatClient::from_config(&ClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/v1");
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_ms(&headers), 0);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after_ms(&headers), 3000);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("0.5"));
        assert_eq!(retry_after_ms(&headers), 500);

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after_ms(&headers), 0);
    }
}
