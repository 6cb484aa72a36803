// src/lib.rs — Library root for shinka-llm
//
// Query dispatch against OpenAI-compatible endpoints (retry, token budget,
// result normalization) and the prompt template set used to build queries.

pub mod core;
pub mod infra;
pub mod prompts;
pub mod provider;

pub use crate::core::{query_local, QueryExecutor, QueryRequest, QueryResult};
pub use crate::infra::errors::{QueryError, TemplateError};
pub use crate::prompts::{resolve_templates, ResolverSettings, TemplateProvider};
pub use crate::provider::openai_compat::OpenAICompatClient;
pub use crate::provider::{ChatCompletionClient, Message, Role};
