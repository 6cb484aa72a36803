// src/infra/errors.rs — Error types for query dispatch and template resolution

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the query path.
///
/// The first four variants are the classified transient conditions the retry
/// policy acts on. After the last attempt they reach the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    // Transient (retried)
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("HTTP {status} from server: {message}")]
    Status { status: u16, message: String },

    #[error("Rate limited (retry after {retry_after_ms}ms)")]
    RateLimited { retry_after_ms: u64 },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    // Caller errors (never retried)
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Whether the retry policy should try again after this error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            QueryError::Connection { .. }
                | QueryError::Status { .. }
                | QueryError::RateLimited { .. }
                | QueryError::Timeout { .. }
        )
    }

    /// Server-suggested wait, if this is a rate-limit rejection that carried one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            QueryError::RateLimited { retry_after_ms } if *retry_after_ms > 0 => {
                Some(*retry_after_ms)
            }
            _ => None,
        }
    }
}

/// Errors raised while building a template namespace.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template package at {} has no entry file '{entry}'", dir.display())]
    MissingEntry { dir: PathBuf, entry: &'static str },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Export '{name}' is not defined in {}", path.display())]
    UnknownExport { name: String, path: PathBuf },

    #[error("Cannot import '{name}' from module '{module}'")]
    UnresolvedImport { module: String, name: String },

    #[error("External templates are missing built-in names: {}", missing.join(", "))]
    MissingBuiltinNames { missing: Vec<String> },

    #[error("Environment variable {var} is not set")]
    MissingEnv { var: &'static str },

    #[error("Cannot read context file {}: {source}", path.display())]
    MissingContextFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template '{template}' needs variable '{variable}'")]
    MissingVariable { template: String, variable: String },
}
