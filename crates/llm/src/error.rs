//! Typed error enum for the LLM crate.

use thiserror::Error;
use venti_core::RemoteError;

use crate::client::truncate;

/// Errors from LLM API operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("empty response: no choices returned")]
    EmptyResponse,
    #[error("unexpected response: {0}")]
    Unexpected(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("all retries exhausted, last error: {0}")]
    RetriesExhausted(Box<LlmError>),
}

impl LlmError {
    /// Whether this error is transient and should be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 529),
            _ => false,
        }
    }
}

impl From<LlmError> for RemoteError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::HttpRequest(e) if e.is_timeout() => Self::Timeout,
            LlmError::HttpRequest(e) => Self::Network(e.to_string()),
            LlmError::ClientInit(msg) => Self::Network(msg),
            LlmError::HttpStatus { code, body } => {
                Self::Service { status: code, message: truncate(&body, 200).to_owned() }
            },
            LlmError::JsonParse { .. } | LlmError::EmptyResponse | LlmError::Unexpected(_) => {
                Self::InvalidResponse(err.to_string())
            },
            LlmError::RetriesExhausted(inner) => Self::from(*inner),
        }
    }
}
