pub mod types;
pub mod schema;
pub mod parser;
pub mod gemini;
pub mod retry;

pub use types::*;
pub use schema::*;
pub use parser::*;
pub use gemini::*;
pub use retry::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction request failed: {0}")]
    Request(String),

    #[error("Extraction service returned invalid JSON: {0}")]
    Parse(String),

    #[error("Extraction service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("Extraction service not reachable at {0}")]
    Connection(String),

    #[error("Extraction request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Extraction service API key not configured")]
    MissingApiKey,
}

impl ExtractionError {
    /// Transport-level failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractionError::Connection(_)
            | ExtractionError::Timeout(_)
            | ExtractionError::HttpClient(_)
            | ExtractionError::Request(_)
            | ExtractionError::Parse(_) => true,
            ExtractionError::Service { status, .. } => *status == 429 || *status >= 500,
            ExtractionError::MissingApiKey => false,
        }
    }

    /// True for the "returned text is not JSON" family, false for
    /// everything that failed before usable text arrived.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ExtractionError::Parse(_))
    }

    /// Short reason safe to show to callers. Never carries upstream
    /// bodies, URLs or transport detail; log the error itself for those.
    pub fn client_message(&self) -> &'static str {
        match self {
            ExtractionError::Parse(_) => "The document could not be read. Please try again.",
            ExtractionError::Service { status: 429, .. } => {
                "The extraction service is busy. Please try again shortly."
            }
            ExtractionError::Service { .. } => "The extraction service rejected the request.",
            ExtractionError::Timeout(_) => "The extraction service took too long to respond.",
            ExtractionError::Connection(_)
            | ExtractionError::Request(_)
            | ExtractionError::HttpClient(_) => "The extraction service could not be reached.",
            ExtractionError::MissingApiKey => "The extraction service is not configured.",
        }
    }
}
