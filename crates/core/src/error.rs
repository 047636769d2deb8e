//! Error Taxonomy
//!
//! Every wrapper around a remote service returns one of these errors instead of
//! swallowing it. Callers that want a display string (the flashcard warning,
//! the translation error text) convert explicitly.

/// Fatal problems detected while wiring the application together.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// A remote LLM or translation call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("LLM request failed: {0}")]
    Llm(String),
    #[error("LLM response had no text content")]
    EmptyResponse,
    #[error("Translation request failed: {0}")]
    Translation(String),
}

/// Reading or writing the progress file failed.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Progress file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Progress file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
