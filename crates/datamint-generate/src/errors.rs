use datamint_core::{DirectiveError, Error as CoreError};
use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Document(#[from] CoreError),
    /// Resolution of one record failed; `record` is 1-based.
    #[error("error generating record {record}: {source}")]
    Record {
        record: u64,
        #[source]
        source: DirectiveError,
    },
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a value provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{0}")]
    InvalidParams(String),
    #[error("{0}")]
    Failed(String),
}
