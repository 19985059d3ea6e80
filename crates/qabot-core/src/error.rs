use thiserror::Error;

/// Failure kinds surfaced by the retrieval core and its loaders.
///
/// The first three are the request-facing kinds callers are expected to map
/// to responses; the rest come from configuration and file handling.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Index unavailable: no index has been built or loaded")]
    IndexUnavailable,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Malformed persisted index: {0}")]
    MalformedPersistedIndex(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
