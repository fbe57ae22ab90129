use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Embedder unavailable: {0}")]
    EmbedderUnavailable(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors the hybrid engine absorbs by falling back to lexical-only work.
    pub fn is_embedding_failure(&self) -> bool {
        matches!(
            self,
            Error::EmbedderUnavailable(_) | Error::DegenerateVector(_) | Error::DimensionMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
