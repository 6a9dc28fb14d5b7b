use thiserror::Error;

/// Errors reported by map generation, graph queries and the persistence layer.
///
/// Failures are always reported to the immediate caller. Nothing in this crate
/// retries on its own except the map generation plugin, which regenerates on
/// [`GameError::GenerationFailure`].
#[derive(Debug, Error)]
pub enum GameError {
    /// A parameter is outside its valid range (kingdom count, scale, empty graph...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Map generation produced an unusable result. Discard and retry with new randomness.
    #[error("map generation failed: {0}")]
    GenerationFailure(String),

    /// A node handle or other lookup key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("map encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),
}

impl GameError {
    /// Whether the caller should regenerate with fresh randomness.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::GenerationFailure(_))
    }
}
