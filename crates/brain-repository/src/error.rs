//! Repository error types.

use postgrest_client::PostgrestError;
use thiserror::Error;

/// Errors that can occur during brain repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backend rejected the request or could not be reached.
    #[error("storage error: {0}")]
    Storage(#[from] PostgrestError),

    /// A row did not have the expected shape.
    #[error("failed to parse {entity}: {source}")]
    Parse {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The backend returned something that cannot happen under the schema.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl RepositoryError {
    pub(crate) fn parse(entity: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| RepositoryError::Parse { entity, source }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
