//! Error types for postgrest-client.

use thiserror::Error;

/// Errors that can occur when talking to a PostgREST backend.
#[derive(Debug, Error)]
pub enum PostgrestError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend rejected the request.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// PostgreSQL or PostgREST error code (e.g. "23505", "PGRST116").
        code: Option<String>,
        /// Human-readable message.
        message: String,
        /// Additional details, if the backend supplied any.
        details: Option<String>,
        /// Hint, if the backend supplied one.
        hint: Option<String>,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
