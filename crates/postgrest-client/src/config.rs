//! Configuration types for postgrest-client.

use std::env;
use std::time::Duration;

use crate::error::PostgrestError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to a PostgREST backend.
#[derive(Clone)]
pub struct PostgrestConfig {
    /// Base URL of the project (e.g., "https://xyz.supabase.co").
    pub url: String,
    /// API key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Schema profile. If None, the backend's default schema is used.
    pub schema: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl PostgrestConfig {
    /// Create a new configuration with the given URL and key.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            schema: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the schema profile.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SUPABASE_URL` | Backend base URL | (required) |
    /// | `SUPABASE_SERVICE_KEY` | API key | (required) |
    /// | `SUPABASE_SCHEMA` | Schema profile | backend default |
    /// | `SUPABASE_TIMEOUT_SECS` | Request timeout in seconds | `30` |
    pub fn from_env() -> Result<Self, PostgrestError> {
        let url = env::var("SUPABASE_URL")
            .map_err(|_| PostgrestError::Config("SUPABASE_URL not set".to_string()))?;

        let api_key = env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| PostgrestError::Config("SUPABASE_SERVICE_KEY not set".to_string()))?;

        let mut config = Self::new(url, api_key);

        if let Ok(schema) = env::var("SUPABASE_SCHEMA") {
            if !schema.is_empty() {
                config.schema = Some(schema);
            }
        }

        if let Ok(raw) = env::var("SUPABASE_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                PostgrestError::Config(format!("SUPABASE_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Get the REST endpoint URL for a table.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// Get the endpoint URL for a stored procedure.
    pub fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.url, function)
    }
}

impl std::fmt::Debug for PostgrestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("schema", &self.schema)
            .field("timeout", &self.timeout)
            .finish()
    }
}
