//! PostgREST HTTP client.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PostgrestConfig;
use crate::error::PostgrestError;
use crate::executor::QueryExecutor;
use crate::query::{Action, Request};

/// Ask mutations to echo the affected rows.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Error body returned by PostgREST on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Everything needed to send one request, before it touches the network.
#[derive(Debug, PartialEq)]
struct HttpParts<'a> {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    body: Option<&'a Value>,
    prefer: Option<&'static str>,
    profile: Option<(&'static str, String)>,
}

/// Client for a PostgREST backend.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    config: PostgrestConfig,
}

impl PostgrestClient {
    /// Build a client. This does not contact the backend.
    pub fn new(config: PostgrestConfig) -> Result<Self, PostgrestError> {
        if config.url.is_empty() {
            return Err(PostgrestError::Config("url is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PostgrestError::Http)?;

        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &PostgrestConfig {
        &self.config
    }

    fn http_parts<'a>(&self, request: &'a Request) -> HttpParts<'a> {
        match request {
            Request::Table(query) => {
                let mut params: Vec<(String, String)> = Vec::new();
                let (method, body, prefer) = match &query.action {
                    Action::Select { columns } => {
                        params.push(("select".to_string(), columns.clone()));
                        (Method::GET, None, None)
                    }
                    Action::Insert { values } => {
                        (Method::POST, Some(values), Some(RETURN_REPRESENTATION))
                    }
                    Action::Update { values } => {
                        (Method::PATCH, Some(values), Some(RETURN_REPRESENTATION))
                    }
                    Action::Delete => (Method::DELETE, None, Some(RETURN_REPRESENTATION)),
                };
                params.extend(
                    query
                        .filters
                        .iter()
                        .map(|f| (f.column.clone(), f.to_param())),
                );

                let profile_header = if query.action.is_mutation() {
                    "Content-Profile"
                } else {
                    "Accept-Profile"
                };

                HttpParts {
                    method,
                    url: self.config.table_url(&query.table),
                    query: params,
                    body,
                    prefer,
                    profile: self.config.schema.clone().map(|s| (profile_header, s)),
                }
            }
            Request::Rpc(call) => HttpParts {
                method: Method::POST,
                url: self.config.rpc_url(&call.function),
                query: Vec::new(),
                body: Some(&call.args),
                prefer: None,
                profile: self.config.schema.clone().map(|s| ("Content-Profile", s)),
            },
        }
    }
}

#[async_trait]
impl QueryExecutor for PostgrestClient {
    async fn execute(&self, request: Request) -> Result<Value, PostgrestError> {
        let parts = self.http_parts(&request);
        debug!("{} {}", parts.method, parts.url);

        let mut builder = self
            .http
            .request(parts.method.clone(), &parts.url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .query(&parts.query);

        if let Some(body) = parts.body {
            builder = builder.json(body);
        }
        if let Some(prefer) = parts.prefer {
            builder = builder.header("Prefer", prefer);
        }
        if let Some((name, schema)) = &parts.profile {
            builder = builder.header(*name, schema);
        }

        let response = builder.send().await.map_err(PostgrestError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(PostgrestError::Http)?;

        if !status.is_success() {
            warn!("{} {} returned {}", parts.method, parts.url, status);
            return Err(api_error(status, &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn api_error(status: StatusCode, body: &str) -> PostgrestError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => PostgrestError::Api {
            status: status.as_u16(),
            code: err.code,
            message: err.message.unwrap_or_else(|| body.to_string()),
            details: err.details,
            hint: err.hint,
        },
        Err(_) => PostgrestError::Api {
            status: status.as_u16(),
            code: None,
            message: body.to_string(),
            details: None,
            hint: None,
        },
    }
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("config", &self.config)
            .finish()
    }
}
