//! The query execution seam.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PostgrestError;
use crate::query::Request;

/// Something that can run a [`Request`] and hand back the raw JSON response.
///
/// Table reads and mutations return a JSON array of rows. RPC calls return
/// whatever the procedure returns. This trait is object-safe and can be used
/// with `Arc<dyn QueryExecutor>`.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute one request.
    async fn execute(&self, request: Request) -> Result<Value, PostgrestError>;
}

#[async_trait]
impl<E: QueryExecutor + ?Sized> QueryExecutor for Arc<E> {
    async fn execute(&self, request: Request) -> Result<Value, PostgrestError> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    async fn execute(&self, request: Request) -> Result<Value, PostgrestError> {
        (**self).execute(request).await
    }
}
