//! Brain CRUD operations.

use async_trait::async_trait;
use postgrest_client::{QueryExecutor, RpcCall, TableQuery};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{RepositoryError, Result};
use crate::models::{
    Brain, BrainCreatePayload, BrainProjection, BrainStatus, BrainUpdatableProperties,
    DeleteOutcome, PublicBrain, PublicBrainRow,
};
use crate::secret::build_secret_unique_name;

/// Table holding brains.
pub const BRAINS_TABLE: &str = "brains";

/// Stored procedure that removes a secret from the vault.
pub const DELETE_SECRET_FUNCTION: &str = "delete_secret";

/// Projection for the public listing: the definition is embedded and
/// subscriptions are counted server side.
const PUBLIC_BRAIN_COLUMNS: &str = "id:brain_id, name, description, last_update, brain_type, \
    brain_definition: api_brain_definition(*), number_of_subscribers:brains_users(count)";

/// Storage operations on brains.
///
/// This trait is object-safe and can be used with `Arc<dyn BrainStore>`.
#[async_trait]
pub trait BrainStore: Send + Sync {
    /// Insert a brain and return the stored row.
    async fn create(&self, brain: &BrainCreatePayload) -> Result<Brain>;

    /// List every public brain with its subscriber count.
    async fn list_public(&self) -> Result<Vec<PublicBrain>>;

    /// Set `last_update` to the backend's current time.
    async fn touch_last_update(&self, brain_id: &Uuid) -> Result<()>;

    /// Get a brain by ID with the given projection.
    async fn get(&self, brain_id: &Uuid, projection: BrainProjection) -> Result<Option<Brain>>;

    /// Apply the set fields of `properties` and return the updated row.
    async fn update_by_id(
        &self,
        brain_id: &Uuid,
        properties: &BrainUpdatableProperties,
    ) -> Result<Option<Brain>>;

    /// Delete a brain by ID.
    async fn delete(&self, brain_id: &Uuid) -> Result<DeleteOutcome>;

    /// Delete a secret a user stored for a brain.
    async fn delete_secret(&self, user_id: &Uuid, brain_id: &Uuid, secret_name: &str)
        -> Result<bool>;
}

/// Brain repository over any [`QueryExecutor`].
///
/// Every method is one round trip to the backend.
#[derive(Debug, Clone)]
pub struct BrainRepository<E> {
    executor: E,
}

impl<E: QueryExecutor> BrainRepository<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Get a reference to the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Insert a brain.
    ///
    /// The returned record carries the backend-assigned `brain_id` and
    /// timestamps.
    pub async fn create(&self, brain: &BrainCreatePayload) -> Result<Brain> {
        let values = serde_json::to_value(brain).map_err(RepositoryError::parse("brain"))?;
        debug!("Creating brain {:?}", brain.name);

        let rows: Vec<Brain> = self
            .rows(TableQuery::table(BRAINS_TABLE).insert(values), "brain")
            .await?;

        rows.into_iter().next().ok_or_else(|| {
            RepositoryError::InvariantViolation("insert returned no rows".to_string())
        })
    }

    /// List public brains in backend order.
    ///
    /// A single malformed row fails the whole call.
    pub async fn list_public(&self) -> Result<Vec<PublicBrain>> {
        let query = TableQuery::table(BRAINS_TABLE)
            .select(PUBLIC_BRAIN_COLUMNS)
            .eq("status", BrainStatus::Public.as_str());

        let rows: Vec<PublicBrainRow> = self.rows(query, "public brain").await?;
        debug!("Fetched {} public brains", rows.len());

        Ok(rows.into_iter().map(PublicBrain::from).collect())
    }

    /// Set `last_update` to now. Matching no row is not an error.
    pub async fn touch_last_update(&self, brain_id: &Uuid) -> Result<()> {
        let query = TableQuery::table(BRAINS_TABLE)
            .update(json!({ "last_update": "now()" }))
            .match_all([("brain_id", brain_id)]);

        self.executor.execute(query.into_request()).await?;
        debug!("Touched brain {}", brain_id);
        Ok(())
    }

    /// Get a brain by ID. Returns `None` if no row matches.
    pub async fn get(&self, brain_id: &Uuid, projection: BrainProjection) -> Result<Option<Brain>> {
        let query = TableQuery::table(BRAINS_TABLE)
            .select(projection.columns())
            .eq("brain_id", brain_id);

        let mut rows: Vec<Brain> = self.rows(query, "brain").await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => {
                warn!("{} rows share brain_id {}", n, brain_id);
                Err(RepositoryError::InvariantViolation(format!(
                    "{} rows for brain_id {}",
                    n, brain_id
                )))
            }
        }
    }

    /// Get a brain by ID, selecting all columns.
    pub async fn get_details(&self, brain_id: &Uuid) -> Result<Option<Brain>> {
        self.get(brain_id, BrainProjection::AllColumns).await
    }

    /// Get a brain by ID, selecting `id` alongside all columns.
    pub async fn get_by_id(&self, brain_id: &Uuid) -> Result<Option<Brain>> {
        self.get(brain_id, BrainProjection::Aliased).await
    }

    /// Apply a partial update. Returns `None` if no row matches.
    pub async fn update_by_id(
        &self,
        brain_id: &Uuid,
        properties: &BrainUpdatableProperties,
    ) -> Result<Option<Brain>> {
        let patch =
            serde_json::to_value(properties).map_err(RepositoryError::parse("brain update"))?;

        let query = TableQuery::table(BRAINS_TABLE)
            .update(patch)
            .match_all([("brain_id", brain_id)]);

        let rows: Vec<Brain> = self.rows(query, "brain").await?;
        if rows.is_empty() {
            debug!("Update matched no brain {}", brain_id);
        }
        Ok(rows.into_iter().next())
    }

    /// Delete a brain by ID.
    pub async fn delete(&self, brain_id: &Uuid) -> Result<DeleteOutcome> {
        let query = TableQuery::table(BRAINS_TABLE)
            .delete()
            .match_all([("brain_id", brain_id)]);

        let rows: Vec<Value> = self.rows(query, "deleted rows").await?;
        let outcome = DeleteOutcome::from_rows(rows);
        if !outcome.is_deleted() {
            warn!("Delete matched no brain {}", brain_id);
        }
        Ok(outcome)
    }

    /// Delete a user's secret for a brain through the `delete_secret` procedure.
    ///
    /// Returns the procedure's boolean unchanged.
    pub async fn delete_secret(
        &self,
        user_id: &Uuid,
        brain_id: &Uuid,
        secret_name: &str,
    ) -> Result<bool> {
        let call = RpcCall::new(
            DELETE_SECRET_FUNCTION,
            json!({
                "secret_name": build_secret_unique_name(user_id, brain_id, secret_name),
            }),
        );

        let response = self.executor.execute(call.into_request()).await?;
        serde_json::from_value(response).map_err(RepositoryError::parse("delete_secret result"))
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        query: TableQuery,
        entity: &'static str,
    ) -> Result<Vec<T>> {
        let response: Value = self.executor.execute(query.into_request()).await?;
        serde_json::from_value(response).map_err(RepositoryError::parse(entity))
    }
}

#[async_trait]
impl<E: QueryExecutor> BrainStore for BrainRepository<E> {
    async fn create(&self, brain: &BrainCreatePayload) -> Result<Brain> {
        BrainRepository::create(self, brain).await
    }

    async fn list_public(&self) -> Result<Vec<PublicBrain>> {
        BrainRepository::list_public(self).await
    }

    async fn touch_last_update(&self, brain_id: &Uuid) -> Result<()> {
        BrainRepository::touch_last_update(self, brain_id).await
    }

    async fn get(&self, brain_id: &Uuid, projection: BrainProjection) -> Result<Option<Brain>> {
        BrainRepository::get(self, brain_id, projection).await
    }

    async fn update_by_id(
        &self,
        brain_id: &Uuid,
        properties: &BrainUpdatableProperties,
    ) -> Result<Option<Brain>> {
        BrainRepository::update_by_id(self, brain_id, properties).await
    }

    async fn delete(&self, brain_id: &Uuid) -> Result<DeleteOutcome> {
        BrainRepository::delete(self, brain_id).await
    }

    async fn delete_secret(
        &self,
        user_id: &Uuid,
        brain_id: &Uuid,
        secret_name: &str,
    ) -> Result<bool> {
        BrainRepository::delete_secret(self, user_id, brain_id, secret_name).await
    }
}
