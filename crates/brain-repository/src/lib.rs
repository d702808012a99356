//! Brain persistence over a PostgREST backend.
//!
//! This crate provides async CRUD and listing operations for brains. The
//! backend is reached through any [`postgrest_client::QueryExecutor`], which is
//! injected at construction.
//!
//! # Example
//!
//! ```no_run
//! use brain_repository::{BrainCreatePayload, BrainRepository, BrainStatus};
//! use postgrest_client::{PostgrestClient, PostgrestConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PostgrestClient::new(PostgrestConfig::from_env()?)?;
//!     let brains = BrainRepository::new(client);
//!
//!     // Create a public brain
//!     let payload = BrainCreatePayload::new("Recipes").with_status(BrainStatus::Public);
//!     let brain = brains.create(&payload).await?;
//!
//!     for public in brains.list_public().await? {
//!         println!("{} ({} subscribers)", public.name, public.number_of_subscribers);
//!     }
//!
//!     brains.delete(&brain.brain_id).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod secret;

pub use error::{RepositoryError, Result};
pub use models::{
    ApiBrainDefinition, ApiBrainDefinitionSchema, ApiBrainDefinitionSchemaProperty,
    ApiBrainDefinitionSecret, ApiBrainMethod, Brain, BrainCreatePayload, BrainProjection,
    BrainStatus, BrainType, BrainUpdatableProperties, DeleteOutcome, PublicBrain,
};
pub use repository::{BrainRepository, BrainStore, BRAINS_TABLE, DELETE_SECRET_FUNCTION};
pub use secret::build_secret_unique_name;
