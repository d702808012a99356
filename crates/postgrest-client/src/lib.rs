//! PostgREST client library.
//!
//! This crate provides a narrow query interface over a PostgREST backend
//! (such as Supabase). It supports:
//!
//! - Filtered selects with aliased and embedded projections
//! - Inserts, partial updates and deletes that echo the affected rows
//! - Calls to stored procedures
//!
//! Business code depends on the [`QueryExecutor`] trait, so the HTTP client can
//! be swapped for a test double.
//!
//! # Example
//!
//! ```no_run
//! use postgrest_client::{PostgrestClient, PostgrestConfig, QueryExecutor, TableQuery};
//!
//! # async fn example() -> Result<(), postgrest_client::PostgrestError> {
//! let config = PostgrestConfig::from_env()?;
//! let client = PostgrestClient::new(config)?;
//!
//! let rows = client
//!     .execute(
//!         TableQuery::table("brains")
//!             .select("brain_id, name")
//!             .eq("status", "public")
//!             .into_request(),
//!     )
//!     .await?;
//! println!("{}", rows);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod query;

pub use client::PostgrestClient;
pub use config::PostgrestConfig;
pub use error::PostgrestError;
pub use executor::QueryExecutor;
pub use query::{Action, Filter, Operator, Request, RpcCall, TableQuery};
