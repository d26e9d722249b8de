//! Storage contract.
//!
//! Derived counter maintenance needs exactly four operations from the store
//! holding the read model. Relation paths in `FindOptions` are resolved by the
//! store; callers never walk foreign keys themselves.

use crate::error::Result;
use crate::model::Model;
use crate::query::FindOptions;
use async_trait::async_trait;

/// Key-based access to persisted records.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the first record matching the filter, with the requested relations loaded.
    async fn get<M: Model>(&self, options: FindOptions) -> Result<Option<M>>;

    /// Returns every record matching the filter, ordered by id.
    async fn get_many<M: Model>(&self, options: FindOptions) -> Result<Vec<M>>;

    /// Inserts or replaces a record by id. Only foreign keys of relations are stored.
    async fn save<M: Model>(&self, record: &M) -> Result<()>;

    /// Deletes a record by id. Removing an absent record is a no-op.
    async fn remove<M: Model>(&self, record: &M) -> Result<()>;
}
