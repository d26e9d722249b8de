//! In-memory `Store` implementation.

use crate::tables::Tables;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tally_core::{Error, FindOptions, Model, Result, Store};
use tokio::sync::RwLock;
use tracing::trace;

/// A store keeping every table in memory.
///
/// Writes can be made to fail on demand with [`MemoryStore::fail_writes`],
/// and successful writes are counted by [`MemoryStore::write_count`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` and `remove` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of successful `save` and `remove` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the number of records in the table of `M`.
    pub async fn count<M: Model>(&self) -> usize {
        self.tables.read().await.len::<M>()
    }

    /// Returns the persisted form of a record, without relations loaded.
    pub async fn find<M: Model>(&self, id: &str) -> Option<M> {
        self.tables.read().await.get::<M>(id).cloned()
    }

    /// Returns every persisted record of `M`, ordered by id.
    pub async fn all<M: Model>(&self) -> Vec<M> {
        self.tables.read().await.rows::<M>().cloned().collect()
    }

    fn check_writable<M: Model>(&self, op: &str, id: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::storage(format!("{} rejected for {} {}", op, M::TABLE, id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get<M: Model>(&self, options: FindOptions) -> Result<Option<M>> {
        let records = self.tables.read().await.select::<M>(&options, Some(1))?;
        Ok(records.into_iter().next())
    }

    async fn get_many<M: Model>(&self, options: FindOptions) -> Result<Vec<M>> {
        self.tables.read().await.select::<M>(&options, None)
    }

    async fn save<M: Model>(&self, record: &M) -> Result<()> {
        self.check_writable::<M>("save", record.id())?;
        self.tables.write().await.upsert(record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        trace!(table = M::TABLE, id = record.id(), "saved");
        Ok(())
    }

    async fn remove<M: Model>(&self, record: &M) -> Result<()> {
        self.check_writable::<M>("remove", record.id())?;
        let existed = self.tables.write().await.delete::<M>(record.id());
        self.writes.fetch_add(1, Ordering::SeqCst);
        trace!(table = M::TABLE, id = record.id(), existed, "removed");
        Ok(())
    }
}
