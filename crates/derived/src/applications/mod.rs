//! Concrete derived properties and the set of managers maintaining them.

pub mod active_video_counters;
pub mod nft_collectors;

use crate::manager::DerivedPropertiesManager;
use active_video_counters::{
    create_channel_manager, create_storage_data_object_manager, create_video_manager,
};
use nft_collectors::create_video_nft_manager;
use std::sync::Arc;
use tally_core::model::{Channel, OwnedNft, StorageDataObject, Video};
use tally_core::Store;
use tracing::debug;

/// One manager per tracked entity type, all bound to the same store.
pub struct Managers<S: Store> {
    pub videos: DerivedPropertiesManager<Video, S>,
    pub channels: DerivedPropertiesManager<Channel, S>,
    pub storage_data_objects: DerivedPropertiesManager<StorageDataObject, S>,
    pub video_nfts: DerivedPropertiesManager<OwnedNft, S>,
    store: Arc<S>,
}

impl<S: Store + 'static> Managers<S> {
    /// Builds and wires every manager for `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            videos: create_video_manager(store.clone()),
            channels: create_channel_manager(store.clone()),
            storage_data_objects: create_storage_data_object_manager(store.clone()),
            video_nfts: create_video_nft_manager(store.clone()),
            store,
        }
    }

    /// Returns the store the managers are bound to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

/// Holds the managers of the current store between processing batches.
///
/// The managers are rebuilt whenever a different store handle is passed in;
/// handles are compared by identity.
pub struct ManagerCache<S: Store> {
    current: Option<Arc<Managers<S>>>,
}

impl<S: Store> Default for ManagerCache<S> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<S: Store + 'static> ManagerCache<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the managers bound to `store`, building them on first use.
    pub fn managers(&mut self, store: &Arc<S>) -> Arc<Managers<S>> {
        if let Some(managers) = &self.current {
            if Arc::ptr_eq(managers.store(), store) {
                return managers.clone();
            }
            debug!("store handle replaced, rebuilding derived property managers");
        }
        let managers = Arc::new(Managers::new(store.clone()));
        self.current = Some(managers.clone());
        managers
    }

    /// Drops the cached managers.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Returns true if managers are cached.
    pub fn is_cached(&self) -> bool {
        self.current.is_some()
    }
}
