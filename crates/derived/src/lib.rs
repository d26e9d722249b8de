//! Tally Derived - Incremental maintenance of derived counters.
//!
//! This crate keeps denormalized counters consistent with the records they
//! are derived from, as those records are created, updated and deleted:
//!
//! - `detector`: Active video detection and change descriptors for videos
//! - `listener`: Per entity-type change observers
//! - `executor`: Loading, updating and persisting derived aggregates
//! - `manager`: `DerivedPropertiesManager`, driving listeners and executors
//! - `applications`: Active video counters, NFT collectors, and the manager set
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tally_core::model::{Channel, StorageDataObject, Video};
//! use tally_core::{Relation, Store};
//! use tally_derived::{Managers, MemoryStore};
//!
//! # tokio_test_block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! store.save(&Channel::new("c1")).await.unwrap();
//! let managers = Managers::new(store.clone());
//!
//! let mut video = Video::new("v1");
//! video.is_public = true;
//! video.channel = Relation::reference("c1");
//! video.thumbnail_photo = StorageDataObject::accepted("o1").into();
//! video.media = StorageDataObject::accepted("o2").into();
//!
//! managers.videos.on_main_entity_creation(&video).await.unwrap();
//! store.save(&video).await.unwrap();
//!
//! let channel = store.find::<Channel>("c1").await.unwrap();
//! assert_eq!(channel.active_videos_counter, 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod applications;
pub mod delta;
pub mod detector;
pub mod executor;
pub mod listener;
pub mod manager;

pub use applications::{ManagerCache, Managers};
pub use delta::{ChangePair, Delta, RelationSet, RelationTag};
pub use detector::{has_video_changed, is_video_active};
pub use executor::{Derived, Executor, Propagate, Side};
pub use listener::Listener;
pub use manager::DerivedPropertiesManager;

#[cfg(feature = "memory-store")]
pub use tally_store::MemoryStore;
