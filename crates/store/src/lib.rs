//! Tally Store - In-memory storage for tally records.
//!
//! This crate provides `MemoryStore`, an implementation of the
//! `tally_core::Store` contract that keeps every table in memory:
//!
//! - Records are persisted detached (relations reduced to foreign keys)
//! - Relation paths such as `videoThumbnail.channel.category` are loaded on read,
//!   including inverse relations
//! - Write failures can be injected to exercise error propagation
//!
//! # Example
//!
//! ```rust
//! use tally_core::model::{Channel, Video};
//! use tally_core::{FindOptions, Relation, Store};
//! use tally_store::MemoryStore;
//!
//! # tokio_test_block_on(async {
//! let store = MemoryStore::new();
//! store.save(&Channel::new("c1")).await.unwrap();
//!
//! let mut video = Video::new("v1");
//! video.channel = Relation::reference("c1");
//! store.save(&video).await.unwrap();
//!
//! let loaded: Video = store
//!     .get(FindOptions::by_id("v1").with_relations(["channel"]))
//!     .await
//!     .unwrap()
//!     .unwrap();
//! assert!(loaded.channel.is_loaded());
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod memory;
mod tables;

pub use memory::MemoryStore;
