//! Tally Core - Record model and storage contract for derived counters.
//!
//! This crate provides the foundational types shared by the store and the
//! derived-properties managers:
//!
//! - `model`: Record types (videos, data objects, channels, categories, NFTs, collectors)
//! - `Relation`: A reference to another record, unset, by foreign key, or loaded
//! - `Value`, `Where`, `FindOptions`: Filters and relation paths for lookups
//! - `Store`: The async get / get_many / save / remove contract
//! - `Error`: Error types for storage and counter maintenance
//!
//! # Example
//!
//! ```rust
//! use tally_core::model::{Channel, Video};
//! use tally_core::{Relation, Where};
//!
//! let mut video = Video::new("1");
//! video.is_public = true;
//! video.channel = Channel::new("7").into();
//!
//! assert_eq!(video.channel.id(), Some("7"));
//! assert!(Where::new().eq("channel", "7").matches(&video));
//! assert!(matches!(video.category, Relation::Unset));
//! ```

mod error;
pub mod model;
mod query;
mod relation;
mod store;
mod value;

pub use error::{Error, Result};
pub use model::{Aggregate, Join, Model, RelationMut};
pub use query::{FindOptions, Where};
pub use relation::Relation;
pub use store::Store;
pub use value::Value;
