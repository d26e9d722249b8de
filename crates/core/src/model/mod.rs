//! Record model of the read store.
//!
//! Every record type implements `Model`, which is the only surface a `Store`
//! needs: a table name, a stable id, field values for filtering, and access to
//! named relations for loading relation paths. Records holding derived
//! counters additionally implement `Aggregate`.

mod content;
mod nft;

pub use content::{Channel, ChannelCategory, StorageDataObject, Video, VideoCategory};
pub use nft::{ChannelNftCollector, CuratorGroup, Membership, NftOwner, OwnedNft};

use crate::relation::Relation;
use crate::value::Value;
use core::fmt::Debug;

/// A record type persisted in a store.
pub trait Model: Clone + Debug + Send + Sync + 'static {
    /// Table name.
    const TABLE: &'static str;

    /// Returns the record id.
    fn id(&self) -> &str;

    /// Returns the value of a filterable field, or None if the field does not exist.
    ///
    /// Relation fields yield the foreign key of the related record, or
    /// `Value::Null` when unset.
    fn field(&self, name: &str) -> Option<Value>;

    /// Returns a copy with every loaded relation reduced to what is persisted.
    fn detached(&self) -> Self;

    /// Returns the named relation for loading, or None if it does not exist.
    fn relation_mut(&mut self, name: &str) -> Option<RelationMut<'_>>;
}

/// A record holding a counter derived from other records.
pub trait Aggregate: Model {
    /// Returns the current counter value.
    fn counter(&self) -> i64;

    /// Adds a signed amount to the counter.
    fn adjust(&mut self, amount: i64);

    /// Decides whether a record with the current counter belongs in storage.
    fn should_persist(&self) -> bool {
        true
    }
}

/// How a relation's target is located.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Join {
    /// The foreign key lives on the owning record.
    ForeignKey,
    /// The target holds a foreign key to the owning record in the named field.
    Inverse(&'static str),
}

/// Mutable access to a named relation, tagged by target type.
pub enum RelationMut<'a> {
    Video(&'a mut Relation<Video>, Join),
    Channel(&'a mut Relation<Channel>, Join),
    ChannelCategory(&'a mut Relation<ChannelCategory>, Join),
    VideoCategory(&'a mut Relation<VideoCategory>, Join),
    StorageDataObject(&'a mut Relation<StorageDataObject>, Join),
    Membership(&'a mut Relation<Membership>, Join),
    CuratorGroup(&'a mut Relation<CuratorGroup>, Join),
}

impl RelationMut<'_> {
    /// Returns how the relation's target is located.
    pub fn join(&self) -> Join {
        match self {
            RelationMut::Video(_, join)
            | RelationMut::Channel(_, join)
            | RelationMut::ChannelCategory(_, join)
            | RelationMut::VideoCategory(_, join)
            | RelationMut::StorageDataObject(_, join)
            | RelationMut::Membership(_, join)
            | RelationMut::CuratorGroup(_, join) => *join,
        }
    }
}
