//! Change descriptors produced by listeners.
//!
//! A listener reports a `ChangePair`: the delta to apply to the aggregates
//! referenced by the old snapshot and the delta to apply to those referenced by
//! the new one. Either side may be absent.

use hashbrown::HashSet;
use tally_core::model::Video;

/// An owning relation of a video whose aggregate carries an active-video counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationTag {
    /// The video's channel.
    Channel,
    /// The category of the video's channel.
    ChannelCategory,
    /// The video's own category.
    Category,
}

impl RelationTag {
    /// All tags, in the order aggregates are loaded.
    pub const ALL: [RelationTag; 3] = [
        RelationTag::Channel,
        RelationTag::ChannelCategory,
        RelationTag::Category,
    ];

    /// Relation path of the tagged aggregate, relative to a video.
    pub fn path(&self) -> &'static str {
        match self {
            RelationTag::Channel => "channel",
            RelationTag::ChannelCategory => "channel.category",
            RelationTag::Category => "category",
        }
    }

    /// Returns the id of the tagged aggregate referenced by a video.
    ///
    /// The outer `None` means the id cannot be known because the channel is
    /// not loaded; `Some(None)` means the video has no such aggregate.
    pub fn owner_id<'a>(&self, video: &'a Video) -> Option<Option<&'a str>> {
        match self {
            RelationTag::Channel => Some(video.channel.id()),
            RelationTag::ChannelCategory => {
                if video.channel.is_unset() {
                    return Some(None);
                }
                video.channel.get().map(|channel| channel.category.id())
            }
            RelationTag::Category => Some(video.category.id()),
        }
    }
}

/// Set of owning relations.
pub type RelationSet = HashSet<RelationTag>;

/// A signed change to apply to derived counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delta {
    /// Apply the amount to every aggregate.
    Unit(i64),
    /// Apply the amount only to aggregates of the listed relations.
    UnitWithRelations(i64, RelationSet),
}

impl Delta {
    /// Returns the signed amount.
    #[inline]
    pub fn amount(&self) -> i64 {
        match self {
            Delta::Unit(amount) | Delta::UnitWithRelations(amount, _) => *amount,
        }
    }

    /// Returns true if the delta touches the aggregate of the given relation.
    pub fn applies_to(&self, tag: RelationTag) -> bool {
        match self {
            Delta::Unit(_) => true,
            Delta::UnitWithRelations(_, relations) => relations.contains(&tag),
        }
    }
}

/// Deltas for the aggregates of the old and the new snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangePair {
    pub old: Option<Delta>,
    pub new: Option<Delta>,
}

impl ChangePair {
    /// Creates a pair from two optional deltas.
    pub fn new(old: Option<Delta>, new: Option<Delta>) -> Self {
        Self { old, new }
    }

    /// Creates a pair of plain deltas, dropping zero amounts.
    pub fn from_amounts(old: i64, new: i64) -> Self {
        Self {
            old: nonzero(old).map(Delta::Unit),
            new: nonzero(new).map(Delta::Unit),
        }
    }

    /// Returns true if neither side carries a delta.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.old.is_none() && self.new.is_none()
    }
}

fn nonzero(amount: i64) -> Option<i64> {
    (amount != 0).then_some(amount)
}

/// Ids of each owning relation of a video, as far as they are loaded.
pub(crate) fn owner_ids(video: &Video) -> [(RelationTag, Option<Option<&str>>); 3] {
    RelationTag::ALL.map(|tag| (tag, tag.owner_id(video)))
}
