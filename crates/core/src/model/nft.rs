//! NFT ownership records and per-owner collector aggregates.

use super::{Aggregate, Channel, Join, Model, RelationMut};
use crate::relation::Relation;
use crate::value::Value;

/// A member account.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Membership {
    pub id: String,
}

impl Membership {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Model for Membership {
    const TABLE: &'static str = "membership";

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.as_str())),
            _ => None,
        }
    }

    fn detached(&self) -> Self {
        self.clone()
    }

    fn relation_mut(&mut self, _name: &str) -> Option<RelationMut<'_>> {
        None
    }
}

/// A curator group owning channel NFTs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CuratorGroup {
    pub id: String,
}

impl CuratorGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Model for CuratorGroup {
    const TABLE: &'static str = "curator_group";

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.as_str())),
            _ => None,
        }
    }

    fn detached(&self) -> Self {
        self.clone()
    }

    fn relation_mut(&mut self, _name: &str) -> Option<RelationMut<'_>> {
        None
    }
}

/// Holder of an NFT: a member or a curator group.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NftOwner {
    Member(String),
    CuratorGroup(String),
}

impl NftOwner {
    /// Stable key used in collector ids.
    pub fn key(&self) -> String {
        match self {
            NftOwner::Member(id) => format!("member-{}", id),
            NftOwner::CuratorGroup(id) => format!("group-{}", id),
        }
    }
}

/// Ownership record of a video NFT. Shares its id with the video.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnedNft {
    pub id: String,
    pub is_owned_by_channel: bool,
    pub owner_member: Relation<Membership>,
    pub owner_curator_group: Relation<CuratorGroup>,
    pub creator_channel: Relation<Channel>,
}

impl OwnedNft {
    /// Creates an NFT issued in `channel_id` and held by `owner`.
    pub fn new(id: impl Into<String>, channel_id: impl Into<String>, owner: NftOwner) -> Self {
        let mut nft = Self {
            id: id.into(),
            creator_channel: Relation::reference(channel_id),
            ..Self::default()
        };
        nft.set_owner(Some(owner));
        nft
    }

    /// Returns the current holder. A member takes precedence over a curator group.
    pub fn owner(&self) -> Option<NftOwner> {
        if let Some(id) = self.owner_member.id() {
            return Some(NftOwner::Member(id.into()));
        }
        self.owner_curator_group
            .id()
            .map(|id| NftOwner::CuratorGroup(id.into()))
    }

    /// Replaces the holder.
    pub fn set_owner(&mut self, owner: Option<NftOwner>) {
        self.owner_member = Relation::Unset;
        self.owner_curator_group = Relation::Unset;
        match owner {
            Some(NftOwner::Member(id)) => self.owner_member = Relation::reference(id),
            Some(NftOwner::CuratorGroup(id)) => self.owner_curator_group = Relation::reference(id),
            None => {}
        }
    }
}

impl Model for OwnedNft {
    const TABLE: &'static str = "owned_nft";

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.as_str()),
            "isOwnedByChannel" => Value::from(self.is_owned_by_channel),
            "ownerMember" => Value::from(self.owner_member.id()),
            "ownerCuratorGroup" => Value::from(self.owner_curator_group.id()),
            "creatorChannel" => Value::from(self.creator_channel.id()),
            _ => return None,
        };
        Some(value)
    }

    fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            is_owned_by_channel: self.is_owned_by_channel,
            owner_member: self.owner_member.detach(),
            owner_curator_group: self.owner_curator_group.detach(),
            creator_channel: self.creator_channel.detach(),
        }
    }

    fn relation_mut(&mut self, name: &str) -> Option<RelationMut<'_>> {
        match name {
            "ownerMember" => Some(RelationMut::Membership(
                &mut self.owner_member,
                Join::ForeignKey,
            )),
            "ownerCuratorGroup" => Some(RelationMut::CuratorGroup(
                &mut self.owner_curator_group,
                Join::ForeignKey,
            )),
            "creatorChannel" => Some(RelationMut::Channel(
                &mut self.creator_channel,
                Join::ForeignKey,
            )),
            _ => None,
        }
    }
}

/// Number of NFTs issued in a channel that are held by one owner.
///
/// Exists in storage only while `amount > 0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelNftCollector {
    pub id: String,
    pub channel: Relation<Channel>,
    pub member: Relation<Membership>,
    pub curator_group: Relation<CuratorGroup>,
    pub amount: i64,
}

impl ChannelNftCollector {
    /// Creates an empty collector for `(channel, owner)`.
    pub fn new(channel_id: &str, owner: &NftOwner) -> Self {
        let mut collector = Self {
            id: Self::id_for(channel_id, owner),
            channel: Relation::reference(channel_id),
            ..Self::default()
        };
        match owner {
            NftOwner::Member(id) => collector.member = Relation::reference(id.as_str()),
            NftOwner::CuratorGroup(id) => {
                collector.curator_group = Relation::reference(id.as_str())
            }
        }
        collector
    }

    /// Deterministic id of the collector for `(channel, owner)`.
    ///
    /// The channel id is length-prefixed so distinct pairs never share an id.
    pub fn id_for(channel_id: &str, owner: &NftOwner) -> String {
        format!("{}:{}-{}", channel_id.len(), channel_id, owner.key())
    }
}

impl Model for ChannelNftCollector {
    const TABLE: &'static str = "channel_nft_collector";

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.as_str()),
            "channel" => Value::from(self.channel.id()),
            "member" => Value::from(self.member.id()),
            "curatorGroup" => Value::from(self.curator_group.id()),
            "amount" => Value::from(self.amount),
            _ => return None,
        };
        Some(value)
    }

    fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            channel: self.channel.detach(),
            member: self.member.detach(),
            curator_group: self.curator_group.detach(),
            amount: self.amount,
        }
    }

    fn relation_mut(&mut self, name: &str) -> Option<RelationMut<'_>> {
        match name {
            "channel" => Some(RelationMut::Channel(&mut self.channel, Join::ForeignKey)),
            "member" => Some(RelationMut::Membership(&mut self.member, Join::ForeignKey)),
            "curatorGroup" => Some(RelationMut::CuratorGroup(
                &mut self.curator_group,
                Join::ForeignKey,
            )),
            _ => None,
        }
    }
}

impl Aggregate for ChannelNftCollector {
    fn counter(&self) -> i64 {
        self.amount
    }

    fn adjust(&mut self, amount: i64) {
        self.amount += amount;
    }

    fn should_persist(&self) -> bool {
        self.amount > 0
    }
}
