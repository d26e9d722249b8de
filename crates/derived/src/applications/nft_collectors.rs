//! Per-owner NFT collector records.
//!
//! A `ChannelNftCollector` counts the NFTs issued in one channel that are held
//! by one member or curator group. It exists only while that count is
//! positive.

use crate::delta::{ChangePair, Delta};
use crate::executor::{persist_all, Derived, Executor, Propagate};
use crate::listener::Listener;
use crate::manager::DerivedPropertiesManager;
use async_trait::async_trait;
use std::sync::Arc;
use tally_core::model::{ChannelNftCollector, NftOwner, OwnedNft};
use tally_core::{Aggregate, FindOptions, Result, Store, Value, Where};
use tracing::trace;

/// Channel the NFT was issued in and its current holder, when both are known.
fn holder(nft: &OwnedNft) -> Option<(&str, NftOwner)> {
    Some((nft.creator_channel.id()?, nft.owner()?))
}

/// Observes NFT ownership transfers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NftOwnershipListener;

impl Listener<OwnedNft> for NftOwnershipListener {
    fn relation_dependencies(&self) -> &'static [&'static str] {
        &["ownerMember", "ownerCuratorGroup", "creatorChannel"]
    }

    fn has_value_changed(
        &self,
        old: Option<&OwnedNft>,
        new: Option<&OwnedNft>,
    ) -> Option<ChangePair> {
        let old = old.and_then(holder);
        let new = new.and_then(holder);
        if old == new {
            return None;
        }
        Some(ChangePair::new(
            old.map(|_| Delta::Unit(-1)),
            new.map(|_| Delta::Unit(1)),
        ))
    }
}

/// Keeps the collector of the NFT's holder in its channel up to date.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelNftCollectorExecutor;

impl ChannelNftCollectorExecutor {
    /// Filter selecting the collector of `owner` in `channel_id`.
    pub fn collector_filter(channel_id: &str, owner: &NftOwner) -> Where {
        let filter = Where::new().eq("channel", channel_id);
        match owner {
            NftOwner::Member(id) => {
                filter.eq("member", id.as_str()).eq("curatorGroup", Value::Null)
            }
            NftOwner::CuratorGroup(id) => {
                filter.eq("curatorGroup", id.as_str()).eq("member", Value::Null)
            }
        }
    }
}

#[async_trait]
impl Executor for ChannelNftCollectorExecutor {
    type Entity = OwnedNft;
    type Derived = ChannelNftCollector;

    async fn load_derived_entities<S: Store>(
        &self,
        store: &S,
        nft: &OwnedNft,
    ) -> Result<Vec<Derived<ChannelNftCollector>>> {
        let Some((channel_id, owner)) = holder(nft) else {
            return Ok(Vec::new());
        };
        let filter = Self::collector_filter(channel_id, &owner);
        let collector = match store.get::<ChannelNftCollector>(FindOptions::new(filter)).await? {
            Some(collector) => Derived::persisted(collector),
            None => {
                trace!(channel = channel_id, ?owner, "new collector");
                Derived::new(ChannelNftCollector::new(channel_id, &owner))
            }
        };
        Ok(vec![collector])
    }

    fn update_old_value(
        &self,
        mut derived: ChannelNftCollector,
        change: &Delta,
    ) -> ChannelNftCollector {
        derived.adjust(change.amount());
        derived
    }

    fn update_new_value(
        &self,
        mut derived: ChannelNftCollector,
        change: &Delta,
    ) -> ChannelNftCollector {
        derived.adjust(change.amount());
        derived
    }

    async fn save_derived_entities<S: Store>(
        &self,
        store: &S,
        derived: Vec<Derived<ChannelNftCollector>>,
    ) -> Result<()> {
        persist_all(store, &derived).await
    }
}

/// Creates the manager keeping collectors in sync with NFT ownership.
pub fn create_video_nft_manager<S: Store + 'static>(
    store: Arc<S>,
) -> DerivedPropertiesManager<OwnedNft, S> {
    let mut manager = DerivedPropertiesManager::new(store);
    let executors: Vec<Box<dyn Propagate<OwnedNft, S>>> =
        vec![Box::new(ChannelNftCollectorExecutor)];
    manager.register_listener(NftOwnershipListener, executors);
    manager
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Relation;
    use tally_store::MemoryStore;

    fn member_nft(member: &str) -> OwnedNft {
        OwnedNft::new("v1", "c1", NftOwner::Member(member.into()))
    }

    #[test]
    fn test_listener_transfer() {
        let listener = NftOwnershipListener;
        let old = member_nft("m1");
        let new = member_nft("m2");

        let change = listener.has_value_changed(Some(&old), Some(&new)).unwrap();
        assert_eq!(change, ChangePair::new(Some(Delta::Unit(-1)), Some(Delta::Unit(1))));
        assert_eq!(listener.has_value_changed(Some(&old), Some(&old)), None);
    }

    #[test]
    fn test_listener_member_over_group() {
        let listener = NftOwnershipListener;
        let old = member_nft("m1");
        let mut new = old.clone();
        new.owner_curator_group = Relation::reference("g1");
        assert_eq!(listener.has_value_changed(Some(&old), Some(&new)), None);
    }

    #[test]
    fn test_listener_without_holder() {
        let listener = NftOwnershipListener;
        let mut unowned = member_nft("m1");
        unowned.set_owner(None);
        assert_eq!(listener.has_value_changed(None, Some(&unowned)), None);

        let change = listener.has_value_changed(Some(&member_nft("m1")), Some(&unowned)).unwrap();
        assert_eq!(change, ChangePair::new(Some(Delta::Unit(-1)), None));
    }

    #[test]
    fn test_collector_filter() {
        let member = ChannelNftCollector::new("c1", &NftOwner::Member("7".into()));
        let group = ChannelNftCollector::new("c1", &NftOwner::CuratorGroup("7".into()));

        let owner = NftOwner::Member("7".into());
        let filter = ChannelNftCollectorExecutor::collector_filter("c1", &owner);
        assert!(filter.matches(&member));
        assert!(!filter.matches(&group));
    }

    #[tokio::test]
    async fn test_executor_constructs_missing_collector() {
        let store = MemoryStore::new();
        let derived = ChannelNftCollectorExecutor
            .load_derived_entities(&store, &member_nft("m1"))
            .await
            .unwrap();
        assert_eq!(derived.len(), 1);
        assert!(!derived[0].persisted);
        assert_eq!(derived[0].entity.amount, 0);
        assert_eq!(derived[0].entity.member.id(), Some("m1"));
    }

    #[tokio::test]
    async fn test_executor_finds_existing_collector() {
        let store = MemoryStore::new();
        let mut collector = ChannelNftCollector::new("c1", &NftOwner::Member("m1".into()));
        collector.amount = 2;
        store.save(&collector).await.unwrap();

        let derived = ChannelNftCollectorExecutor
            .load_derived_entities(&store, &member_nft("m1"))
            .await
            .unwrap();
        assert!(derived[0].persisted);
        assert_eq!(derived[0].entity.amount, 2);
    }
}
