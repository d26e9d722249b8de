//! Property-based tests: incrementally maintained counters match a full recount.

mod common;

use common::{hydrate, load_video};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tally_core::model::{
    Channel, ChannelCategory, ChannelNftCollector, NftOwner, OwnedNft, StorageDataObject, Video,
    VideoCategory,
};
use tally_core::{FindOptions, Relation, Store};
use tally_derived::{is_video_active, Managers, MemoryStore};

const VIDEOS: usize = 4;
const CHANNELS: usize = 3;

#[derive(Clone, Debug)]
struct VideoState {
    channel: usize,
    category: Option<usize>,
    public: bool,
    censored: bool,
}

#[derive(Clone, Debug)]
enum VideoOp {
    Upsert(usize, VideoState),
    Delete(usize),
    Accept { video: usize, media: bool, accepted: bool },
    MoveChannel { channel: usize, category: usize },
}

#[derive(Clone, Debug)]
enum NftOp {
    Issue { nft: usize, channel: usize, owner: Option<NftOwner> },
    Transfer { nft: usize, owner: Option<NftOwner> },
    Burn { nft: usize },
}

fn video_state() -> impl Strategy<Value = VideoState> {
    (0..CHANNELS, prop::option::of(0..2usize), any::<bool>(), any::<bool>()).prop_map(
        |(channel, category, public, censored)| VideoState {
            channel,
            category,
            public,
            censored,
        },
    )
}

fn video_op() -> impl Strategy<Value = VideoOp> {
    prop_oneof![
        3 => (0..VIDEOS, video_state()).prop_map(|(video, state)| VideoOp::Upsert(video, state)),
        1 => (0..VIDEOS).prop_map(VideoOp::Delete),
        3 => (0..VIDEOS, any::<bool>(), any::<bool>())
            .prop_map(|(video, media, accepted)| VideoOp::Accept { video, media, accepted }),
        1 => (0..CHANNELS, 0..2usize)
            .prop_map(|(channel, category)| VideoOp::MoveChannel { channel, category }),
    ]
}

fn nft_owner() -> impl Strategy<Value = Option<NftOwner>> {
    prop::option::weighted(
        0.9,
        prop_oneof![
            (0..3usize).prop_map(|i| NftOwner::Member(format!("m{}", i))),
            (0..2usize).prop_map(|i| NftOwner::CuratorGroup(format!("g{}", i))),
        ],
    )
}

fn nft_op() -> impl Strategy<Value = NftOp> {
    prop_oneof![
        (0..4usize, 0..2usize, nft_owner())
            .prop_map(|(nft, channel, owner)| NftOp::Issue { nft, channel, owner }),
        (0..4usize, nft_owner()).prop_map(|(nft, owner)| NftOp::Transfer { nft, owner }),
        (0..4usize).prop_map(|nft| NftOp::Burn { nft }),
    ]
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// Channels `c0` .. `c2` in categories `cc0` / `cc1`, video categories `k0`, `k1`,
/// and one pending thumbnail `t{i}` and media `m{i}` per video.
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for i in 0..CHANNELS {
        let mut channel = Channel::new(format!("c{}", i));
        channel.category = Relation::reference(format!("cc{}", i % 2));
        store.save(&channel).await.unwrap();
    }
    for i in 0..2 {
        store.save(&ChannelCategory::new(format!("cc{}", i))).await.unwrap();
        store.save(&VideoCategory::new(format!("k{}", i))).await.unwrap();
    }
    for i in 0..VIDEOS {
        store.save(&StorageDataObject::new(format!("t{}", i))).await.unwrap();
        store.save(&StorageDataObject::new(format!("m{}", i))).await.unwrap();
    }
    store
}

fn build_video(index: usize, state: &VideoState) -> Video {
    let mut video = Video::new(format!("v{}", index));
    video.is_public = state.public;
    video.is_censored = state.censored;
    video.channel = Relation::reference(format!("c{}", state.channel));
    if let Some(category) = state.category {
        video.category = Relation::reference(format!("k{}", category));
    }
    video.thumbnail_photo = Relation::reference(format!("t{}", index));
    video.media = Relation::reference(format!("m{}", index));
    video
}

async fn apply_video_op(managers: &Managers<MemoryStore>, store: &MemoryStore, op: &VideoOp) {
    match op {
        VideoOp::Upsert(index, state) => {
            let video = hydrate(store, build_video(*index, state)).await;
            if store.find::<Video>(&video.id).await.is_some() {
                managers.videos.on_main_entity_update(&video, None).await.unwrap();
            } else {
                managers.videos.on_main_entity_creation(&video).await.unwrap();
            }
            store.save(&video).await.unwrap();
        }
        VideoOp::Delete(index) => {
            let id = format!("v{}", index);
            if store.find::<Video>(&id).await.is_some() {
                let video = load_video(store, &id).await;
                managers.videos.on_main_entity_deletion(&video).await.unwrap();
                store.remove(&video).await.unwrap();
            }
        }
        VideoOp::Accept { video, media, accepted } => {
            let id = format!("{}{}", if *media { "m" } else { "t" }, video);
            let relations = managers.storage_data_objects.relations().iter().cloned();
            let options = FindOptions::by_id(id).with_relations(relations);
            let mut object = store.get::<StorageDataObject>(options).await.unwrap().unwrap();
            object.is_accepted = *accepted;
            managers.storage_data_objects.on_main_entity_update(&object, None).await.unwrap();
            store.save(&object).await.unwrap();
        }
        VideoOp::MoveChannel { channel, category } => {
            let relations = managers.channels.relations().iter().cloned();
            let options = FindOptions::by_id(format!("c{}", channel)).with_relations(relations);
            let mut channel = store.get::<Channel>(options).await.unwrap().unwrap();
            channel.category = Relation::reference(format!("cc{}", category));
            managers.channels.on_main_entity_update(&channel, None).await.unwrap();
            store.save(&channel).await.unwrap();
        }
    }
}

/// Every counter as maintained, and as recounted from the active videos.
async fn video_counters(store: &MemoryStore) -> (BTreeMap<String, i64>, BTreeMap<String, i64>) {
    let mut maintained = BTreeMap::new();
    let mut recounted = BTreeMap::new();
    for channel in store.all::<Channel>().await {
        maintained.insert(channel.id.clone(), channel.active_videos_counter);
        recounted.insert(channel.id, 0);
    }
    for category in store.all::<ChannelCategory>().await {
        maintained.insert(category.id.clone(), category.active_videos_counter);
        recounted.insert(category.id, 0);
    }
    for category in store.all::<VideoCategory>().await {
        maintained.insert(category.id.clone(), category.active_videos_counter);
        recounted.insert(category.id, 0);
    }

    for stored in store.all::<Video>().await {
        let video = load_video(store, &stored.id).await;
        if !is_video_active(&video) {
            continue;
        }
        let channel = video.channel.get();
        let owners = [
            video.channel.id(),
            channel.and_then(|channel| channel.category.id()),
            video.category.id(),
        ];
        for id in owners.into_iter().flatten() {
            *recounted.entry(id.to_string()).or_default() += 1;
        }
    }
    (maintained, recounted)
}

async fn apply_nft_op(managers: &Managers<MemoryStore>, store: &MemoryStore, op: &NftOp) {
    let (NftOp::Issue { nft, .. } | NftOp::Transfer { nft, .. } | NftOp::Burn { nft }) = op;
    let id = format!("v{}", nft);
    match (op, store.find::<OwnedNft>(&id).await) {
        (NftOp::Issue { channel, owner, .. }, None) => {
            let mut nft = OwnedNft {
                id,
                creator_channel: Relation::reference(format!("c{}", channel)),
                ..OwnedNft::default()
            };
            nft.set_owner(owner.clone());
            managers.video_nfts.on_main_entity_creation(&nft).await.unwrap();
            store.save(&nft).await.unwrap();
        }
        (NftOp::Issue { owner, .. } | NftOp::Transfer { owner, .. }, Some(mut nft)) => {
            nft.set_owner(owner.clone());
            managers.video_nfts.on_main_entity_update(&nft, None).await.unwrap();
            store.save(&nft).await.unwrap();
        }
        (NftOp::Burn { .. }, Some(nft)) => {
            managers.video_nfts.on_main_entity_deletion(&nft).await.unwrap();
            store.remove(&nft).await.unwrap();
        }
        (NftOp::Transfer { .. } | NftOp::Burn { .. }, None) => {}
    }
}

async fn collector_amounts(store: &MemoryStore) -> (BTreeMap<String, i64>, BTreeMap<String, i64>) {
    let maintained = store
        .all::<ChannelNftCollector>()
        .await
        .into_iter()
        .map(|collector| (collector.id, collector.amount))
        .collect();

    let mut recounted = BTreeMap::new();
    for nft in store.all::<OwnedNft>().await {
        if let (Some(channel), Some(owner)) = (nft.creator_channel.id(), nft.owner()) {
            *recounted.entry(ChannelNftCollector::id_for(channel, &owner)).or_default() += 1;
        }
    }
    (maintained, recounted)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Active video counters equal a recount over the final state.
    #[test]
    fn active_video_counters_match_recount(ops in prop::collection::vec(video_op(), 1..40)) {
        let (maintained, recounted) = block_on(async {
            let store = seeded_store().await;
            let managers = Managers::new(store.clone());
            for op in &ops {
                apply_video_op(&managers, &store, op).await;
            }
            video_counters(&store).await
        });
        prop_assert_eq!(maintained, recounted);
    }

    /// Collectors exist exactly for held (channel, owner) pairs, with matching amounts.
    #[test]
    fn collectors_match_recount(ops in prop::collection::vec(nft_op(), 1..40)) {
        let (maintained, recounted) = block_on(async {
            let store = Arc::new(MemoryStore::new());
            let managers = Managers::new(store.clone());
            for op in &ops {
                apply_nft_op(&managers, &store, op).await;
            }
            collector_amounts(&store).await
        });
        prop_assert!(maintained.values().all(|amount| *amount > 0));
        prop_assert_eq!(maintained, recounted);
    }
}
