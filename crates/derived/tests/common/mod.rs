//! Fixtures shared by the integration tests.
//!
//! Helpers follow the mapping layer's order of calls: the manager is notified
//! first, the tracked entity is saved afterwards.

#![allow(dead_code)]

use std::sync::Arc;
use tally_core::model::{Channel, ChannelCategory, StorageDataObject, Video, VideoCategory};
use tally_core::{FindOptions, Relation, Store};
use tally_derived::applications::active_video_counters::VIDEO_RELATIONS_FOR_COUNTERS;
use tally_derived::{Managers, MemoryStore};

/// Store with channels `c1` (category `cc1`) and `c2` (category `cc2`),
/// video categories `k1`, `k2`, and accepted objects `o1` .. `o4`.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (channel, category) in [("c1", "cc1"), ("c2", "cc2")] {
        let mut record = Channel::new(channel);
        record.category = Relation::reference(category);
        store.save(&record).await.unwrap();
        store.save(&ChannelCategory::new(category)).await.unwrap();
    }
    for category in ["k1", "k2"] {
        store.save(&VideoCategory::new(category)).await.unwrap();
    }
    for object in ["o1", "o2", "o3", "o4"] {
        store.save(&StorageDataObject::accepted(object)).await.unwrap();
    }
    store
}

/// A public, uncensored video referencing its owners and assets by id.
pub fn video(id: &str, channel: &str, category: &str, thumbnail: &str, media: &str) -> Video {
    let mut video = Video::new(id);
    video.is_public = true;
    video.channel = Relation::reference(channel);
    video.category = Relation::reference(category);
    video.thumbnail_photo = Relation::reference(thumbnail);
    video.media = Relation::reference(media);
    video
}

/// Loads a video with every relation the counters depend on.
pub async fn load_video(store: &MemoryStore, id: &str) -> Video {
    let relations = VIDEO_RELATIONS_FOR_COUNTERS.iter().copied();
    let options = FindOptions::by_id(id).with_relations(relations);
    store.get::<Video>(options).await.unwrap().unwrap()
}

/// Replaces the id references of a video with the stored records.
pub async fn hydrate(store: &MemoryStore, mut video: Video) -> Video {
    if let Some(id) = video.channel.id().map(str::to_owned) {
        let options = FindOptions::by_id(id).with_relations(["category"]);
        if let Some(channel) = store.get::<Channel>(options).await.unwrap() {
            video.channel = channel.into();
        }
    }
    if let Some(id) = video.category.id().map(str::to_owned) {
        if let Some(category) = store.find::<VideoCategory>(&id).await {
            video.category = category.into();
        }
    }
    for slot in [&mut video.thumbnail_photo, &mut video.media] {
        if let Some(id) = slot.id().map(str::to_owned) {
            if let Some(object) = store.find::<StorageDataObject>(&id).await {
                *slot = object.into();
            }
        }
    }
    video
}

/// Notifies the managers of a new video, then saves it.
pub async fn publish(managers: &Managers<MemoryStore>, store: &MemoryStore, video: Video) -> Video {
    let video = hydrate(store, video).await;
    managers.videos.on_main_entity_creation(&video).await.unwrap();
    store.save(&video).await.unwrap();
    video
}

/// Notifies the managers of an updated video, then saves it.
pub async fn update(managers: &Managers<MemoryStore>, store: &MemoryStore, video: &Video) {
    managers.videos.on_main_entity_update(video, None).await.unwrap();
    store.save(video).await.unwrap();
}

pub async fn channel_counter(store: &MemoryStore, id: &str) -> i64 {
    store.find::<Channel>(id).await.unwrap().active_videos_counter
}

pub async fn channel_category_counter(store: &MemoryStore, id: &str) -> i64 {
    store.find::<ChannelCategory>(id).await.unwrap().active_videos_counter
}

pub async fn video_category_counter(store: &MemoryStore, id: &str) -> i64 {
    store.find::<VideoCategory>(id).await.unwrap().active_videos_counter
}

/// Active video counters of `c1`, `c2`, `cc1`, `cc2`, `k1` and `k2`.
pub async fn all_counters(store: &MemoryStore) -> [i64; 6] {
    [
        channel_counter(store, "c1").await,
        channel_counter(store, "c2").await,
        channel_category_counter(store, "cc1").await,
        channel_category_counter(store, "cc2").await,
        video_category_counter(store, "k1").await,
        video_category_counter(store, "k2").await,
    ]
}
