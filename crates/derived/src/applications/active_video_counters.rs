//! Active video counters of channels, channel categories and video categories.
//!
//! Three managers keep the counters in sync:
//!
//! - the video manager reacts to videos being published, hidden, censored,
//!   removed or moved to another channel or category
//! - the storage data object manager reacts to a thumbnail or media asset
//!   being accepted or removed
//! - the channel manager moves a channel's whole counter when the channel is
//!   assigned to another category

use crate::delta::{ChangePair, Delta, RelationTag};
use crate::detector::has_video_changed;
use crate::executor::{persist_all, persist_record, resolve, Derived, Executor, Propagate};
use crate::listener::Listener;
use crate::manager::DerivedPropertiesManager;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tally_core::model::{Channel, ChannelCategory, StorageDataObject, Video, VideoCategory};
use tally_core::{Aggregate, Model, Relation, Result, Store};

/// Relations a video is loaded with before its counters are updated.
pub const VIDEO_RELATIONS_FOR_COUNTERS: &[&str] = &[
    "channel",
    "channel.category",
    "category",
    "thumbnailPhoto",
    "media",
];

/// Observes videos directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct VideoUpdateListener;

impl Listener<Video> for VideoUpdateListener {
    fn relation_dependencies(&self) -> &'static [&'static str] {
        &["thumbnailPhoto", "media", "channel", "channel.category"]
    }

    fn has_value_changed(&self, old: Option<&Video>, new: Option<&Video>) -> Option<ChangePair> {
        has_video_changed(old, new)
    }
}

/// Slot a data object fills on its video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetRole {
    ThumbnailPhoto,
    Media,
}

impl AssetRole {
    /// Returns the video using the object in this role, if loaded.
    pub fn video(self, object: &StorageDataObject) -> Option<&Video> {
        match self {
            AssetRole::ThumbnailPhoto => object.video_thumbnail.get(),
            AssetRole::Media => object.video_media.get(),
        }
    }

    fn slot(self, video: &mut Video) -> &mut Relation<StorageDataObject> {
        match self {
            AssetRole::ThumbnailPhoto => &mut video.thumbnail_photo,
            AssetRole::Media => &mut video.media,
        }
    }

    fn adapter(self) -> fn(&StorageDataObject) -> Option<&Video> {
        match self {
            AssetRole::ThumbnailPhoto => thumbnail_video,
            AssetRole::Media => media_video,
        }
    }
}

fn thumbnail_video(object: &StorageDataObject) -> Option<&Video> {
    object.video_thumbnail.get()
}

fn media_video(object: &StorageDataObject) -> Option<&Video> {
    object.video_media.get()
}

fn video_itself(video: &Video) -> Option<&Video> {
    Some(video)
}

/// Observes the data objects a video uses in one role.
///
/// The owning video is read through the object's back-reference. Its copy of
/// the asset is replaced by the observed object, so the comparison sees the
/// object's own acceptance flag rather than a copy loaded with the video.
#[derive(Clone, Copy, Debug)]
pub struct StorageDataObjectListener {
    role: AssetRole,
}

impl StorageDataObjectListener {
    pub fn new(role: AssetRole) -> Self {
        Self { role }
    }

    pub fn role(&self) -> AssetRole {
        self.role
    }

    fn owning_video(&self, object: &StorageDataObject) -> Option<Video> {
        let mut video = self.role.video(object)?.clone();
        *self.role.slot(&mut video) = Relation::with(object.detached());
        Some(video)
    }
}

impl Listener<StorageDataObject> for StorageDataObjectListener {
    fn relation_dependencies(&self) -> &'static [&'static str] {
        match self.role {
            AssetRole::ThumbnailPhoto => &[
                "videoThumbnail",
                "videoThumbnail.thumbnailPhoto",
                "videoThumbnail.media",
                "videoThumbnail.category",
                "videoThumbnail.channel",
                "videoThumbnail.channel.category",
            ],
            AssetRole::Media => &[
                "videoMedia",
                "videoMedia.thumbnailPhoto",
                "videoMedia.media",
                "videoMedia.category",
                "videoMedia.channel",
                "videoMedia.channel.category",
            ],
        }
    }

    fn has_value_changed(
        &self,
        old: Option<&StorageDataObject>,
        new: Option<&StorageDataObject>,
    ) -> Option<ChangePair> {
        let old = old.and_then(|object| self.owning_video(object));
        let new = new.and_then(|object| self.owning_video(object));
        has_video_changed(old.as_ref(), new.as_ref())
    }
}

/// An aggregate carrying an active video counter.
#[derive(Clone, Debug, PartialEq)]
pub enum CounterOwner {
    Channel(Channel),
    ChannelCategory(ChannelCategory),
    VideoCategory(VideoCategory),
}

impl CounterOwner {
    /// Relation of the video this aggregate is reached through.
    pub fn tag(&self) -> RelationTag {
        match self {
            CounterOwner::Channel(_) => RelationTag::Channel,
            CounterOwner::ChannelCategory(_) => RelationTag::ChannelCategory,
            CounterOwner::VideoCategory(_) => RelationTag::Category,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CounterOwner::Channel(channel) => channel.id(),
            CounterOwner::ChannelCategory(category) => category.id(),
            CounterOwner::VideoCategory(category) => category.id(),
        }
    }

    pub fn counter(&self) -> i64 {
        match self {
            CounterOwner::Channel(channel) => channel.counter(),
            CounterOwner::ChannelCategory(category) => category.counter(),
            CounterOwner::VideoCategory(category) => category.counter(),
        }
    }

    pub fn adjust(&mut self, amount: i64) {
        match self {
            CounterOwner::Channel(channel) => channel.adjust(amount),
            CounterOwner::ChannelCategory(category) => category.adjust(amount),
            CounterOwner::VideoCategory(category) => category.adjust(amount),
        }
    }
}

/// Updates the counters of the channel, channel category and category of a video.
///
/// The video is taken from the tracked entity through an adapter, so the same
/// executor serves the video manager and the data object manager.
pub struct ActiveVideoCounterExecutor<E> {
    adapter: fn(&E) -> Option<&Video>,
}

impl<E> ActiveVideoCounterExecutor<E> {
    pub fn new(adapter: fn(&E) -> Option<&Video>) -> Self {
        Self { adapter }
    }
}

impl ActiveVideoCounterExecutor<Video> {
    /// Executor for the video manager.
    pub fn for_videos() -> Self {
        Self::new(video_itself)
    }
}

impl ActiveVideoCounterExecutor<StorageDataObject> {
    /// Executor for data objects used by a video in `role`.
    pub fn for_assets(role: AssetRole) -> Self {
        Self::new(role.adapter())
    }
}

#[async_trait]
impl<E: Model> Executor for ActiveVideoCounterExecutor<E> {
    type Entity = E;
    type Derived = CounterOwner;

    async fn load_derived_entities<S: Store>(
        &self,
        store: &S,
        entity: &E,
    ) -> Result<Vec<Derived<CounterOwner>>> {
        let Some(video) = (self.adapter)(entity) else {
            return Ok(Vec::new());
        };
        let mut derived = Vec::with_capacity(RelationTag::ALL.len());

        let channel = match video.channel.id() {
            Some(id) => resolve::<S, Channel>(store, id, video.channel.get()).await?,
            None => None,
        };
        // category of the channel as loaded with the video, else as stored
        let channel_category_id = video
            .channel
            .get()
            .and_then(|channel| channel.category.id())
            .or_else(|| channel.as_ref().and_then(|channel| channel.entity.category.id()))
            .map(str::to_owned);
        let carried_channel_category = video
            .channel
            .get()
            .and_then(|channel| channel.category.get());
        if let Some(channel) = channel {
            derived.push(channel.map(CounterOwner::Channel));
        }

        if let Some(id) = channel_category_id {
            if let Some(category) = resolve(store, &id, carried_channel_category).await? {
                derived.push(category.map(CounterOwner::ChannelCategory));
            }
        }

        if let Some(id) = video.category.id() {
            if let Some(category) = resolve(store, id, video.category.get()).await? {
                derived.push(category.map(CounterOwner::VideoCategory));
            }
        }
        Ok(derived)
    }

    fn is_affected(&self, derived: &CounterOwner, change: &Delta) -> bool {
        change.applies_to(derived.tag())
    }

    fn update_old_value(&self, mut derived: CounterOwner, change: &Delta) -> CounterOwner {
        derived.adjust(change.amount());
        derived
    }

    fn update_new_value(&self, mut derived: CounterOwner, change: &Delta) -> CounterOwner {
        derived.adjust(change.amount());
        derived
    }

    async fn save_derived_entities<S: Store>(
        &self,
        store: &S,
        derived: Vec<Derived<CounterOwner>>,
    ) -> Result<()> {
        try_join_all(derived.iter().map(|derived| async move {
            match &derived.entity {
                CounterOwner::Channel(channel) => {
                    persist_record(store, channel, derived.persisted).await
                }
                CounterOwner::ChannelCategory(category) => {
                    persist_record(store, category, derived.persisted).await
                }
                CounterOwner::VideoCategory(category) => {
                    persist_record(store, category, derived.persisted).await
                }
            }
        }))
        .await?;
        Ok(())
    }
}

/// Observes channels being assigned to another category.
///
/// Reports the channel's whole counter: removed from the old category and
/// added to the new one. A channel keeping its category reports nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelCategoryChangeListener;

impl Listener<Channel> for ChannelCategoryChangeListener {
    fn relation_dependencies(&self) -> &'static [&'static str] {
        &["category"]
    }

    fn has_value_changed(
        &self,
        old: Option<&Channel>,
        new: Option<&Channel>,
    ) -> Option<ChangePair> {
        if let (Some(old), Some(new)) = (old, new) {
            if old.category.id() == new.category.id() {
                return None;
            }
        }
        let change = ChangePair::from_amounts(
            -old.map_or(0, |channel| channel.active_videos_counter),
            new.map_or(0, |channel| channel.active_videos_counter),
        );
        (!change.is_empty()).then_some(change)
    }
}

/// Applies a channel's counter to its category.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelCategoryActiveVideoCounterExecutor;

#[async_trait]
impl Executor for ChannelCategoryActiveVideoCounterExecutor {
    type Entity = Channel;
    type Derived = ChannelCategory;

    async fn load_derived_entities<S: Store>(
        &self,
        store: &S,
        channel: &Channel,
    ) -> Result<Vec<Derived<ChannelCategory>>> {
        let Some(id) = channel.category.id() else {
            return Ok(Vec::new());
        };
        Ok(resolve(store, id, channel.category.get()).await?.into_iter().collect())
    }

    fn update_old_value(&self, mut derived: ChannelCategory, change: &Delta) -> ChannelCategory {
        derived.adjust(change.amount());
        derived
    }

    fn update_new_value(&self, mut derived: ChannelCategory, change: &Delta) -> ChannelCategory {
        derived.adjust(change.amount());
        derived
    }

    async fn save_derived_entities<S: Store>(
        &self,
        store: &S,
        derived: Vec<Derived<ChannelCategory>>,
    ) -> Result<()> {
        persist_all(store, &derived).await
    }
}

/// Creates the manager keeping counters in sync with videos.
pub fn create_video_manager<S: Store + 'static>(
    store: Arc<S>,
) -> DerivedPropertiesManager<Video, S> {
    let mut manager =
        DerivedPropertiesManager::with_relations(store, VIDEO_RELATIONS_FOR_COUNTERS);
    let executors: Vec<Box<dyn Propagate<Video, S>>> =
        vec![Box::new(ActiveVideoCounterExecutor::for_videos())];
    manager.register_listener(VideoUpdateListener, executors);
    manager
}

/// Creates the manager moving channel counters between channel categories.
pub fn create_channel_manager<S: Store + 'static>(
    store: Arc<S>,
) -> DerivedPropertiesManager<Channel, S> {
    let mut manager = DerivedPropertiesManager::new(store);
    let executors: Vec<Box<dyn Propagate<Channel, S>>> =
        vec![Box::new(ChannelCategoryActiveVideoCounterExecutor)];
    manager.register_listener(ChannelCategoryChangeListener, executors);
    manager
}

/// Creates the manager keeping counters in sync with video assets.
pub fn create_storage_data_object_manager<S: Store + 'static>(
    store: Arc<S>,
) -> DerivedPropertiesManager<StorageDataObject, S> {
    let mut manager = DerivedPropertiesManager::new(store);
    for role in [AssetRole::ThumbnailPhoto, AssetRole::Media] {
        let executors: Vec<Box<dyn Propagate<StorageDataObject, S>>> =
            vec![Box::new(ActiveVideoCounterExecutor::for_assets(role))];
        manager.register_listener(StorageDataObjectListener::new(role), executors);
    }
    manager
}
