//! Content records: videos, their assets, channels and categories.

use super::{Aggregate, Join, Model, RelationMut};
use crate::relation::Relation;
use crate::value::Value;

/// A video published in a channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Video {
    pub id: String,
    pub is_public: bool,
    pub is_censored: bool,
    pub channel: Relation<Channel>,
    pub category: Relation<VideoCategory>,
    pub thumbnail_photo: Relation<StorageDataObject>,
    pub media: Relation<StorageDataObject>,
}

impl Video {
    /// Creates a private, uncensored video without relations.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl Model for Video {
    const TABLE: &'static str = "video";

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.as_str()),
            "isPublic" => Value::from(self.is_public),
            "isCensored" => Value::from(self.is_censored),
            "channel" => Value::from(self.channel.id()),
            "category" => Value::from(self.category.id()),
            "thumbnailPhoto" => Value::from(self.thumbnail_photo.id()),
            "media" => Value::from(self.media.id()),
            _ => return None,
        };
        Some(value)
    }

    fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            is_public: self.is_public,
            is_censored: self.is_censored,
            channel: self.channel.detach(),
            category: self.category.detach(),
            thumbnail_photo: self.thumbnail_photo.detach(),
            media: self.media.detach(),
        }
    }

    fn relation_mut(&mut self, name: &str) -> Option<RelationMut<'_>> {
        match name {
            "channel" => Some(RelationMut::Channel(&mut self.channel, Join::ForeignKey)),
            "category" => Some(RelationMut::VideoCategory(&mut self.category, Join::ForeignKey)),
            "thumbnailPhoto" => Some(RelationMut::StorageDataObject(
                &mut self.thumbnail_photo,
                Join::ForeignKey,
            )),
            "media" => Some(RelationMut::StorageDataObject(&mut self.media, Join::ForeignKey)),
            _ => None,
        }
    }
}

/// A stored data object, used as a video thumbnail or media asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorageDataObject {
    pub id: String,
    pub is_accepted: bool,
    /// Video using this object as thumbnail (inverse of `Video::thumbnail_photo`).
    pub video_thumbnail: Relation<Video>,
    /// Video using this object as media (inverse of `Video::media`).
    pub video_media: Relation<Video>,
}

impl StorageDataObject {
    /// Creates a pending (not accepted) data object.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Creates an accepted data object.
    pub fn accepted(id: impl Into<String>) -> Self {
        Self {
            is_accepted: true,
            ..Self::new(id)
        }
    }
}

impl Model for StorageDataObject {
    const TABLE: &'static str = "storage_data_object";

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.as_str())),
            "isAccepted" => Some(Value::from(self.is_accepted)),
            _ => None,
        }
    }

    fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            is_accepted: self.is_accepted,
            video_thumbnail: Relation::Unset,
            video_media: Relation::Unset,
        }
    }

    fn relation_mut(&mut self, name: &str) -> Option<RelationMut<'_>> {
        match name {
            "videoThumbnail" => Some(RelationMut::Video(
                &mut self.video_thumbnail,
                Join::Inverse("thumbnailPhoto"),
            )),
            "videoMedia" => Some(RelationMut::Video(&mut self.video_media, Join::Inverse("media"))),
            _ => None,
        }
    }
}

/// A channel. Tracks its own active videos and belongs to an optional category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Channel {
    pub id: String,
    pub active_videos_counter: i64,
    pub category: Relation<ChannelCategory>,
}

impl Channel {
    /// Creates a channel without category and with a zero counter.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl Model for Channel {
    const TABLE: &'static str = "channel";

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.as_str()),
            "activeVideosCounter" => Value::from(self.active_videos_counter),
            "category" => Value::from(self.category.id()),
            _ => return None,
        };
        Some(value)
    }

    fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            active_videos_counter: self.active_videos_counter,
            category: self.category.detach(),
        }
    }

    fn relation_mut(&mut self, name: &str) -> Option<RelationMut<'_>> {
        match name {
            "category" => Some(RelationMut::ChannelCategory(&mut self.category, Join::ForeignKey)),
            _ => None,
        }
    }
}

impl Aggregate for Channel {
    fn counter(&self) -> i64 {
        self.active_videos_counter
    }

    fn adjust(&mut self, amount: i64) {
        self.active_videos_counter += amount;
    }
}

macro_rules! counter_category {
    ($(#[$meta:meta])* $name:ident, $table:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub id: String,
            pub active_videos_counter: i64,
        }

        impl $name {
            /// Creates a category with a zero counter.
            pub fn new(id: impl Into<String>) -> Self {
                Self {
                    id: id.into(),
                    active_videos_counter: 0,
                }
            }
        }

        impl Model for $name {
            const TABLE: &'static str = $table;

            fn id(&self) -> &str {
                &self.id
            }

            fn field(&self, name: &str) -> Option<Value> {
                match name {
                    "id" => Some(Value::from(self.id.as_str())),
                    "activeVideosCounter" => Some(Value::from(self.active_videos_counter)),
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

        impl Aggregate for $name {
            fn counter(&self) -> i64 {
                self.active_videos_counter
            }

            fn adjust(&mut self, amount: i64) {
                self.active_videos_counter += amount;
            }
        }
    };
}

counter_category!(
    /// Category a channel belongs to.
    ChannelCategory,
    "channel_category"
);

counter_category!(
    /// Category a video belongs to.
    VideoCategory,
    "video_category"
);
