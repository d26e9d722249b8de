//! Active video detection.
//!
//! A video counts towards the active-video counters of its channel, its
//! channel's category and its own category while it is active. These functions
//! compare two snapshots of a video and describe how those counters move.

use crate::delta::{owner_ids, ChangePair, Delta, RelationSet, RelationTag};
use tally_core::model::{StorageDataObject, Video};
use tally_core::Relation;

/// Returns true if the video is public, not censored, and both its assets are accepted.
///
/// An asset that is missing or not loaded counts as not accepted.
pub fn is_video_active(video: &Video) -> bool {
    video.is_public
        && !video.is_censored
        && is_asset_accepted(&video.thumbnail_photo)
        && is_asset_accepted(&video.media)
}

fn is_asset_accepted(asset: &Relation<StorageDataObject>) -> bool {
    asset.get().map_or(false, |object| object.is_accepted)
}

/// Returns the owning relations whose target changed between two snapshots.
///
/// The channel's category is compared when the channel is loaded on both
/// sides. When the channel changed and either category is unknown, the
/// channel category is included; the executor resolves the actual categories
/// and a move within one category nets out.
pub fn changed_relations(old: &Video, new: &Video) -> RelationSet {
    let mut relations: RelationSet = owner_ids(old)
        .into_iter()
        .zip(owner_ids(new))
        .filter_map(|((tag, old_id), (_, new_id))| match (old_id, new_id) {
            (Some(old_id), Some(new_id)) if old_id != new_id => Some(tag),
            _ => None,
        })
        .collect();

    let channel_category_unknown = RelationTag::ChannelCategory.owner_id(old).is_none()
        || RelationTag::ChannelCategory.owner_id(new).is_none();
    if channel_category_unknown && relations.contains(&RelationTag::Channel) {
        relations.insert(RelationTag::ChannelCategory);
    }
    relations
}

/// Compares two snapshots of a video and describes the counter changes.
///
/// - creation (`old` absent): `+1` for the new owners if the video is active
/// - deletion (`new` absent): `-1` for the old owners if the video was active
/// - activity flipped: a plain `-1` / `+1` on the side that was / is active
/// - active in both: the unit moves from old to new owners, restricted to the
///   relations whose target changed
///
/// Returns `None` when nothing observable changed, and when both snapshots are absent.
pub fn has_video_changed(old: Option<&Video>, new: Option<&Video>) -> Option<ChangePair> {
    let (old, new) = match (old, new) {
        (None, None) => return None,
        (None, Some(new)) => {
            return Some(ChangePair::from_amounts(0, i64::from(is_video_active(new))));
        }
        (Some(old), None) => {
            return Some(ChangePair::from_amounts(-i64::from(is_video_active(old)), 0));
        }
        (Some(old), Some(new)) => (old, new),
    };

    match (is_video_active(old), is_video_active(new)) {
        (false, false) => None,
        (true, true) => {
            let relations = changed_relations(old, new);
            if relations.is_empty() {
                return None;
            }
            Some(ChangePair::new(
                Some(Delta::UnitWithRelations(-1, relations.clone())),
                Some(Delta::UnitWithRelations(1, relations)),
            ))
        }
        (was_active, is_active) => Some(ChangePair::from_amounts(
            -i64::from(was_active),
            i64::from(is_active),
        )),
    }
}
