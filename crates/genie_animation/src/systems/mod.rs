mod emote;
mod input;
mod locomotion;
mod mocap;
mod placement;
mod setup;

pub(crate) use emote::update_emotes;
pub(crate) use input::{interpret_gestures, read_touches};
pub(crate) use locomotion::drive_locomotion;
pub(crate) use mocap::{apply_facial_mocap, apply_spine_mocap, cache_animated_pose};
pub(crate) use placement::{apply_gestures, track_camera_space};
pub(crate) use setup::setup_avatars;

use bevy::{
    ecs::{entity::Entity, system::Query},
    log::debug,
    transform::components::Transform,
};
use genie_animation_core::prelude::fold_root_motion;

use crate::avatar::AvatarRig;

/// Folds the skeleton root's drift into the avatar transform. Returns whether anything was
/// folded.
pub(crate) fn fold_avatar_root_motion(
    avatar: Entity,
    rig: &AvatarRig,
    transforms: &mut Query<&mut Transform>,
) -> bool {
    let Some(root) = rig.skeleton_root else {
        return false;
    };
    let Ok([mut avatar_transform, mut root_transform]) = transforms.get_many_mut([avatar, root])
    else {
        debug!("Avatar {avatar} or its skeleton root has no transform, not folding root motion");
        return false;
    };
    fold_root_motion(&mut avatar_transform, &mut root_transform, rig.rest_offset);
    true
}
