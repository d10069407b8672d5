use bevy::{
    ecs::{
        message::{MessageReader, MessageWriter},
        query::With,
        system::{Local, Query, Res},
    },
    log::debug,
    time::Time,
    transform::components::Transform,
};
use genie_animation_core::{
    placement::face_camera,
    prelude::{CameraSpace, CameraView, EmoteMixer, GestureEvent, LocomotionState},
};

use super::fold_avatar_root_motion;
use crate::{
    avatar::{AvatarRig, AvatarSetup, LocomotionParams},
    messages::{AvatarTeleported, CameraSpaceChanged},
    resources::{ActiveCamera, CurrentAvatar, FloorProvider, GestureState},
};

/// Applies this frame's gestures to the current avatar.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_gestures(
    time: Res<Time>,
    mut events: MessageReader<GestureEvent>,
    gestures: Res<GestureState>,
    camera: Res<ActiveCamera>,
    current: Res<CurrentAvatar>,
    floor: Res<FloorProvider>,
    mut avatars: Query<(&AvatarRig, &EmoteMixer, &mut LocomotionParams), With<AvatarSetup>>,
    mut transforms: Query<&mut Transform>,
    mut teleported: MessageWriter<AvatarTeleported>,
) {
    let Some(avatar) = current.0 else {
        events.clear();
        return;
    };
    let Ok((rig, mixer, mut params)) = avatars.get_mut(avatar) else {
        events.clear();
        return;
    };

    let mapper = &gestures.mapper;
    let view = &camera.view;
    let space = camera.space;
    let dt = time.delta_secs();

    for event in events.read() {
        match *event {
            GestureEvent::Drag { delta, .. } => {
                if params.state == LocomotionState::WalkRun || space != CameraSpace::World {
                    continue;
                }
                if mixer.is_emoting() {
                    fold_avatar_root_motion(avatar, rig, &mut transforms);
                }
                let Ok(mut transform) = transforms.get_mut(avatar) else {
                    continue;
                };
                if let Some(speed) = mapper.yaw(&mut transform, space, delta.x, dt) {
                    params.yaw_speed = speed;
                    params.yawing = true;
                }
            }
            GestureEvent::TouchUp { .. } => {
                params.yawing = false;
                params.yaw_speed = 0.;
            }
            GestureEvent::TwoFingerDrag { delta, .. } => {
                if let Ok(mut transform) = transforms.get_mut(avatar) {
                    mapper.translate_planar(&mut transform, view, space, delta);
                }
            }
            GestureEvent::ThreeFingerDrag { delta, .. } => {
                if let Ok(mut transform) = transforms.get_mut(avatar) {
                    mapper.translate_vertical(&mut transform, view, space, delta);
                }
            }
            GestureEvent::Pinch { delta, pivot } => {
                if let Ok(mut transform) = transforms.get_mut(avatar) {
                    mapper.scale(&mut transform, view, space, delta, pivot);
                }
            }
            GestureEvent::Twist {
                delta_degrees,
                pivot,
            } => {
                if let Ok(mut transform) = transforms.get_mut(avatar) {
                    mapper.twist(&mut transform, view, space, delta_degrees, pivot);
                }
            }
            GestureEvent::DoubleTap { position } if space == CameraSpace::World => {
                let Some(point) = view
                    .screen_to_ray(position)
                    .and_then(|ray| floor.floor_point(ray))
                else {
                    debug!("No floor under double tap at {position}");
                    continue;
                };
                if mixer.is_emoting() {
                    fold_avatar_root_motion(avatar, rig, &mut transforms);
                }
                let Ok(mut transform) = transforms.get_mut(avatar) else {
                    continue;
                };
                transform.translation = point;
                face_camera(&mut transform, view);
                teleported.write(AvatarTeleported {
                    avatar,
                    position: point,
                });
            }
            _ => {}
        }
    }
}

/// Re-places the current avatar when the camera switches between world and screen space.
pub(crate) fn track_camera_space(
    camera: Res<ActiveCamera>,
    mut last: Local<Option<CameraSpace>>,
    current: Res<CurrentAvatar>,
    floor: Res<FloorProvider>,
    mut transforms: Query<&mut Transform, With<AvatarSetup>>,
    mut changed: MessageWriter<CameraSpaceChanged>,
) {
    let space = camera.space;
    let Some(previous) = last.replace(space) else {
        return;
    };
    if previous == space {
        return;
    }

    debug!("Camera space changed from {previous:?} to {space:?}");
    changed.write(CameraSpaceChanged { previous, space });

    let Some(mut transform) = current.0.and_then(|avatar| transforms.get_mut(avatar).ok()) else {
        return;
    };
    place_in_space(&mut transform, &camera.view, space, &floor);
}

fn place_in_space(
    transform: &mut Transform,
    view: &CameraView,
    space: CameraSpace,
    floor: &FloorProvider,
) {
    match space {
        CameraSpace::Screen => *transform = Transform::IDENTITY,
        CameraSpace::World => {
            let Some(point) = view
                .screen_to_ray(view.screen_center())
                .and_then(|ray| floor.floor_point(ray))
            else {
                debug!("No floor at the screen center, leaving avatar in place");
                return;
            };
            transform.translation = point;
            face_camera(transform, view);
        }
    }
}
