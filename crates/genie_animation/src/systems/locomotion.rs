use bevy::{
    ecs::{
        entity::Entity,
        message::{MessageReader, MessageWriter},
        system::{Query, Res},
    },
    log::debug,
    platform::collections::HashSet,
    time::Time,
    transform::components::Transform,
};
use genie_animation_core::prelude::{
    CameraSpace, EmoteMixer, LocomotionState, LocomotionStep, drive_joystick,
};

use crate::{
    avatar::{AvatarSetup, LocomotionParams},
    messages::{JumpRequest, LocomotionStateChanged},
    resources::{ActiveCamera, CurrentAvatar, Joystick},
};

/// Resolves each avatar's locomotion state for the frame. A jump lasts one frame, walking wins
/// over turning in place, and the emote mixer is told about every state change. The joystick is
/// ignored while a yaw drag is in progress.
#[allow(clippy::too_many_arguments)]
pub(crate) fn drive_locomotion(
    time: Res<Time>,
    joystick: Res<Joystick>,
    camera: Res<ActiveCamera>,
    current: Res<CurrentAvatar>,
    mut jumps: MessageReader<JumpRequest>,
    mut avatars: Query<(
        Entity,
        &AvatarSetup,
        &mut Transform,
        &mut LocomotionParams,
        &mut EmoteMixer,
    )>,
    mut changed: MessageWriter<LocomotionStateChanged>,
) {
    let dt = time.delta_secs();
    let jumping: HashSet<Entity> = jumps.read().map(|jump| jump.avatar).collect();

    for (entity, setup, mut transform, mut params, mut mixer) in &mut avatars {
        let placement = &setup.config.placement;
        let driven = current.0 == Some(entity)
            && camera.space == CameraSpace::World
            && !params.yawing
            && joystick.0.is_active();
        let step = if driven {
            drive_joystick(&mut transform, &camera.view, joystick.0, dt, placement)
        } else {
            LocomotionStep {
                state: LocomotionState::Idle,
                walk_run_speed: placement.min_walk_run_speed,
                walk_run_blend: 0.,
            }
        };

        let jump = jumping.contains(&entity);
        let state = if jump {
            LocomotionState::Jump
        } else if step.state == LocomotionState::WalkRun {
            LocomotionState::WalkRun
        } else if params.yawing {
            LocomotionState::Yaw
        } else {
            LocomotionState::Idle
        };

        params.jump_triggered = jump;
        params.walk_run_speed = step.walk_run_speed;
        params.walk_run_blend = step.walk_run_blend;
        if state != LocomotionState::Yaw {
            params.yaw_speed = 0.;
        }

        if state != params.state {
            debug!("Avatar {entity} locomotion {:?} -> {state:?}", params.state);
            changed.write(LocomotionStateChanged {
                avatar: entity,
                previous: params.state,
                state,
            });
            mixer.on_locomotion(state);
            params.state = state;
        }
    }
}
