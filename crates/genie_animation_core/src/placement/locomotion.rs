use bevy::{
    math::{Dir3, Vec2, Vec3},
    reflect::Reflect,
    transform::components::Transform,
};
use serde::{Deserialize, Serialize};

use super::{CameraView, yaw_only};
use crate::config::PlacementConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum LocomotionState {
    #[default]
    Idle,
    WalkRun,
    Yaw,
    Jump,
}

impl LocomotionState {
    /// Whether entering this state soft-stops an active emote. Turning in place does not.
    pub fn interrupts_overlay(&self) -> bool {
        matches!(self, Self::WalkRun | Self::Jump)
    }
}

/// Virtual joystick deflection, in the unit disk. +Y pushes away from the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct JoystickInput {
    pub vector: Vec2,
}

impl JoystickInput {
    pub fn magnitude(&self) -> f32 {
        self.vector.length().min(1.)
    }

    pub fn is_active(&self) -> bool {
        self.magnitude() > f32::EPSILON
    }
}

/// Result of one joystick step, fed to the locomotion animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct LocomotionStep {
    pub state: LocomotionState,
    pub walk_run_speed: f32,
    pub walk_run_blend: f32,
}

/// Moves the avatar along the camera-relative joystick direction and turns it toward travel.
pub fn drive_joystick(
    avatar: &mut Transform,
    camera: &CameraView,
    input: JoystickInput,
    dt: f32,
    config: &PlacementConfig,
) -> LocomotionStep {
    let magnitude = input.magnitude();
    let walk_run_speed = config.min_walk_run_speed + (1. - config.min_walk_run_speed) * magnitude;
    let local = Vec3::new(input.vector.x, 0., -input.vector.y);
    let Ok(direction) = Dir3::new(yaw_only(camera.transform.rotation) * local) else {
        return LocomotionStep {
            state: LocomotionState::Idle,
            walk_run_speed,
            walk_run_blend: 0.,
        };
    };

    avatar.translation +=
        *direction * config.translation_speed * magnitude * avatar.scale.y * dt;
    let target = Transform::IDENTITY.looking_to(direction, Dir3::Y).rotation;
    avatar.rotation = avatar
        .rotation
        .slerp(target, (dt * config.turn_rate).min(1.));

    LocomotionStep {
        state: LocomotionState::WalkRun,
        walk_run_speed,
        walk_run_blend: magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Quat;

    #[test]
    fn idle_joystick_leaves_avatar_alone() {
        let mut avatar = Transform::from_xyz(1., 0., 1.);
        let step = drive_joystick(
            &mut avatar,
            &CameraView::default(),
            JoystickInput::default(),
            0.1,
            &PlacementConfig::default(),
        );
        assert_eq!(step.state, LocomotionState::Idle);
        assert_eq!(step.walk_run_speed, 0.5);
        assert_eq!(avatar, Transform::from_xyz(1., 0., 1.));
    }

    #[test]
    fn joystick_moves_relative_to_camera_yaw() {
        let config = PlacementConfig::default();
        let camera = CameraView {
            transform: Transform::from_xyz(0., 2., 0.)
                .with_rotation(Quat::from_rotation_y(90f32.to_radians())),
            ..Default::default()
        };
        let mut avatar = Transform::IDENTITY;
        let input = JoystickInput {
            vector: Vec2::new(0., 0.5),
        };

        let step = drive_joystick(&mut avatar, &camera, input, 0.5, &config);
        assert_eq!(step.state, LocomotionState::WalkRun);
        assert!((step.walk_run_speed - 0.75).abs() < 1e-6);
        assert_eq!(step.walk_run_blend, 0.5);
        // camera turned left, so "forward" is -X
        assert!(avatar.translation.distance(Vec3::new(-0.5, 0., 0.)) < 1e-5);
        assert!(avatar.forward().distance(Vec3::NEG_X) < 1e-4);
    }

    #[test]
    fn only_travel_interrupts_emotes() {
        assert!(LocomotionState::WalkRun.interrupts_overlay());
        assert!(LocomotionState::Jump.interrupts_overlay());
        assert!(!LocomotionState::Yaw.interrupts_overlay());
        assert!(!LocomotionState::Idle.interrupts_overlay());
    }
}
