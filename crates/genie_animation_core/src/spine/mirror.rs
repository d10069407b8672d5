use bevy::{
    math::{Quat, Vec3},
    reflect::Reflect,
    transform::components::Transform,
};

use crate::symmetry::mirror_quat;

/// Whether the camera sits in front of the avatar, i.e. the two face each other and the head
/// motion should read like a mirror.
pub fn camera_in_front(avatar: &Transform, camera: Vec3) -> bool {
    avatar.forward().dot(camera - avatar.translation) > 0.
}

/// Committed mirroring state plus the progress of a pending switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct MirrorState {
    mirrored: bool,
    /// Seconds spent moving toward the opposite state
    transition: Option<f32>,
}

impl MirrorState {
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// Progress through the current transition window, 0 when there is none.
    pub fn transition_factor(&self, threshold: f32) -> f32 {
        self.transition
            .map_or(0., |elapsed| (elapsed / threshold).clamp(0., 1.))
    }

    /// How much of the mirrored rotation is applied: exactly 0 or 1 outside a transition.
    pub fn mirror_weight(&self, threshold: f32) -> f32 {
        let target = if self.mirrored { 1. } else { 0. };
        match self.transition {
            Some(_) => (target - self.transition_factor(threshold)).abs(),
            None => target,
        }
    }

    pub fn update(&mut self, should_mirror: bool, dt: f32, threshold: f32) {
        if should_mirror == self.mirrored {
            self.transition = None;
            return;
        }

        let elapsed = self.transition.unwrap_or(0.) + dt;
        if elapsed >= threshold {
            self.mirrored = should_mirror;
            self.transition = None;
        } else {
            self.transition = Some(elapsed);
        }
    }

    pub fn resolve(&self, rotation: Quat, threshold: f32) -> Quat {
        let flipped = mirror_quat(rotation);
        let (current, next) = if self.mirrored {
            (flipped, rotation)
        } else {
            (rotation, flipped)
        };

        match self.transition {
            Some(_) => current.slerp(next, self.transition_factor(threshold)),
            None => current,
        }
    }
}
