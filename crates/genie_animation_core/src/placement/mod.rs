//! Gesture deltas to avatar transform changes.
//!
//! Avatars face their local -Z axis ([`Transform::forward`]). In world space the avatar stands on
//! a floor and gestures move it across horizontal or camera-facing planes. In screen space the
//! avatar lives on the camera-facing plane through z = 0.

mod camera;
pub mod locomotion;
mod root_motion;

pub use camera::{CameraSpace, CameraView, ViewProjection};
pub use root_motion::fold_root_motion;

use bevy::{
    log::debug,
    math::{Dir3, EulerRot, Quat, Vec2, Vec3, primitives::InfinitePlane3d},
    transform::components::Transform,
};

use crate::config::PlacementConfig;

/// Applies gesture deltas to an avatar transform. Every method returns whether it changed the
/// transform; a gesture that does not apply to the current camera space is a no-op.
#[derive(Debug, Clone, Default)]
pub struct GestureTransformMapper {
    config: PlacementConfig,
}

impl GestureTransformMapper {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// One-finger vertical drag. Screen space treats it as a planar drag.
    pub fn translate_vertical(
        &self,
        avatar: &mut Transform,
        camera: &CameraView,
        space: CameraSpace,
        delta: Vec2,
    ) -> bool {
        if space == CameraSpace::Screen {
            return self.translate_planar(avatar, camera, space, delta);
        }
        let Some(hit) = drag_hit(
            avatar.translation,
            camera,
            delta,
            avatar.translation,
            -camera.forward(),
        ) else {
            return false;
        };
        avatar.translation.y = hit.y;
        true
    }

    /// Two-finger drag across the floor (world) or the screen plane (screen).
    pub fn translate_planar(
        &self,
        avatar: &mut Transform,
        camera: &CameraView,
        space: CameraSpace,
        delta: Vec2,
    ) -> bool {
        let (plane_origin, normal) = match space {
            CameraSpace::World => (Vec3::new(0., avatar.translation.y, 0.), Dir3::Y),
            CameraSpace::Screen => (Vec3::ZERO, -camera.forward()),
        };
        let Some(hit) = drag_hit(avatar.translation, camera, delta, plane_origin, normal) else {
            return false;
        };
        avatar.translation = hit;
        true
    }

    /// Pinch scaling. In screen space the pinch point stays visually fixed.
    pub fn scale(
        &self,
        avatar: &mut Transform,
        camera: &CameraView,
        space: CameraSpace,
        delta: f32,
        pivot: Vec2,
    ) -> bool {
        let current = avatar.scale.y;
        let distance = camera.position().distance(avatar.translation);
        let scale = (current + delta * self.config.meters_per_pixel * distance)
            .max(self.config.min_scale);
        if scale == current {
            return false;
        }

        if space == CameraSpace::Screen && current > f32::EPSILON {
            if let Some(ray) = camera.screen_to_ray(pivot) {
                let flat_origin = ray.origin.with_y(avatar.translation.y);
                let pivot_world = ray.get_point(avatar.translation.distance(flat_origin));
                avatar.translation =
                    pivot_world + (avatar.translation - pivot_world) * (scale / current);
            }
        }
        avatar.scale = Vec3::splat(scale);
        true
    }

    /// Horizontal drag turning the avatar about world up. Returns the playback speed for the
    /// turn-in-place animation so the feet keep pace with the rotation.
    pub fn yaw(
        &self,
        avatar: &mut Transform,
        space: CameraSpace,
        delta_x: f32,
        dt: f32,
    ) -> Option<f32> {
        if space != CameraSpace::World {
            return None;
        }
        let degrees = delta_x * self.config.pixels_to_degrees;
        avatar.rotation = Quat::from_rotation_y(degrees.to_radians()) * avatar.rotation;

        let speed = if dt > 0. {
            degrees / self.config.yaw_reference_angle * self.config.yaw_reference_duration / dt
        } else {
            0.
        };
        Some(speed)
    }

    /// Two-finger rotation about the view axis through the pinch point. Screen space only.
    pub fn twist(
        &self,
        avatar: &mut Transform,
        camera: &CameraView,
        space: CameraSpace,
        delta_degrees: f32,
        pivot: Vec2,
    ) -> bool {
        if space != CameraSpace::Screen {
            return false;
        }
        let Some(pivot_world) = camera.screen_to_plane(pivot, Vec3::ZERO) else {
            return false;
        };
        avatar.rotate_around(
            pivot_world,
            Quat::from_axis_angle(Vec3::Z, delta_degrees.to_radians()),
        );
        true
    }
}

/// Casts a ray from the avatar's screen point offset by `delta` onto the given plane.
fn drag_hit(
    position: Vec3,
    camera: &CameraView,
    delta: Vec2,
    plane_origin: Vec3,
    normal: Dir3,
) -> Option<Vec3> {
    let screen = camera.world_to_screen(position)? + delta;
    let hit = camera
        .screen_to_ray(screen)?
        .plane_intersection_point(plane_origin, InfinitePlane3d::new(normal));
    if hit.is_none() {
        debug!("Drag ray at {screen} misses the placement plane");
    }
    hit
}

/// The rotation's turn about world up.
pub fn yaw_only(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

/// Turns the avatar about world up so it faces the camera. A camera straight above leaves the
/// rotation unchanged.
pub fn face_camera(avatar: &mut Transform, camera: &CameraView) {
    let to_camera = (camera.position() - avatar.translation).with_y(0.);
    if let Ok(direction) = Dir3::new(to_camera) {
        avatar.look_to(direction, Dir3::Y);
    }
}
