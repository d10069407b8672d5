use bevy::{
    math::{Dir3, Ray3d, Vec2, Vec3, primitives::InfinitePlane3d},
    reflect::Reflect,
    transform::components::Transform,
};
use serde::{Deserialize, Serialize};

/// How the avatar is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum CameraSpace {
    /// A 3D object standing on the floor of the camera feed
    #[default]
    World,
    /// A flat overlay in front of a backdrop
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ViewProjection {
    /// Vertical field of view, in radians
    Perspective { fov_y: f32 },
    Orthographic { half_height: f32 },
}

/// The active camera as far as avatar placement is concerned. Screen coordinates are in pixels
/// with the origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CameraView {
    pub transform: Transform,
    pub viewport: Vec2,
    pub projection: ViewProjection,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            viewport: Vec2::new(1080., 1920.),
            projection: ViewProjection::Perspective {
                fov_y: 60f32.to_radians(),
            },
        }
    }
}

impl CameraView {
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn forward(&self) -> Dir3 {
        self.transform.forward()
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y.max(1.)
    }

    pub fn screen_center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    /// Half extents of the view at unit depth (perspective) or of the whole view (orthographic)
    fn half_extents(&self) -> Vec2 {
        let half_height = match self.projection {
            ViewProjection::Perspective { fov_y } => (fov_y * 0.5).tan(),
            ViewProjection::Orthographic { half_height } => half_height,
        };
        Vec2::new(half_height * self.aspect(), half_height)
    }

    /// Projects a world point to screen pixels. `None` for points behind a perspective camera.
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let local = self.transform.rotation.inverse() * (point - self.transform.translation);
        let half = self.half_extents();
        let ndc = match self.projection {
            ViewProjection::Perspective { .. } => {
                if local.z >= 0. {
                    return None;
                }
                local.truncate() / (half * -local.z)
            }
            ViewProjection::Orthographic { .. } => local.truncate() / half,
        };
        Some((ndc + Vec2::ONE) * 0.5 * self.viewport)
    }

    /// The world ray through a screen point.
    pub fn screen_to_ray(&self, screen: Vec2) -> Option<Ray3d> {
        let ndc = screen / self.viewport * 2. - Vec2::ONE;
        let half = self.half_extents();
        let rotation = self.transform.rotation;
        match self.projection {
            ViewProjection::Perspective { .. } => {
                let direction = rotation * (ndc * half).extend(-1.);
                Dir3::new(direction)
                    .ok()
                    .map(|direction| Ray3d::new(self.transform.translation, direction))
            }
            ViewProjection::Orthographic { .. } => {
                let origin = self.transform.translation + rotation * (ndc * half).extend(0.);
                Some(Ray3d::new(origin, self.forward()))
            }
        }
    }

    /// Where the ray through `screen` crosses the camera-facing plane through `depth_point`.
    pub fn screen_to_plane(&self, screen: Vec2, depth_point: Vec3) -> Option<Vec3> {
        self.screen_to_ray(screen)?
            .plane_intersection_point(depth_point, InfinitePlane3d::new(-self.forward()))
    }
}
