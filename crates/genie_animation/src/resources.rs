use bevy::{
    ecs::{entity::Entity, resource::Resource},
    math::{Dir3, Quat, Ray3d, Vec3, primitives::InfinitePlane3d},
    prelude::ReflectResource,
    reflect::Reflect,
};
use genie_animation_core::prelude::{
    CameraSpace, CameraView, GestureInterpreter, GestureTransformMapper, JoystickInput,
    TouchPoint,
};
use uuid::Uuid;

/// The camera avatars are viewed through, and how they are presented.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct ActiveCamera {
    pub view: CameraView,
    pub space: CameraSpace,
}

/// One frame of facial capture for a tracked face.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct CaptureFrame {
    pub face_id: Uuid,
    /// Named coefficients, in [0, 1]
    pub coefficients: Vec<(String, f32)>,
    /// Head rotation, already in the avatar's local space
    pub head_rotation: Quat,
}

/// Latest facial capture. `None` while no face is tracked; the previous weights are left on the
/// avatar.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct FaceCapture {
    pub frame: Option<CaptureFrame>,
}

/// Touches of the current frame, with the origin at the bottom-left of the screen.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct PointerInput {
    pub touches: Vec<TouchPoint>,
    /// Whether the first contact of the current sequence landed on UI
    pub began_over_ui: bool,
}

#[derive(Resource, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Resource)]
pub struct Joystick(pub JoystickInput);

#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct GestureState {
    pub interpreter: GestureInterpreter,
    #[reflect(ignore)]
    pub mapper: GestureTransformMapper,
}

/// The avatar gestures and the joystick act on.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct CurrentAvatar(pub Option<Entity>);

/// Answers "where is the floor under this ray".
pub trait FloorQuery: Send + Sync + 'static {
    fn floor_point(&self, ray: Ray3d) -> Option<Vec3>;
}

/// A horizontal floor at a fixed height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct FlatFloor {
    pub height: f32,
}

impl FloorQuery for FlatFloor {
    fn floor_point(&self, ray: Ray3d) -> Option<Vec3> {
        ray.plane_intersection_point(Vec3::Y * self.height, InfinitePlane3d::new(Dir3::Y))
    }
}

#[derive(Resource)]
pub struct FloorProvider(pub Box<dyn FloorQuery>);

impl Default for FloorProvider {
    fn default() -> Self {
        Self(Box::new(FlatFloor::default()))
    }
}

impl FloorProvider {
    pub fn new(query: impl FloorQuery) -> Self {
        Self(Box::new(query))
    }

    pub fn floor_point(&self, ray: Ray3d) -> Option<Vec3> {
        self.0.floor_point(ray)
    }
}
