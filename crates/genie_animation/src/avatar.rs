use bevy::{
    asset::Handle,
    ecs::{component::Component, entity::Entity},
    math::Vec3,
    platform::collections::HashMap,
    prelude::ReflectComponent,
    reflect::Reflect,
};
use genie_animation_core::{
    blendshape::driven::DrivenChannel,
    prelude::{
        AvatarRigConfig, BlendshapeSignalMapper, DrivenBlendshapes, GazeComposer,
        LocomotionState, SpineJoint, SpineMocapComposer, SpinePose,
    },
};

/// Where an avatar's tuning comes from.
#[derive(Debug, Clone, Reflect)]
pub enum RigConfigSource {
    Inline(AvatarRigConfig),
    Asset(Handle<AvatarRigConfig>),
}

impl Default for RigConfigSource {
    fn default() -> Self {
        Self::Inline(AvatarRigConfig::default())
    }
}

/// Marks an avatar root. The root is expected to be a top-level entity facing its local -Z.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(AvatarRig)]
pub struct GenieAvatar {
    pub config: RigConfigSource,
}

/// Entities making up an avatar's rig. Filled in by whoever spawns the avatar; setup runs when
/// this component is added or changed.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AvatarRig {
    /// Root bone driven by root-motion clips; must be a direct child of the avatar
    pub skeleton_root: Option<Entity>,
    /// Indexed by [`SpineJoint::index`]
    pub spine: [Option<Entity>; 5],
    /// Midpoint between the eyes, looking down its local -Z
    pub eyes: Option<Entity>,
    /// Entities carrying a [`BlendshapeWeights`](genie_animation_core::prelude::BlendshapeWeights)
    pub meshes: Vec<Entity>,
    /// Local translation of the skeleton root at rest
    pub rest_offset: Vec3,
    pub driven: Vec<DrivenChannel>,
}

impl AvatarRig {
    pub fn joint(&self, joint: SpineJoint) -> Option<Entity> {
        self.spine[joint.index()]
    }
}

/// Resolved tuning of a set-up avatar.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AvatarSetup {
    pub config: AvatarRigConfig,
}

#[derive(Component, Debug, Clone, Default)]
pub struct FaceRig {
    pub mapper: BlendshapeSignalMapper,
    pub gaze: GazeComposer,
    pub driven: DrivenBlendshapes,
    pub force_look_at_camera: bool,
    /// Without eyes, gaze always comes from capture
    pub has_eyes: bool,
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct SpineMocap {
    pub composer: SpineMocapComposer,
    /// Joint rotations the animation system wrote this frame, before mocap
    pub animated: SpinePose,
}

/// Locomotion parameters for the animation system to read.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LocomotionParams {
    pub state: LocomotionState,
    pub walk_run_speed: f32,
    pub walk_run_blend: f32,
    /// Playback speed of the turn-in-place animation
    pub yaw_speed: f32,
    /// Set while a yaw drag is in progress, until the finger lifts
    pub yawing: bool,
    /// Set on the frame a jump starts
    pub jump_triggered: bool,
}

/// Float parameters written by the animation system, read by driven blendshapes.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AnimatorParameters {
    pub floats: HashMap<String, f32>,
}
