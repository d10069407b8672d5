mod mirror;

use bevy::{math::Quat, reflect::Reflect};
use serde::{Deserialize, Serialize};

pub use mirror::*;

use crate::{config::SpineConfig, interpolation::linear::InterpolateLinear};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum SpineJoint {
    Head,
    Neck,
    UpperChest,
    Chest,
    Spine,
}

impl SpineJoint {
    pub const ALL: [SpineJoint; 5] = [
        SpineJoint::Head,
        SpineJoint::Neck,
        SpineJoint::UpperChest,
        SpineJoint::Chest,
        SpineJoint::Spine,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Neck => "neck",
            Self::UpperChest => "upper_chest",
            Self::Chest => "chest",
            Self::Spine => "spine",
        }
    }

    /// Share of the head rotation this joint takes
    pub fn default_influence(&self) -> f32 {
        match self {
            Self::Head => 0.85,
            Self::Neck => 0.30,
            Self::UpperChest => 0.25,
            Self::Chest => 0.25,
            Self::Spine => 0.15,
        }
    }
}

/// Local rotations of the five spine joints.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SpinePose {
    pub rotations: [Quat; 5],
}

impl Default for SpinePose {
    fn default() -> Self {
        Self {
            rotations: [Quat::IDENTITY; 5],
        }
    }
}

impl SpinePose {
    pub fn get(&self, joint: SpineJoint) -> Quat {
        self.rotations[joint.index()]
    }

    pub fn set(&mut self, joint: SpineJoint, rotation: Quat) {
        self.rotations[joint.index()] = rotation;
    }
}

/// Spreads a camera-relative head rotation over the spine, fading it against the animated pose
/// by the emote blend weight.
#[derive(Debug, Clone, Reflect)]
pub struct SpineMocapComposer {
    mirror: MirrorState,
    threshold: f32,
    influences: [f32; 5],
}

impl Default for SpineMocapComposer {
    fn default() -> Self {
        Self::new(&SpineConfig::default())
    }
}

impl SpineMocapComposer {
    pub fn new(config: &SpineConfig) -> Self {
        Self {
            mirror: MirrorState::default(),
            threshold: config.mirror_threshold,
            influences: config.influences,
        }
    }

    pub fn mirror(&self) -> &MirrorState {
        &self.mirror
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Computes this frame's joint rotations.
    ///
    /// `head` is already expressed in the avatar's local space. `animated` is the pose the
    /// animation graph wrote this frame, before any mocap was applied.
    pub fn compose(
        &mut self,
        head: Quat,
        should_mirror: bool,
        dt: f32,
        animated: &SpinePose,
        blend_weight: f32,
    ) -> SpinePose {
        self.mirror.update(should_mirror, dt, self.threshold);
        let input = self.mirror.resolve(head, self.threshold);
        let blend_weight = blend_weight.clamp(0., 1.);

        let mut mocap = SpinePose::default();
        for joint in SpineJoint::ALL {
            mocap.set(
                joint,
                Quat::IDENTITY.slerp(input, self.influences[joint.index()]),
            );
        }
        mocap.interpolate_linear(animated, blend_weight)
    }
}
