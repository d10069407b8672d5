use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

use super::name_table::normalize_shape_name;

macro_rules! face_channels {
    ($($variant:ident),* $(,)?) => {
        /// Canonical facial channel vocabulary, in the order of the ARKit blendshape locations.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize,
        )]
        pub enum FaceChannel {
            $($variant),*
        }

        impl FaceChannel {
            pub const ALL: &'static [FaceChannel] = &[$(FaceChannel::$variant),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

face_channels!(
    BrowDownLeft,
    BrowDownRight,
    BrowInnerUp,
    BrowOuterUpLeft,
    BrowOuterUpRight,
    CheekPuff,
    CheekSquintLeft,
    CheekSquintRight,
    EyeBlinkLeft,
    EyeBlinkRight,
    EyeLookDownLeft,
    EyeLookDownRight,
    EyeLookInLeft,
    EyeLookInRight,
    EyeLookOutLeft,
    EyeLookOutRight,
    EyeLookUpLeft,
    EyeLookUpRight,
    EyeSquintLeft,
    EyeSquintRight,
    EyeWideLeft,
    EyeWideRight,
    JawForward,
    JawLeft,
    JawOpen,
    JawRight,
    MouthClose,
    MouthDimpleLeft,
    MouthDimpleRight,
    MouthFrownLeft,
    MouthFrownRight,
    MouthFunnel,
    MouthLeft,
    MouthLowerDownLeft,
    MouthLowerDownRight,
    MouthPressLeft,
    MouthPressRight,
    MouthPucker,
    MouthRight,
    MouthRollLower,
    MouthRollUpper,
    MouthShrugLower,
    MouthShrugUpper,
    MouthSmileLeft,
    MouthSmileRight,
    MouthStretchLeft,
    MouthStretchRight,
    MouthUpperUpLeft,
    MouthUpperUpRight,
    NoseSneerLeft,
    NoseSneerRight,
    TongueOut,
);

impl FaceChannel {
    pub const COUNT: usize = Self::ALL.len();

    /// The eight eye-look channels. These are owned by the gaze composer and never written to
    /// meshes straight from capture.
    pub const GAZE: [FaceChannel; 8] = [
        FaceChannel::EyeLookDownLeft,
        FaceChannel::EyeLookDownRight,
        FaceChannel::EyeLookInLeft,
        FaceChannel::EyeLookInRight,
        FaceChannel::EyeLookOutLeft,
        FaceChannel::EyeLookOutRight,
        FaceChannel::EyeLookUpLeft,
        FaceChannel::EyeLookUpRight,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|channel| channel.name() == name)
    }

    /// Resolves a capture coefficient name (`jawOpen`, `arkit.JawOpen`, ...) to its channel.
    pub fn from_capture_name(raw: &str) -> Option<Self> {
        normalize_shape_name(raw).and_then(|name| Self::from_name(&name))
    }

    pub fn is_gaze(&self) -> bool {
        Self::GAZE.contains(self)
    }

    /// Position of this channel within [`Self::GAZE`], if it is a gaze channel
    pub fn gaze_index(&self) -> Option<usize> {
        Self::GAZE.iter().position(|c| c == self)
    }
}
