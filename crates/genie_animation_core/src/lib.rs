//! # Genie animation core
//!
//! Pose composition building blocks for a touch-driven, camera-captured AR avatar. Nothing in
//! this crate touches the ECS: every piece is a plain value with `&mut self` tick/apply methods,
//! and the `genie_animation` crate wires them into Bevy schedules.
//!
//! The pieces, leaf first:
//! - [`gesture::GestureInterpreter`] turns raw touch samples into [`gesture::GestureEvent`]s.
//! - [`blendshape::BlendshapeSignalMapper`] maps facial capture coefficients onto mesh
//!   blendshape slots, through the [`blendshape::FaceChannel`] vocabulary and a
//!   [`blendshape::CalibrationTable`].
//! - [`gaze::GazeComposer`] produces the eight eye-look values, either from capture or from a
//!   look-at-camera target.
//! - [`emote::EmoteMixer`] cross-fades emote overlays over the base locomotion track and exposes
//!   the blend weight the spine composer fades mocap with.
//! - [`spine::SpineMocapComposer`] distributes a head rotation sample down five spine joints,
//!   mirroring it when the avatar faces the camera.
//! - [`placement`] turns gesture deltas into avatar transform changes, in world space or screen
//!   space, and drives joystick locomotion.
//!
//! Per-avatar tuning lives in [`config::AvatarRigConfig`], which can be read from RON.

pub mod blendshape;
pub mod config;
pub mod emote;
pub mod errors;
pub mod gaze;
pub mod gesture;
pub mod interpolation;
pub mod placement;
pub mod spine;
pub mod symmetry;

pub mod prelude {
    pub use crate::blendshape::{
        BlendshapeSignalMapper, BlendshapeTarget, BlendshapeWeights, CalibrationTable,
        ChannelCalibration, FaceChannel,
        driven::{DrivenAttribute, DrivenBlendshapes, RetargetBehavior},
    };
    pub use crate::config::{
        AvatarRigConfig, EmoteConfig, EyeLimits, FaceConfig, GestureConfig, PlacementConfig,
        SpineConfig,
    };
    pub use crate::emote::{EmoteClip, EmoteMixer, MixerPhase, MixerSignal, OverlaySlotId};
    pub use crate::errors::{ConfigError, RigResult, RigSetupError};
    pub use crate::gaze::{GazeComposer, GazeSnapshot};
    pub use crate::gesture::{GestureEvent, GestureInterpreter, PointerFrame, TouchPoint};
    pub use crate::placement::{
        CameraSpace, CameraView, GestureTransformMapper, ViewProjection, fold_root_motion,
        locomotion::{JoystickInput, LocomotionState, LocomotionStep, drive_joystick},
    };
    pub use crate::spine::{SpineJoint, SpineMocapComposer, SpinePose};
}
