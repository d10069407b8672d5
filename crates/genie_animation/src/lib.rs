//! # Genie animation
//!
//! Bevy integration for [`genie_animation_core`]. Add [`plugin::GeniePlugin`], spawn an avatar
//! root with [`avatar::GenieAvatar`] and fill in its [`avatar::AvatarRig`] with the entities of
//! its skeleton, eyes and blendshape meshes. Once the rig is set up:
//!
//! - touches written into [`resources::PointerInput`] become gestures that move, turn, scale
//!   and teleport the current avatar;
//! - [`resources::Joystick`] walks it around, relative to the camera;
//! - [`messages::EmoteRequest`] cross-fades emotes over its base track;
//! - [`resources::FaceCapture`] drives its spine and face every frame, after the animation
//!   system has posed it.
//!
//! Avatar tuning comes from an [`AvatarRigConfig`](genie_animation_core::prelude::AvatarRigConfig),
//! inline or loaded from a `.rig.ron` asset.

pub mod avatar;
pub mod loader;
pub mod messages;
pub mod plugin;
pub mod resources;
mod systems;

pub mod prelude {
    pub use crate::avatar::{
        AnimatorParameters, AvatarRig, AvatarSetup, FaceRig, GenieAvatar, LocomotionParams,
        RigConfigSource, SpineMocap,
    };
    pub use crate::messages::{
        AvatarTeleported, CameraSpaceChanged, EmoteRequest, JumpRequest, LocomotionStateChanged,
        OverlayStarted, OverlayStopped, StopEmote,
    };
    pub use crate::plugin::{GenieSet, GeniePlugin};
    pub use crate::resources::{
        ActiveCamera, CaptureFrame, CurrentAvatar, FaceCapture, FlatFloor, FloorProvider,
        FloorQuery, GestureState, Joystick, PointerInput,
    };
    pub use genie_animation_core::prelude::*;
}
