use bevy::{
    ecs::{entity::Entity, message::Message},
    math::Vec3,
    reflect::Reflect,
};
use genie_animation_core::prelude::{CameraSpace, EmoteClip, LocomotionState, OverlaySlotId};

/// Asks an avatar to play an emote over its base track.
#[derive(Message, Debug, Clone, PartialEq, Reflect)]
pub struct EmoteRequest {
    pub avatar: Entity,
    pub clip: EmoteClip,
}

/// Stops an avatar's emotes. A soft stop fades them out, a hard stop cuts them.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct StopEmote {
    pub avatar: Entity,
    pub hard: bool,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct JumpRequest {
    pub avatar: Entity,
}

#[derive(Message, Debug, Clone, PartialEq, Eq, Reflect)]
pub struct OverlayStarted {
    pub avatar: Entity,
    pub clip: String,
    pub slot: OverlaySlotId,
}

/// Sent once per emote, when it starts fading out or is cut.
#[derive(Message, Debug, Clone, PartialEq, Eq, Reflect)]
pub struct OverlayStopped {
    pub avatar: Entity,
    pub clip: String,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct LocomotionStateChanged {
    pub avatar: Entity,
    pub previous: LocomotionState,
    pub state: LocomotionState,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AvatarTeleported {
    pub avatar: Entity,
    pub position: Vec3,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct CameraSpaceChanged {
    pub previous: CameraSpace,
    pub space: CameraSpace,
}
