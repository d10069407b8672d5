use bevy::{
    ecs::{
        entity::Entity,
        message::{MessageReader, MessageWriter},
        query::With,
        system::{Query, Res},
    },
    log::warn,
    time::Time,
    transform::components::Transform,
};
use genie_animation_core::prelude::{EmoteMixer, MixerSignal};

use super::fold_avatar_root_motion;
use crate::{
    avatar::{AvatarRig, AvatarSetup},
    messages::{EmoteRequest, OverlayStarted, OverlayStopped, StopEmote},
};

/// Advances the mixers, routes this frame's emote requests to them, and publishes what they
/// report. Requests land after the tick so a new overlay starts its fade at weight 0.
pub(crate) fn update_emotes(
    time: Res<Time>,
    mut requests: MessageReader<EmoteRequest>,
    mut stops: MessageReader<StopEmote>,
    mut avatars: Query<(Entity, &AvatarRig, &mut EmoteMixer), With<AvatarSetup>>,
    mut transforms: Query<&mut Transform>,
    mut started: MessageWriter<OverlayStarted>,
    mut stopped: MessageWriter<OverlayStopped>,
) {
    let dt = time.delta_secs();
    for (_, _, mut mixer) in &mut avatars {
        mixer.tick(dt);
    }

    for request in requests.read() {
        let Ok((_, _, mut mixer)) = avatars.get_mut(request.avatar) else {
            warn!(
                "Emote {} requested for {}, which is not a set-up avatar",
                request.clip.id, request.avatar
            );
            continue;
        };
        mixer.play(request.clip.clone());
    }

    for stop in stops.read() {
        let Ok((_, _, mut mixer)) = avatars.get_mut(stop.avatar) else {
            continue;
        };
        if stop.hard {
            mixer.hard_stop();
        } else {
            mixer.soft_stop();
        }
    }

    for (avatar, rig, mut mixer) in &mut avatars {
        for signal in mixer.drain_signals() {
            match signal {
                MixerSignal::OverlayStarted { clip, slot } => {
                    started.write(OverlayStarted { avatar, clip, slot });
                }
                MixerSignal::OverlayStopped { clip } => {
                    stopped.write(OverlayStopped { avatar, clip });
                }
                MixerSignal::FoldRootMotion => {
                    fold_avatar_root_motion(avatar, rig, &mut transforms);
                }
            }
        }
    }
}
