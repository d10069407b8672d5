use bevy::{
    asset::Assets,
    ecs::{
        entity::Entity,
        query::{Changed, With, Without},
        system::{Commands, Query, Res, ResMut},
    },
    log::{debug, error, warn},
    transform::components::Transform,
};
use genie_animation_core::prelude::{
    AvatarRigConfig, BlendshapeSignalMapper, BlendshapeWeights, DrivenBlendshapes, EmoteMixer,
    GestureInterpreter, GestureTransformMapper, RigSetupError, SpineJoint, SpineMocapComposer,
    SpinePose,
};

use crate::{
    avatar::{
        AvatarRig, AvatarSetup, FaceRig, GenieAvatar, LocomotionParams, RigConfigSource,
        SpineMocap,
    },
    resources::{CurrentAvatar, GestureState},
};

/// Builds the per-avatar mocap state once the rig and its tuning are available. Avatars whose
/// config asset is still loading are retried every frame.
#[allow(clippy::too_many_arguments)]
pub(crate) fn setup_avatars(
    mut commands: Commands,
    pending: Query<(Entity, &GenieAvatar, &AvatarRig), Without<AvatarSetup>>,
    changed: Query<(Entity, &GenieAvatar, &AvatarRig), (With<AvatarSetup>, Changed<AvatarRig>)>,
    configs: Res<Assets<AvatarRigConfig>>,
    meshes: Query<&BlendshapeWeights>,
    mut mixers: Query<&mut EmoteMixer>,
    transforms: Query<(), With<Transform>>,
    mut current: ResMut<CurrentAvatar>,
    mut gestures: ResMut<GestureState>,
) {
    for (entity, avatar, rig, rebuild) in pending
        .iter()
        .map(|(e, a, r)| (e, a, r, false))
        .chain(changed.iter().map(|(e, a, r)| (e, a, r, true)))
    {
        let config = match &avatar.config {
            RigConfigSource::Inline(config) => config.clone(),
            RigConfigSource::Asset(handle) => {
                let Some(config) = configs.get(handle) else {
                    continue;
                };
                config.clone()
            }
        };

        if rebuild {
            warn!("Avatar {entity} is already set up, rebuilding its rig");
        }

        let empty = BlendshapeWeights::default();
        let targets: Vec<&BlendshapeWeights> = rig
            .meshes
            .iter()
            .map(|mesh| meshes.get(*mesh).unwrap_or(&empty))
            .collect();

        let mut entity_commands = commands.entity(entity);

        let mut mapper = BlendshapeSignalMapper::from_config(&config.face);
        match mapper.map_meshes(targets.iter().copied()) {
            Ok(()) => {
                let has_eyes = rig.eyes.is_some_and(|eyes| transforms.contains(eyes));
                if !has_eyes {
                    report(entity, RigSetupError::MissingEyes, "look-at-camera gaze");
                }
                let mut driven = DrivenBlendshapes::new(rig.driven.clone());
                driven.bind(targets.iter().copied());
                entity_commands.insert(FaceRig {
                    mapper,
                    gaze: Default::default(),
                    driven,
                    force_look_at_camera: config.face.force_look_at_camera,
                    has_eyes,
                });
            }
            Err(err) => {
                report(entity, err, "facial mocap");
                entity_commands.remove::<FaceRig>();
            }
        }

        let missing_joint = SpineJoint::ALL.into_iter().find(|joint| {
            rig.joint(*joint)
                .is_none_or(|joint_entity| !transforms.contains(joint_entity))
        });
        match missing_joint {
            None => {
                entity_commands.insert(SpineMocap {
                    composer: SpineMocapComposer::new(&config.spine),
                    animated: SpinePose::default(),
                });
            }
            Some(joint) => {
                report(entity, RigSetupError::MissingJoint(joint), "spine mocap");
                entity_commands.remove::<SpineMocap>();
            }
        }

        if !rig
            .skeleton_root
            .is_some_and(|root| transforms.contains(root))
        {
            report(entity, RigSetupError::MissingSkeletonRoot, "root motion folding");
        }

        // A rebuild keeps the playing overlays and locomotion state so their stop signals still
        // reach the listeners.
        match mixers.get_mut(entity) {
            Ok(mut mixer) if rebuild => mixer.set_blend_duration(config.emote.blend_duration),
            _ => {
                entity_commands.insert((
                    EmoteMixer::new(config.emote.blend_duration),
                    LocomotionParams::default(),
                ));
            }
        }

        if current.0.is_none() {
            current.0 = Some(entity);
        }
        if current.0 == Some(entity) {
            gestures.interpreter = GestureInterpreter::new(config.gesture.clone());
            gestures.mapper = GestureTransformMapper::new(config.placement.clone());
        }

        debug!(
            "Avatar {entity} set up with {} meshes",
            rig.meshes.len()
        );
        entity_commands.insert(AvatarSetup { config });
    }
}

fn report(entity: Entity, err: RigSetupError, feature: &str) {
    error!("Avatar {entity}: {err}, {feature} disabled");
}
