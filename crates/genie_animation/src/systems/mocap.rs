use bevy::{
    ecs::{
        entity::Entity,
        query::{With, Without},
        system::{Query, Res},
    },
    time::Time,
    transform::{components::Transform, helper::TransformHelper},
};
use genie_animation_core::{
    gaze::GazeSource,
    prelude::{BlendshapeWeights, EmoteMixer, SpineJoint},
    spine::camera_in_front,
};

use crate::{
    avatar::{AnimatorParameters, AvatarRig, FaceRig, GenieAvatar, SpineMocap},
    resources::{ActiveCamera, CurrentAvatar, FaceCapture, GestureState},
};

/// Samples the joint rotations the animation system produced, before mocap overwrites them.
pub(crate) fn cache_animated_pose(
    mut avatars: Query<(&AvatarRig, &mut SpineMocap), With<GenieAvatar>>,
    joints: Query<&Transform>,
) {
    for (rig, mut mocap) in &mut avatars {
        for joint in SpineJoint::ALL {
            if let Some(transform) = rig.joint(joint).and_then(|e| joints.get(e).ok()) {
                mocap.animated.set(joint, transform.rotation);
            }
        }
    }
}

pub(crate) fn apply_spine_mocap(
    time: Res<Time>,
    capture: Res<FaceCapture>,
    camera: Res<ActiveCamera>,
    mut avatars: Query<
        (&Transform, &AvatarRig, &mut SpineMocap, Option<&EmoteMixer>),
        With<GenieAvatar>,
    >,
    mut joints: Query<&mut Transform, Without<SpineMocap>>,
) {
    let Some(frame) = &capture.frame else {
        return;
    };
    let dt = time.delta_secs();

    for (avatar, rig, mut mocap, mixer) in &mut avatars {
        let should_mirror = camera_in_front(avatar, camera.view.position());
        let blend_weight = mixer.map_or(0., EmoteMixer::blend_weight);
        let animated = mocap.animated;
        let pose = mocap.composer.compose(
            frame.head_rotation,
            should_mirror,
            dt,
            &animated,
            blend_weight,
        );

        for joint in SpineJoint::ALL {
            if let Some(mut transform) = rig.joint(joint).and_then(|e| joints.get_mut(e).ok()) {
                transform.rotation = pose.get(joint);
            }
        }
    }
}

/// Writes capture, gaze and driven blendshapes. Runs after the spine so look-at gaze aims from
/// the head as mocap left it.
pub(crate) fn apply_facial_mocap(
    capture: Res<FaceCapture>,
    camera: Res<ActiveCamera>,
    gestures: Res<GestureState>,
    current: Res<CurrentAvatar>,
    mut avatars: Query<
        (Entity, &AvatarRig, &mut FaceRig, Option<&AnimatorParameters>),
        With<GenieAvatar>,
    >,
    mut meshes: Query<&mut BlendshapeWeights>,
    transform_helper: TransformHelper,
) {
    for (entity, rig, mut face, parameters) in &mut avatars {
        let face = &mut *face;

        let frame = capture.frame.as_ref().map(|frame| {
            face.mapper.ingest(
                frame
                    .coefficients
                    .iter()
                    .map(|(name, value)| (name.as_str(), *value)),
            )
        });
        if let Some(frame) = &frame {
            face.gaze.record_capture(frame);
        }

        let touched = current.0 == Some(entity) && gestures.interpreter.is_touching();
        let eyes = rig
            .eyes
            .filter(|_| face.has_eyes && (touched || face.force_look_at_camera))
            .and_then(|eyes| transform_helper.compute_global_transform(eyes).ok());
        let source = match eyes {
            Some(eyes) => GazeSource::LookAtCamera {
                eyes: eyes.compute_transform(),
                camera: camera.view.position(),
            },
            None => GazeSource::Capture,
        };
        let gaze = face.gaze.compose(source, face.mapper.calibration());

        for (index, mesh) in rig.meshes.iter().enumerate() {
            let Ok(mut weights) = meshes.get_mut(*mesh) else {
                continue;
            };
            if let Some(frame) = &frame {
                face.mapper.apply_to_mesh(index, frame, &mut *weights);
            }
            face.mapper.apply_gaze_to_mesh(index, &gaze, &mut *weights);
            if let Some(parameters) = parameters {
                face.driven
                    .apply_to_mesh(index, &parameters.floats, &mut *weights);
            }
        }
    }
}
