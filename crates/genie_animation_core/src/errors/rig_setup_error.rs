use bevy::reflect::Reflect;
use thiserror::Error;

use crate::spine::SpineJoint;

/// A rig component some feature depends on is not present on the avatar.
///
/// These never abort the avatar: the feature that needed the component is skipped for that
/// avatar instance and the error is logged.
#[non_exhaustive]
#[derive(Debug, Error, Reflect, Clone, PartialEq)]
pub enum RigSetupError {
    #[error("avatar has no skinned mesh with blendshapes")]
    MissingSkinnedMesh,
    #[error("spine joint {0:?} is missing from the rig")]
    MissingJoint(SpineJoint),
    #[error("avatar has no skeleton root")]
    MissingSkeletonRoot,
    #[error("avatar has no eyes transform to aim gaze from")]
    MissingEyes,
}

pub type RigResult<T> = Result<T, RigSetupError>;
