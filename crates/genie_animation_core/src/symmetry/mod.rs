use bevy::math::Quat;

/// Mirrors a rotation about the avatar's sagittal (YZ) plane, so yaw and roll change sign while
/// pitch is kept.
pub fn mirror_quat(mut input: Quat) -> Quat {
    input.x *= -1.;
    input.w *= -1.;
    input = -input;
    debug_assert!(input.is_normalized());
    input
}
