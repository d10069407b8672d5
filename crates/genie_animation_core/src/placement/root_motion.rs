use bevy::{math::{Quat, Vec3}, transform::components::Transform};

/// Moves the drift a root-motion clip put on the skeletal root back into the avatar transform.
/// The skeletal root's world pose is unchanged; its local pose returns to `rest_offset`.
pub fn fold_root_motion(avatar: &mut Transform, skeletal_root: &mut Transform, rest_offset: Vec3) {
    let root_world = avatar.transform_point(skeletal_root.translation);
    avatar.rotation = (avatar.rotation * skeletal_root.rotation).normalize();
    avatar.translation = root_world - avatar.rotation * (rest_offset * avatar.scale);

    skeletal_root.translation = rest_offset;
    skeletal_root.rotation = Quat::IDENTITY;
}
