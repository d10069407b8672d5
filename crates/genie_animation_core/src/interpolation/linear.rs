use bevy::math::Quat;

use crate::spine::SpinePose;

pub trait InterpolateLinear {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self;
}

impl InterpolateLinear for Quat {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.slerp(*other, f)
    }
}

impl InterpolateLinear for SpinePose {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        let mut result = *self;
        for (rotation, target) in result.rotations.iter_mut().zip(other.rotations.iter()) {
            *rotation = rotation.interpolate_linear(target, f);
        }
        result
    }
}
