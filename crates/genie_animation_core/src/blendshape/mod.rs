mod calibration;
mod channel;
pub mod driven;
mod mapper;
pub mod name_table;

use bevy::{ecs::component::Component, prelude::ReflectComponent, reflect::Reflect};

pub use calibration::*;
pub use channel::*;
pub use mapper::*;

/// Anything exposing an indexed, named set of blendshape weights.
pub trait BlendshapeTarget {
    fn shape_count(&self) -> usize;
    fn shape_name(&self, index: usize) -> Option<&str>;
    fn weight(&self, index: usize) -> Option<f32>;
    fn set_weight(&mut self, index: usize, weight: f32);
    /// Weight at which the shape is fully applied
    fn full_weight(&self, index: usize) -> f32;
}

/// Blendshape weights of one skinned mesh.
///
/// `full_weights` holds the weight of each shape's last authored frame; a calibrated value of 1
/// maps onto it for driven attributes.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct BlendshapeWeights {
    pub names: Vec<String>,
    pub weights: Vec<f32>,
    pub full_weights: Vec<f32>,
}

impl BlendshapeWeights {
    /// Shapes named `names`, all at rest, fully applied at weight 100.
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let count = names.len();
        Self {
            names,
            weights: vec![0.; count],
            full_weights: vec![100.; count],
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn weight_by_name(&self, name: &str) -> Option<f32> {
        self.index_of(name).and_then(|i| self.weight(i))
    }

    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = 0.);
    }
}

impl BlendshapeTarget for BlendshapeWeights {
    fn shape_count(&self) -> usize {
        self.names.len()
    }

    fn shape_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    fn weight(&self, index: usize) -> Option<f32> {
        self.weights.get(index).copied()
    }

    fn set_weight(&mut self, index: usize, weight: f32) {
        if let Some(w) = self.weights.get_mut(index) {
            *w = weight;
        }
    }

    fn full_weight(&self, index: usize) -> f32 {
        self.full_weights.get(index).copied().unwrap_or(100.)
    }
}
