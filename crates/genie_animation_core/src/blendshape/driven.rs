//! Blendshapes driven by animator float parameters rather than by facial capture.
//!
//! Emote clips animate a handful of named parameters (e.g. `smile`, `blink`). Each parameter
//! can drive several output shapes across sub-meshes, optionally keeping only one sign of the
//! signal.

use bevy::{ecs::component::Component, platform::collections::HashMap, reflect::Reflect};
use serde::{Deserialize, Serialize};

use super::BlendshapeTarget;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum RetargetBehavior {
    #[default]
    Unchanged,
    /// Keeps only positive values
    PositiveControl,
    /// Keeps only negative values, flipped positive
    NegativeControl,
}

impl RetargetBehavior {
    pub fn apply(&self, value: f32) -> f32 {
        match self {
            Self::Unchanged => value,
            Self::PositiveControl => value.max(0.),
            Self::NegativeControl => {
                if value < 0. {
                    -value
                } else {
                    0.
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct DrivenAttribute {
    pub output_channel: String,
    pub target_submeshes: Vec<String>,
    #[serde(default)]
    pub retarget: RetargetBehavior,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct DrivenChannel {
    pub input_parameter: String,
    pub driven: Vec<DrivenAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
struct Binding {
    mesh: usize,
    slot: usize,
    full_weight: f32,
    retarget: RetargetBehavior,
}

/// Resolved bindings from animator parameters to mesh blendshape slots.
#[derive(Component, Debug, Clone, Default, Reflect)]
pub struct DrivenBlendshapes {
    channels: Vec<DrivenChannel>,
    bindings: HashMap<String, Vec<Binding>>,
}

impl DrivenBlendshapes {
    pub fn new(channels: Vec<DrivenChannel>) -> Self {
        Self {
            channels,
            bindings: HashMap::default(),
        }
    }

    /// Resolves output shape names against `meshes`. A shape matches either as
    /// `{submesh}_blendShape.{output}` or as the bare output name.
    pub fn bind<'a, T: BlendshapeTarget + 'a>(&mut self, meshes: impl IntoIterator<Item = &'a T>) {
        let meshes: Vec<&T> = meshes.into_iter().collect();
        self.bindings.clear();

        for channel in &self.channels {
            let bindings = self
                .bindings
                .entry(channel.input_parameter.clone())
                .or_default();
            for attribute in &channel.driven {
                let mut names: Vec<String> = attribute
                    .target_submeshes
                    .iter()
                    .map(|submesh| format!("{submesh}_blendShape.{}", attribute.output_channel))
                    .collect();
                names.push(attribute.output_channel.clone());

                for (mesh, target) in meshes.iter().enumerate() {
                    for slot in 0..target.shape_count() {
                        if target
                            .shape_name(slot)
                            .is_some_and(|n| names.iter().any(|candidate| candidate == n))
                        {
                            bindings.push(Binding {
                                mesh,
                                slot,
                                full_weight: target.full_weight(slot),
                                retarget: attribute.retarget,
                            });
                        }
                    }
                }
            }
        }
    }

    pub fn bound_slot_count(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    /// Writes the driven weights for mesh `mesh_index` from the current parameter values.
    /// Parameters missing from `parameters` leave their shapes untouched.
    pub fn apply_to_mesh(
        &self,
        mesh_index: usize,
        parameters: &HashMap<String, f32>,
        target: &mut impl BlendshapeTarget,
    ) {
        for (parameter, bindings) in &self.bindings {
            let Some(value) = parameters.get(parameter) else {
                continue;
            };
            for binding in bindings.iter().filter(|b| b.mesh == mesh_index) {
                target.set_weight(binding.slot, binding.retarget.apply(*value) * binding.full_weight);
            }
        }
    }
}
