use bevy::log::{debug, warn};
use indexmap::IndexSet;

use super::{BlendshapeTarget, CalibrationTable, FaceChannel, name_table::resolve_shape_name};
use crate::{
    config::FaceConfig,
    errors::{RigResult, RigSetupError},
    gaze::GazeSnapshot,
};

/// For one mesh, the local blendshape slots each canonical channel drives.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshChannelSlots {
    slots: Vec<IndexSet<usize>>,
}

impl Default for MeshChannelSlots {
    fn default() -> Self {
        Self {
            slots: vec![IndexSet::new(); FaceChannel::COUNT],
        }
    }
}

impl MeshChannelSlots {
    /// Name-matches every shape of `target`. Names that resolve to no channel are appended to
    /// `unmapped`.
    pub fn build(target: &impl BlendshapeTarget, unmapped: &mut IndexSet<String>) -> Self {
        let mut slots = Self::default();
        for index in 0..target.shape_count() {
            let Some(name) = target.shape_name(index) else {
                continue;
            };
            match resolve_shape_name(name) {
                Some(channel) => {
                    slots.slots[channel.index()].insert(index);
                }
                None => {
                    unmapped.insert(name.to_string());
                }
            }
        }
        slots
    }

    pub fn slots(&self, channel: FaceChannel) -> impl Iterator<Item = usize> + '_ {
        self.slots[channel.index()].iter().copied()
    }

    pub fn mapped_count(&self) -> usize {
        self.slots.iter().map(IndexSet::len).sum()
    }
}

/// Calibrated values of one capture frame, by channel. Channels missing from the capture are
/// `None` and leave mesh weights untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedFrame {
    values: [Option<f32>; FaceChannel::COUNT],
}

impl Default for CalibratedFrame {
    fn default() -> Self {
        Self {
            values: [None; FaceChannel::COUNT],
        }
    }
}

impl CalibratedFrame {
    pub fn get(&self, channel: FaceChannel) -> Option<f32> {
        self.values[channel.index()]
    }

    pub fn set(&mut self, channel: FaceChannel, value: f32) {
        self.values[channel.index()] = Some(value);
    }

    /// Gaze channel values carried by this frame
    pub fn gaze(&self) -> impl Iterator<Item = (FaceChannel, f32)> + '_ {
        FaceChannel::GAZE
            .iter()
            .filter_map(|c| self.get(*c).map(|v| (*c, v)))
    }
}

/// Routes facial capture coefficients onto the blendshape slots of an avatar's meshes.
#[derive(Debug, Clone, Default)]
pub struct BlendshapeSignalMapper {
    meshes: Vec<MeshChannelSlots>,
    calibration: CalibrationTable,
    shape_scale: f32,
    unmapped_shapes: IndexSet<String>,
    unknown_capture: IndexSet<String>,
    mapped: bool,
}

impl BlendshapeSignalMapper {
    pub fn new(calibration: CalibrationTable, shape_scale: f32) -> Self {
        Self {
            calibration,
            shape_scale,
            ..Default::default()
        }
    }

    pub fn from_config(config: &FaceConfig) -> Self {
        Self::new(
            CalibrationTable::from_config(config),
            config.blendshape_scale,
        )
    }

    /// Builds the per-mesh slot maps. Mesh indices used by the `apply_*` methods follow the
    /// order of `meshes`.
    ///
    /// Calling this again rebuilds the maps from scratch.
    pub fn map_meshes<'a, T: BlendshapeTarget + 'a>(
        &mut self,
        meshes: impl IntoIterator<Item = &'a T>,
    ) -> RigResult<()> {
        if self.mapped {
            warn!("Blendshape mapping requested for an avatar that is already mapped, rebuilding");
        }

        self.unmapped_shapes.clear();
        self.meshes = meshes
            .into_iter()
            .map(|mesh| MeshChannelSlots::build(mesh, &mut self.unmapped_shapes))
            .collect();
        self.mapped = true;

        if !self.unmapped_shapes.is_empty() {
            debug!(
                "{} blendshapes have no canonical channel: {:?}",
                self.unmapped_shapes.len(),
                self.unmapped_shapes
            );
        }

        if self.meshes.iter().all(|m| m.mapped_count() == 0) {
            return Err(RigSetupError::MissingSkinnedMesh);
        }

        Ok(())
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn mesh_slots(&self, mesh_index: usize) -> Option<&MeshChannelSlots> {
        self.meshes.get(mesh_index)
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    pub fn shape_scale(&self) -> f32 {
        self.shape_scale
    }

    pub fn unmapped_shapes(&self) -> &IndexSet<String> {
        &self.unmapped_shapes
    }

    pub fn unknown_capture_names(&self) -> &IndexSet<String> {
        &self.unknown_capture
    }

    /// Resolves and calibrates a list of named capture coefficients. A channel named twice keeps
    /// the last value.
    pub fn ingest<'a>(
        &mut self,
        coefficients: impl IntoIterator<Item = (&'a str, f32)>,
    ) -> CalibratedFrame {
        let mut frame = CalibratedFrame::default();
        for (name, raw) in coefficients {
            match FaceChannel::from_capture_name(name) {
                Some(channel) => frame.set(channel, self.calibration.calibrate(channel, raw)),
                None => {
                    if self.unknown_capture.insert(name.to_string()) {
                        debug!("Capture channel {name:?} has no canonical channel, ignoring");
                    }
                }
            }
        }
        frame
    }

    /// Writes every non-gaze channel of `frame` onto the slots of mesh `mesh_index`.
    pub fn apply_to_mesh(
        &self,
        mesh_index: usize,
        frame: &CalibratedFrame,
        target: &mut impl BlendshapeTarget,
    ) {
        let Some(slots) = self.meshes.get(mesh_index) else {
            return;
        };
        for channel in FaceChannel::ALL.iter().filter(|c| !c.is_gaze()) {
            if let Some(value) = frame.get(*channel) {
                for slot in slots.slots(*channel) {
                    target.set_weight(slot, value * self.shape_scale);
                }
            }
        }
    }

    pub fn apply_gaze_to_mesh(
        &self,
        mesh_index: usize,
        gaze: &GazeSnapshot,
        target: &mut impl BlendshapeTarget,
    ) {
        let Some(slots) = self.meshes.get(mesh_index) else {
            return;
        };
        for channel in FaceChannel::GAZE {
            let value = gaze.get(channel);
            for slot in slots.slots(channel) {
                target.set_weight(slot, value * self.shape_scale);
            }
        }
    }

    /// Calibrates a single named coefficient and writes it to every mesh. Gaze channels are
    /// calibrated but not written.
    ///
    /// Returns the calibrated value, or `None` when the name has no canonical channel.
    #[cfg(test)]
    fn apply_coefficient<T: BlendshapeTarget>(
        &mut self,
        name: &str,
        raw: f32,
        meshes: &mut [T],
    ) -> Option<f32> {
        let frame = self.ingest([(name, raw)]);
        for (mesh_index, mesh) in meshes.iter_mut().enumerate() {
            self.apply_to_mesh(mesh_index, &frame, mesh);
        }
        FaceChannel::ALL.iter().find_map(|c| frame.get(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blendshape::BlendshapeWeights;

    fn head_mesh() -> BlendshapeWeights {
        BlendshapeWeights::from_names([
            "head_blendShape.jawOpen",
            "head_blendShape.MOUTH_FUNNELER_LT",
            "head_blendShape.MOUTH_FUNNELER_RT",
            "head_blendShape.MOUTH_FUNNELER_LB",
            "head_blendShape.MOUTH_FUNNELER_RB",
            "head_blendShape.EYES_LOOK_UP_L",
            "head_blendShape.customWrinkle",
        ])
    }

    fn mapped(config: &FaceConfig, meshes: &[BlendshapeWeights]) -> BlendshapeSignalMapper {
        let mut mapper = BlendshapeSignalMapper::from_config(config);
        mapper.map_meshes(meshes).unwrap();
        mapper
    }

    #[test]
    fn uncalibrated_jaw_open_passes_through_scaled() {
        let mut meshes = [head_mesh()];
        let mut mapper = mapped(&FaceConfig::default(), &meshes);

        let calibrated = mapper.apply_coefficient("jawOpen", 0.6, &mut meshes);

        assert_eq!(calibrated, Some(0.6));
        assert!((meshes[0].weight_by_name("head_blendShape.jawOpen").unwrap() - 60.).abs() < 1e-4);
    }

    #[test]
    fn one_channel_drives_all_merged_slots() {
        let mut meshes = [head_mesh()];
        let mut mapper = mapped(&FaceConfig::default(), &meshes);

        mapper.apply_coefficient("mouthFunnel", 0.3, &mut meshes);

        let funnel: Vec<f32> = meshes[0].weights[1..5].to_vec();
        assert!(funnel.iter().all(|w| (w - 30.).abs() < 1e-4));
        assert_eq!(meshes[0].weights[0], 0.);
    }

    #[test]
    fn gaze_channels_are_not_written_directly() {
        let mut meshes = [head_mesh()];
        let mut mapper = mapped(&FaceConfig::default(), &meshes);

        let calibrated = mapper.apply_coefficient("eyeLookUpLeft", 0.9, &mut meshes);

        assert_eq!(calibrated, Some(0.75));
        assert_eq!(meshes[0].weights[5], 0.);
    }

    #[test]
    fn remapping_is_idempotent() {
        let meshes = [head_mesh(), head_mesh()];
        let mut mapper = mapped(&FaceConfig::default(), &meshes);
        let first = mapper.mesh_slots(0).cloned();

        mapper.map_meshes(&meshes).unwrap();

        assert_eq!(mapper.mesh_count(), 2);
        assert_eq!(mapper.mesh_slots(0).cloned(), first);
        assert_eq!(
            mapper
                .mesh_slots(0)
                .unwrap()
                .slots(FaceChannel::MouthFunnel)
                .count(),
            4
        );
        assert_eq!(mapper.unmapped_shapes().len(), 1);
    }

    #[test]
    fn unknown_names_are_recorded_not_applied() {
        let mut meshes = [head_mesh()];
        let mut mapper = mapped(&FaceConfig::default(), &meshes);

        assert_eq!(mapper.apply_coefficient("noseWiggle", 1., &mut meshes), None);
        assert!(mapper.unknown_capture_names().contains("noseWiggle"));
        assert!(meshes[0].weights.iter().all(|w| *w == 0.));
    }

    #[test]
    fn meshes_without_known_shapes_fail_setup() {
        let meshes = [BlendshapeWeights::from_names(["body_blendShape.muscle"])];
        let mut mapper = BlendshapeSignalMapper::from_config(&FaceConfig::default());
        assert_eq!(
            mapper.map_meshes(&meshes),
            Err(RigSetupError::MissingSkinnedMesh)
        );
    }
}
