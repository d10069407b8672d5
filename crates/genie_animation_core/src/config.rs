//! Per-avatar tuning, readable from RON.
//!
//! ```ron
//! (
//!     face: (
//!         blendshape_scale: 100.0,
//!         eye_limits: (look_up: Some(0.6)),
//!         calibration: { JawOpen: (min: 0.0, max: 0.8) },
//!     ),
//!     emote: (blend_duration: 0.25),
//! )
//! ```
//!
//! Every field has a default, so any subset may be given.

use std::{collections::BTreeMap, path::Path};

use bevy::{
    asset::{Asset, ReflectAsset},
    log::warn,
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::{
    blendshape::{ChannelCalibration, FaceChannel},
    errors::ConfigError,
    spine::SpineJoint,
};

#[derive(Asset, Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Asset)]
#[serde(default)]
pub struct AvatarRigConfig {
    pub face: FaceConfig,
    pub emote: EmoteConfig,
    pub spine: SpineConfig,
    pub gesture: GestureConfig,
    pub placement: PlacementConfig,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Mesh weight written for a calibrated value of 1
    pub blendshape_scale: f32,
    pub eye_limits: EyeLimits,
    /// Restricts the large-deformation channels (jaw, brows, cheeks, funnel, pucker) to half range
    pub range_of_motion_preset: bool,
    pub calibration: BTreeMap<FaceChannel, ChannelCalibration>,
    pub force_look_at_camera: bool,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            blendshape_scale: 100.,
            eye_limits: EyeLimits::default(),
            range_of_motion_preset: false,
            calibration: BTreeMap::new(),
            force_look_at_camera: false,
        }
    }
}

/// Eye range-of-motion limits, in calibrated units. `None` means unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeLimits {
    pub look_up: Option<f32>,
    pub look_down: Option<f32>,
    pub look_in: Option<f32>,
    pub look_out: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct EmoteConfig {
    /// Duration of every overlay cross-fade, in seconds
    pub blend_duration: f32,
}

impl Default for EmoteConfig {
    fn default() -> Self {
        Self {
            blend_duration: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineConfig {
    /// Time taken to swap between mirrored and pass-through head rotation
    pub mirror_threshold: f32,
    /// Fraction of the head rotation each joint receives, indexed by [`SpineJoint::index`]
    pub influences: [f32; 5],
}

impl Default for SpineConfig {
    fn default() -> Self {
        Self {
            mirror_threshold: 0.25,
            influences: SpineJoint::ALL.map(|joint| joint.default_influence()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub double_tap_interval: f32,
    /// Maximum distance, in pixels, between the two taps of a double tap
    pub double_tap_distance: f32,
    /// Number of drag samples averaged into the swipe release velocity
    pub swipe_window: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_tap_interval: 0.25,
            double_tap_distance: 300.,
            swipe_window: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub min_scale: f32,
    pub meters_per_pixel: f32,
    /// Yaw per horizontal drag pixel. Positive turns the avatar's front along with the finger.
    pub pixels_to_degrees: f32,
    /// Total angle turned by the reference yaw animation, in degrees
    pub yaw_reference_angle: f32,
    /// Duration of the reference yaw animation, in seconds
    pub yaw_reference_duration: f32,
    /// Joystick walk speed at full deflection and scale 1, in meters per second
    pub translation_speed: f32,
    pub min_walk_run_speed: f32,
    /// Rate at which the avatar turns toward its joystick heading
    pub turn_rate: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            meters_per_pixel: 0.0005,
            pixels_to_degrees: 0.5,
            yaw_reference_angle: 90.,
            yaw_reference_duration: 1.567,
            translation_speed: 2.,
            min_walk_run_speed: 0.5,
            turn_rate: 10.,
        }
    }
}

impl AvatarRigConfig {
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::de::from_str(source)?;
        Ok(config.validated())
    }

    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = ron::de::from_bytes(bytes)?;
        Ok(config.validated())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron(&source)
    }

    /// Clamps out-of-range values into their supported ranges, warning about each one.
    pub fn validated(mut self) -> Self {
        let face = &mut self.face;
        for (name, limit) in [
            ("look_up", &mut face.eye_limits.look_up),
            ("look_down", &mut face.eye_limits.look_down),
            ("look_in", &mut face.eye_limits.look_in),
            ("look_out", &mut face.eye_limits.look_out),
        ] {
            if let Some(value) = limit {
                *value = clamp_unit(name, *value);
            }
        }
        for (channel, calibration) in face.calibration.iter_mut() {
            calibration.max = clamp_unit(channel.name(), calibration.max);
            calibration.min = clamp_unit(channel.name(), calibration.min).min(calibration.max);
        }
        if face.blendshape_scale < 0. {
            warn!(
                "Negative blendshape scale {}, using 0",
                face.blendshape_scale
            );
            face.blendshape_scale = 0.;
        }

        positive_or_default(
            "emote.blend_duration",
            &mut self.emote.blend_duration,
            EmoteConfig::default().blend_duration,
        );
        positive_or_default(
            "spine.mirror_threshold",
            &mut self.spine.mirror_threshold,
            SpineConfig::default().mirror_threshold,
        );
        for (joint, influence) in SpineJoint::ALL.iter().zip(self.spine.influences.iter_mut()) {
            *influence = clamp_unit(joint.name(), *influence);
        }
        positive_or_default(
            "placement.min_scale",
            &mut self.placement.min_scale,
            PlacementConfig::default().min_scale,
        );
        positive_or_default(
            "placement.yaw_reference_angle",
            &mut self.placement.yaw_reference_angle,
            PlacementConfig::default().yaw_reference_angle,
        );
        if self.gesture.swipe_window == 0 {
            warn!("gesture.swipe_window must hold at least one sample, using 1");
            self.gesture.swipe_window = 1;
        }

        self
    }
}

fn clamp_unit(name: &str, value: f32) -> f32 {
    if !(0. ..=1.).contains(&value) {
        let clamped = value.clamp(0., 1.);
        warn!("{name} = {value} is outside [0, 1], clamping to {clamped}");
        clamped
    } else {
        value
    }
}

fn positive_or_default(name: &str, value: &mut f32, default: f32) {
    if !(*value > 0.) {
        warn!("{name} = {value} must be positive, using {default}");
        *value = default;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_fills_defaults() {
        let config = AvatarRigConfig::from_ron(
            r#"(
                face: (
                    blendshape_scale: 1.0,
                    eye_limits: (look_up: Some(0.6)),
                    calibration: { JawOpen: (min: 0.0, max: 0.8) },
                ),
            )"#,
        )
        .unwrap();

        assert_eq!(config.face.blendshape_scale, 1.);
        assert_eq!(config.face.eye_limits.look_up, Some(0.6));
        assert_eq!(config.face.eye_limits.look_down, None);
        assert_eq!(
            config.face.calibration.get(&FaceChannel::JawOpen),
            Some(&ChannelCalibration { min: 0., max: 0.8 })
        );
        assert_eq!(config.emote, EmoteConfig::default());
        assert_eq!(config.placement.min_scale, 0.1);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = AvatarRigConfig::from_ron(
            r#"(
                face: (
                    eye_limits: (look_in: Some(1.5)),
                    calibration: { BrowDownLeft: (min: 0.4, max: -2.0) },
                ),
                emote: (blend_duration: 0.0),
                gesture: (swipe_window: 0),
            )"#,
        )
        .unwrap();

        assert_eq!(config.face.eye_limits.look_in, Some(1.));
        let brow = config.face.calibration[&FaceChannel::BrowDownLeft];
        assert_eq!(brow.max, 0.);
        assert_eq!(brow.min, 0.);
        assert_eq!(config.emote.blend_duration, 0.25);
        assert_eq!(config.gesture.swipe_window, 1);
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(matches!(
            AvatarRigConfig::from_ron("(face: (blendshape_scale: \"big\"))"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn default_spine_influences_decrease_up_the_chain() {
        let config = SpineConfig::default();
        assert_eq!(config.influences, [0.85, 0.30, 0.25, 0.25, 0.15]);
    }
}
