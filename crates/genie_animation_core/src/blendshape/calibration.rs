use bevy::{log::warn, platform::collections::HashMap, reflect::Reflect};
use serde::{Deserialize, Serialize};

use super::FaceChannel;
use crate::config::FaceConfig;

/// Hard ceiling for the eye-look-up channels. Higher values make the upper lid clip through the
/// eyeball on every avatar in the catalogue.
pub const EYE_LOOK_UP_CEILING: f32 = 0.75;

/// Maximum applied to the large-deformation channels when an avatar asks for the restricted
/// range-of-motion preset.
pub const RESTRICTED_FACE_MAX: f32 = 0.5;

const RESTRICTED_CHANNELS: [FaceChannel; 7] = [
    FaceChannel::BrowDownLeft,
    FaceChannel::BrowDownRight,
    FaceChannel::BrowInnerUp,
    FaceChannel::JawOpen,
    FaceChannel::CheekPuff,
    FaceChannel::MouthFunnel,
    FaceChannel::MouthPucker,
];

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ChannelCalibration {
    pub min: f32,
    pub max: f32,
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self { min: 0., max: 1. }
    }
}

impl ChannelCalibration {
    pub fn up_to(max: f32) -> Self {
        Self { min: 0., max }
    }

    pub fn apply(&self, raw: f32) -> f32 {
        raw.max(self.min).min(self.max)
    }
}

/// Per-channel clamp ranges of one avatar. Channels without an entry pass through untouched.
#[derive(Debug, Clone, Default, Reflect)]
pub struct CalibrationTable {
    entries: HashMap<FaceChannel, ChannelCalibration>,
}

impl CalibrationTable {
    pub fn from_config(config: &FaceConfig) -> Self {
        let mut table = Self::default();

        if config.range_of_motion_preset {
            for channel in RESTRICTED_CHANNELS {
                table.set(channel, ChannelCalibration::up_to(RESTRICTED_FACE_MAX));
            }
        }

        let limits = &config.eye_limits;
        table.set_pair(
            FaceChannel::EyeLookDownLeft,
            FaceChannel::EyeLookDownRight,
            limits.look_down.unwrap_or(1.),
        );
        table.set_pair(
            FaceChannel::EyeLookInLeft,
            FaceChannel::EyeLookInRight,
            limits.look_in.unwrap_or(1.),
        );
        table.set_pair(
            FaceChannel::EyeLookOutLeft,
            FaceChannel::EyeLookOutRight,
            limits.look_out.unwrap_or(1.),
        );
        table.set_pair(
            FaceChannel::EyeLookUpLeft,
            FaceChannel::EyeLookUpRight,
            limits.look_up.unwrap_or(1.),
        );

        for (channel, calibration) in &config.calibration {
            table.set(*channel, *calibration);
        }

        table
    }

    /// Installs a calibration, enforcing the eye-look-up ceiling.
    pub fn set(&mut self, channel: FaceChannel, mut calibration: ChannelCalibration) {
        if is_look_up(channel) && calibration.max > EYE_LOOK_UP_CEILING {
            // An unset limit defaults to 1.0, which is not worth a warning.
            if calibration.max < 1. {
                warn!(
                    "{} max {} is above the supported ceiling, clamping to {}",
                    channel.name(),
                    calibration.max,
                    EYE_LOOK_UP_CEILING
                );
            }
            calibration.max = EYE_LOOK_UP_CEILING;
            calibration.min = calibration.min.min(calibration.max);
        }
        self.entries.insert(channel, calibration);
    }

    fn set_pair(&mut self, left: FaceChannel, right: FaceChannel, max: f32) {
        self.set(left, ChannelCalibration::up_to(max));
        self.set(right, ChannelCalibration::up_to(max));
    }

    pub fn get(&self, channel: FaceChannel) -> Option<&ChannelCalibration> {
        self.entries.get(&channel)
    }

    pub fn calibrate(&self, channel: FaceChannel, raw: f32) -> f32 {
        match self.entries.get(&channel) {
            Some(calibration) => calibration.apply(raw),
            None => raw,
        }
    }

    pub fn max(&self, channel: FaceChannel) -> f32 {
        self.entries.get(&channel).map_or(1., |c| c.max)
    }
}

fn is_look_up(channel: FaceChannel) -> bool {
    matches!(
        channel,
        FaceChannel::EyeLookUpLeft | FaceChannel::EyeLookUpRight
    )
}
