use bevy::{math::Vec3, reflect::Reflect, transform::components::Transform};

use crate::blendshape::{CalibratedFrame, CalibrationTable, FaceChannel};

/// Eye rotation, in degrees, at which a look-at-camera channel saturates
pub const GAZE_RANGE_DEGREES: f32 = 30.;

/// Values of the eight gaze channels, in [`FaceChannel::GAZE`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct GazeSnapshot {
    values: [f32; 8],
}

impl GazeSnapshot {
    pub fn get(&self, channel: FaceChannel) -> f32 {
        channel.gaze_index().map_or(0., |i| self.values[i])
    }

    pub fn set(&mut self, channel: FaceChannel, value: f32) {
        if let Some(i) = channel.gaze_index() {
            self.values[i] = value;
        }
    }

    pub fn values(&self) -> &[f32; 8] {
        &self.values
    }
}

/// Where the gaze values of a frame come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GazeSource {
    /// The last gaze values seen in capture
    Capture,
    /// Aim both eyes at `camera` from the world-space `eyes` transform
    LookAtCamera { eyes: Transform, camera: Vec3 },
}

/// Keeps the last captured gaze and computes procedural look-at-camera gaze.
///
/// Switching between sources is instantaneous: there is no smoothing between the captured and
/// look-at values.
#[derive(Debug, Clone, Default, Reflect)]
pub struct GazeComposer {
    current: GazeSnapshot,
}

impl GazeComposer {
    /// Retains the gaze channels present in `frame`. Channels absent from the frame keep their
    /// previous value.
    pub fn record_capture(&mut self, frame: &CalibratedFrame) {
        for (channel, value) in frame.gaze() {
            self.current.set(channel, value);
        }
    }

    pub fn current(&self) -> &GazeSnapshot {
        &self.current
    }

    pub fn compose(&self, source: GazeSource, calibration: &CalibrationTable) -> GazeSnapshot {
        match source {
            GazeSource::Capture => self.current,
            GazeSource::LookAtCamera { eyes, camera } => look_at(&eyes, camera, calibration),
        }
    }
}

/// Gaze that aims the eyes at `camera`. The eyes look down their local -Z axis, with +X to the
/// avatar's right.
pub fn look_at(eyes: &Transform, camera: Vec3, calibration: &CalibrationTable) -> GazeSnapshot {
    let mut gaze = GazeSnapshot::default();

    let local = eyes.rotation.inverse() * (camera - eyes.translation).normalize_or_zero();
    if local == Vec3::ZERO {
        return gaze;
    }

    let yaw = local.x.atan2(-local.z).to_degrees();
    let pitch = local.y.atan2(local.x.hypot(local.z)).to_degrees();

    let amount = |angle: f32| (angle.abs() / GAZE_RANGE_DEGREES).clamp(0., 1.);
    let mut set = |channel: FaceChannel, value: f32| {
        gaze.set(channel, calibration.calibrate(channel, value));
    };

    if pitch >= 0. {
        set(FaceChannel::EyeLookUpLeft, amount(pitch));
        set(FaceChannel::EyeLookUpRight, amount(pitch));
    } else {
        set(FaceChannel::EyeLookDownLeft, amount(pitch));
        set(FaceChannel::EyeLookDownRight, amount(pitch));
    }

    if yaw > 0. {
        set(FaceChannel::EyeLookOutRight, amount(yaw));
        set(FaceChannel::EyeLookInLeft, amount(yaw));
    } else {
        set(FaceChannel::EyeLookOutLeft, amount(yaw));
        set(FaceChannel::EyeLookInRight, amount(yaw));
    }

    gaze
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EyeLimits, FaceConfig};

    fn calibration() -> CalibrationTable {
        CalibrationTable::from_config(&FaceConfig {
            eye_limits: EyeLimits {
                look_out: Some(0.4),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn nonzero(gaze: &GazeSnapshot, channel: FaceChannel) -> bool {
        gaze.get(channel) != 0.
    }

    #[test]
    fn opposite_channels_are_mutually_exclusive() {
        let eyes = Transform::from_xyz(0., 1.5, 0.);
        let calibration = calibration();
        for x in [-3., -1., -0.2, 0.3, 2.] {
            for y in [-2., -0.5, 0.4, 3.] {
                let gaze = look_at(&eyes, Vec3::new(x, 1.5 + y, -2.), &calibration);
                assert!(
                    nonzero(&gaze, FaceChannel::EyeLookUpLeft)
                        ^ nonzero(&gaze, FaceChannel::EyeLookDownLeft)
                );
                assert!(
                    nonzero(&gaze, FaceChannel::EyeLookInLeft)
                        ^ nonzero(&gaze, FaceChannel::EyeLookOutLeft)
                );
                assert!(
                    nonzero(&gaze, FaceChannel::EyeLookInRight)
                        ^ nonzero(&gaze, FaceChannel::EyeLookOutRight)
                );
            }
        }
    }

    #[test]
    fn dead_ahead_is_all_zero() {
        let eyes = Transform::from_xyz(0., 1.5, 0.);
        let gaze = look_at(&eyes, Vec3::new(0., 1.5, -4.), &calibration());
        assert!(gaze.values().iter().all(|v| *v == 0.));
    }

    #[test]
    fn camera_to_the_right_turns_both_eyes_right() {
        let eyes = Transform::from_xyz(0., 0., 0.);
        // 45 degrees to the right saturates the 30 degree range
        let gaze = look_at(&eyes, Vec3::new(1., 0., -1.), &calibration());
        assert_eq!(gaze.get(FaceChannel::EyeLookInLeft), 1.);
        assert_eq!(gaze.get(FaceChannel::EyeLookOutRight), 0.4);
        assert_eq!(gaze.get(FaceChannel::EyeLookOutLeft), 0.);
    }

    #[test]
    fn look_up_respects_ceiling_and_eye_rotation() {
        // Eyes turned 90 degrees left: a camera on their left is dead ahead.
        let eyes = Transform::from_rotation(bevy::math::Quat::from_rotation_y(
            std::f32::consts::FRAC_PI_2,
        ));
        let gaze = look_at(&eyes, Vec3::new(-2., 2., 0.), &calibration());
        assert_eq!(gaze.get(FaceChannel::EyeLookUpLeft), 0.75);
        assert!(gaze.get(FaceChannel::EyeLookInLeft).abs() < 1e-4);
        assert!(gaze.get(FaceChannel::EyeLookOutLeft).abs() < 1e-4);
    }

    #[test]
    fn capture_gaze_is_retained_between_frames() {
        let mut composer = GazeComposer::default();
        let mut frame = CalibratedFrame::default();
        frame.set(FaceChannel::EyeLookDownLeft, 0.3);
        frame.set(FaceChannel::JawOpen, 0.9);
        composer.record_capture(&frame);
        composer.record_capture(&CalibratedFrame::default());

        let gaze = composer.compose(GazeSource::Capture, &calibration());
        assert_eq!(gaze.get(FaceChannel::EyeLookDownLeft), 0.3);
        assert_eq!(gaze.get(FaceChannel::JawOpen), 0.);
    }
}
