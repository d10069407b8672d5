mod events;

use std::collections::VecDeque;

use bevy::{math::Vec2, reflect::Reflect};

pub use events::*;

use crate::config::GestureConfig;

/// Angle of the line from `a` to `b`, counter-clockwise from +X, in [0, 360).
pub fn line_angle(a: Vec2, b: Vec2) -> f32 {
    let h = b - a;
    h.y.atan2(h.x).to_degrees().rem_euclid(360.)
}

/// Wraps an angle difference into [-180, 180).
fn wrap_degrees(delta: f32) -> f32 {
    (delta + 180.).rem_euclid(360.) - 180.
}

/// Turns per-frame touch samples into gesture events.
#[derive(Debug, Clone, Default, Reflect)]
pub struct GestureInterpreter {
    config: GestureConfig,
    previous_count: usize,
    /// Whether the current touch sequence started off-UI
    valid: bool,
    previous_position: Vec2,
    previous_distance: Option<f32>,
    previous_angle: Option<f32>,
    last_touch_up: Option<f32>,
    last_tap_position: Vec2,
    #[reflect(ignore)]
    swipe_samples: VecDeque<f32>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_touching(&self) -> bool {
        self.previous_count > 0 && self.valid
    }

    pub fn interpret(&mut self, frame: &PointerFrame) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        let count = frame.touches.len();

        match (self.previous_count, frame.average_position()) {
            (0, Some(position)) => {
                self.valid = !frame.began_over_ui;
                if self.valid {
                    self.touch_down(frame, position, &mut events);
                }
            }
            (_, Some(position)) if self.valid => {
                if count != self.previous_count {
                    self.reset_baselines(frame, position);
                    if count >= 3 && self.previous_count < 3 {
                        events.push(GestureEvent::ThreeFingerTap { position });
                    }
                } else {
                    self.track(frame, position, &mut events);
                }
            }
            (previous, None) if previous > 0 => {
                if self.valid {
                    self.touch_up(frame, &mut events);
                }
                self.valid = false;
            }
            _ => {}
        }

        self.previous_count = count;
        events
    }

    fn touch_down(&mut self, frame: &PointerFrame, position: Vec2, events: &mut Vec<GestureEvent>) {
        let count = frame.touches.len();
        let quick = self
            .last_touch_up
            .is_some_and(|t| frame.time - t <= self.config.double_tap_interval);
        if count == 1
            && quick
            && position.distance(self.last_tap_position) <= self.config.double_tap_distance
        {
            events.push(GestureEvent::DoubleTap { position });
        }
        events.push(GestureEvent::TouchDown { position });
        if count >= 3 {
            events.push(GestureEvent::ThreeFingerTap { position });
        }

        self.swipe_samples.clear();
        self.reset_baselines(frame, position);
    }

    fn touch_up(&mut self, frame: &PointerFrame, events: &mut Vec<GestureEvent>) {
        let position = self.previous_position;
        events.push(GestureEvent::TouchUp { position });
        if !self.swipe_samples.is_empty() {
            let velocity =
                self.swipe_samples.iter().sum::<f32>() / self.swipe_samples.len() as f32;
            events.push(GestureEvent::SwipeRelease { position, velocity });
        }
        self.last_touch_up = Some(frame.time);
        self.last_tap_position = position;
    }

    fn reset_baselines(&mut self, frame: &PointerFrame, position: Vec2) {
        self.previous_position = position;
        match frame.touches.as_slice() {
            [a, b, ..] => {
                self.previous_distance = Some(a.position.distance(b.position));
                self.previous_angle = Some(line_angle(a.position, b.position));
            }
            _ => {
                self.previous_distance = None;
                self.previous_angle = None;
            }
        }
    }

    fn track(&mut self, frame: &PointerFrame, position: Vec2, events: &mut Vec<GestureEvent>) {
        let delta = position - self.previous_position;
        self.previous_position = position;

        match frame.touches.as_slice() {
            [_] => {
                events.push(GestureEvent::Drag { delta, position });
                self.swipe_samples.push_back(delta.x);
                while self.swipe_samples.len() > self.config.swipe_window {
                    self.swipe_samples.pop_front();
                }
            }
            [a, b, rest @ ..] => {
                let distance = a.position.distance(b.position);
                if let Some(previous) = self.previous_distance.replace(distance) {
                    events.push(GestureEvent::Pinch {
                        delta: distance - previous,
                        pivot: position,
                    });
                }

                let angle = line_angle(a.position, b.position);
                if let Some(previous) = self.previous_angle.replace(angle) {
                    events.push(GestureEvent::Twist {
                        delta_degrees: wrap_degrees(angle - previous),
                        pivot: position,
                    });
                }

                if rest.len() == 1 {
                    events.push(GestureEvent::ThreeFingerDrag { delta, position });
                } else {
                    events.push(GestureEvent::TwoFingerDrag { delta, position });
                }
            }
            [] => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: u64, x: f32, y: f32) -> TouchPoint {
        TouchPoint::new(id, Vec2::new(x, y))
    }

    fn frame(time: f32, touches: &[TouchPoint]) -> PointerFrame {
        PointerFrame::new(time, touches.iter().copied())
    }

    #[test]
    fn tap_then_quick_second_tap_is_double_tap() {
        let mut interpreter = GestureInterpreter::default();
        interpreter.interpret(&frame(0., &[touch(0, 100., 100.)]));
        let up = interpreter.interpret(&frame(0.05, &[]));
        assert!(matches!(up[0], GestureEvent::TouchUp { .. }));

        let down = interpreter.interpret(&frame(0.2, &[touch(1, 110., 95.)]));
        assert!(matches!(down[0], GestureEvent::DoubleTap { .. }));
        assert!(matches!(down[1], GestureEvent::TouchDown { .. }));
    }

    #[test]
    fn slow_or_distant_second_tap_is_not_double_tap() {
        let mut interpreter = GestureInterpreter::default();
        interpreter.interpret(&frame(0., &[touch(0, 100., 100.)]));
        interpreter.interpret(&frame(0.05, &[]));
        let late = interpreter.interpret(&frame(0.5, &[touch(1, 100., 100.)]));
        assert!(!late.iter().any(|e| matches!(e, GestureEvent::DoubleTap { .. })));

        interpreter.interpret(&frame(0.55, &[]));
        let far = interpreter.interpret(&frame(0.6, &[touch(2, 600., 100.)]));
        assert!(!far.iter().any(|e| matches!(e, GestureEvent::DoubleTap { .. })));
    }

    #[test]
    fn drag_reports_delta_and_swipe_velocity_averages_window() {
        let mut interpreter = GestureInterpreter::new(GestureConfig {
            swipe_window: 2,
            ..Default::default()
        });
        interpreter.interpret(&frame(0., &[touch(0, 0., 0.)]));
        let events = interpreter.interpret(&frame(0.016, &[touch(0, 10., 4.)]));
        assert_eq!(
            events,
            vec![GestureEvent::Drag {
                delta: Vec2::new(10., 4.),
                position: Vec2::new(10., 4.)
            }]
        );
        interpreter.interpret(&frame(0.032, &[touch(0, 30., 4.)]));
        interpreter.interpret(&frame(0.048, &[touch(0, 70., 4.)]));

        let events = interpreter.interpret(&frame(0.064, &[]));
        assert_eq!(
            events[1],
            GestureEvent::SwipeRelease {
                position: Vec2::new(70., 4.),
                velocity: 30.
            }
        );
    }

    #[test]
    fn two_fingers_pinch_twist_and_drag() {
        let mut interpreter = GestureInterpreter::default();
        interpreter.interpret(&frame(0., &[touch(0, 0., 0.)]));
        // Second finger lands: baselines reset, nothing else.
        let events = interpreter.interpret(&frame(0.1, &[touch(0, 0., 0.), touch(1, 100., 0.)]));
        assert!(events.is_empty());

        let events = interpreter.interpret(&frame(0.2, &[touch(0, 0., 0.), touch(1, 0., 200.)]));
        assert_eq!(
            events[0],
            GestureEvent::Pinch {
                delta: 100.,
                pivot: Vec2::new(0., 100.)
            }
        );
        match events[1] {
            GestureEvent::Twist { delta_degrees, .. } => {
                assert!((delta_degrees - 90.).abs() < 1e-3)
            }
            other => panic!("expected twist, got {other:?}"),
        }
        assert_eq!(
            events[2],
            GestureEvent::TwoFingerDrag {
                delta: Vec2::new(-50., 100.),
                position: Vec2::new(0., 100.)
            }
        );
    }

    #[test]
    fn twist_across_zero_degrees_is_small() {
        let mut interpreter = GestureInterpreter::default();
        interpreter.interpret(&frame(0., &[touch(0, 0., 0.), touch(1, 100., -1.)]));
        let events = interpreter.interpret(&frame(0.1, &[touch(0, 0., 0.), touch(1, 100., 1.)]));
        let twist = events.iter().find_map(|e| match e {
            GestureEvent::Twist { delta_degrees, .. } => Some(*delta_degrees),
            _ => None,
        });
        assert!(twist.is_some_and(|d| d > 0. && d < 2.));
    }

    #[test]
    fn finger_report_order_does_not_flip_twist() {
        let mut interpreter = GestureInterpreter::default();
        interpreter.interpret(&frame(0., &[touch(3, 0., 0.), touch(7, 100., 0.)]));
        let events = interpreter.interpret(&frame(0.1, &[touch(7, 100., 2.), touch(3, 0., 0.)]));

        let twist = events.iter().find_map(|e| match e {
            GestureEvent::Twist { delta_degrees, .. } => Some(*delta_degrees),
            _ => None,
        });
        assert!(twist.is_some_and(|d| d > 0. && d < 2.));
        assert!(events.iter().any(|e| matches!(
            e,
            GestureEvent::Pinch { delta, .. } if delta.abs() < 0.1
        )));
    }

    #[test]
    fn third_finger_taps_then_drags() {
        let mut interpreter = GestureInterpreter::default();
        let two = [touch(0, 0., 0.), touch(1, 10., 0.)];
        interpreter.interpret(&frame(0., &two));
        let three = [touch(0, 0., 0.), touch(1, 10., 0.), touch(2, 20., 0.)];
        let events = interpreter.interpret(&frame(0.1, &three));
        assert!(matches!(events[..], [GestureEvent::ThreeFingerTap { .. }]));

        let moved = [touch(0, 0., 5.), touch(1, 10., 5.), touch(2, 20., 5.)];
        let events = interpreter.interpret(&frame(0.2, &moved));
        assert!(events.iter().any(|e| matches!(
            e,
            GestureEvent::ThreeFingerDrag { delta, .. } if *delta == Vec2::new(0., 5.)
        )));
        assert!(!events.iter().any(|e| matches!(e, GestureEvent::TwoFingerDrag { .. })));
    }

    #[test]
    fn sequence_started_over_ui_is_ignored() {
        let mut interpreter = GestureInterpreter::default();
        let mut down = frame(0., &[touch(0, 0., 0.)]);
        down.began_over_ui = true;
        assert!(interpreter.interpret(&down).is_empty());
        assert!(interpreter.interpret(&frame(0.1, &[touch(0, 50., 0.)])).is_empty());
        assert!(interpreter.interpret(&frame(0.2, &[])).is_empty());
        assert!(!interpreter.is_touching());
    }
}
