use bevy::{ecs::message::Message, math::Vec2, reflect::Reflect};

/// One contact of a touch sample, in pixels with the origin at the bottom-left of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
}

impl TouchPoint {
    pub fn new(id: u64, position: Vec2) -> Self {
        Self { id, position }
    }
}

/// All touches of one frame.
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct PointerFrame {
    pub touches: Vec<TouchPoint>,
    /// Seconds since startup
    pub time: f32,
    /// Set by the gesture source when the contact that started this sequence landed on UI.
    /// Only read on the first frame of a sequence.
    pub began_over_ui: bool,
}

impl PointerFrame {
    /// Builds a frame with its contacts ordered by touch id, so "the first two fingers" stay the
    /// same fingers from frame to frame whatever order the platform reports them in.
    pub fn new(time: f32, touches: impl IntoIterator<Item = TouchPoint>) -> Self {
        let mut touches: Vec<TouchPoint> = touches.into_iter().collect();
        touches.sort_by_key(|touch| touch.id);
        Self {
            touches,
            time,
            began_over_ui: false,
        }
    }

    pub fn average_position(&self) -> Option<Vec2> {
        if self.touches.is_empty() {
            return None;
        }
        let sum: Vec2 = self.touches.iter().map(|t| t.position).sum();
        Some(sum / self.touches.len() as f32)
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Reflect)]
pub enum GestureEvent {
    TouchDown { position: Vec2 },
    DoubleTap { position: Vec2 },
    /// Single finger movement since last frame
    Drag { delta: Vec2, position: Vec2 },
    TouchUp { position: Vec2 },
    /// Mean horizontal drag speed, in pixels per frame, over the last few frames of the touch
    SwipeRelease { position: Vec2, velocity: f32 },
    /// Change of distance between the first two fingers, in pixels
    Pinch { delta: f32, pivot: Vec2 },
    /// Counter-clockwise rotation of the line through the first two fingers
    Twist { delta_degrees: f32, pivot: Vec2 },
    TwoFingerDrag { delta: Vec2, position: Vec2 },
    ThreeFingerDrag { delta: Vec2, position: Vec2 },
    ThreeFingerTap { position: Vec2 },
}
