use bevy::{
    ecs::{
        message::MessageWriter,
        system::{Res, ResMut},
    },
    input::touch::Touches,
    math::Vec2,
    time::Time,
};
use genie_animation_core::prelude::{GestureEvent, PointerFrame, TouchPoint};

use crate::resources::{ActiveCamera, GestureState, PointerInput};

/// Copies Bevy's touches into [`PointerInput`], moving the origin to the bottom-left corner.
pub(crate) fn read_touches(
    touches: Option<Res<Touches>>,
    camera: Res<ActiveCamera>,
    mut input: ResMut<PointerInput>,
) {
    let Some(touches) = touches else {
        return;
    };
    let height = camera.view.viewport.y;
    input.touches = touches
        .iter()
        .map(|touch| {
            let position = touch.position();
            TouchPoint::new(touch.id(), Vec2::new(position.x, height - position.y))
        })
        .collect();
}

pub(crate) fn interpret_gestures(
    time: Res<Time>,
    input: Res<PointerInput>,
    mut gestures: ResMut<GestureState>,
    mut events: MessageWriter<GestureEvent>,
) {
    let mut frame = PointerFrame::new(time.elapsed_secs(), input.touches.iter().copied());
    frame.began_over_ui = input.began_over_ui;
    events.write_batch(gestures.interpreter.interpret(&frame));
}
