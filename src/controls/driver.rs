//! Turns mouse input into [`OrbitControls`] motion while the controls own the camera.

use bevy_ecs::prelude::*;
use bevy_input::{
    mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
};
use bevy_time::prelude::*;
use bevy_transform::prelude::*;

use super::{OrbitControls, PoseWriter};

/// Pixel scroll deltas are converted to lines at this rate.
const PIXELS_PER_LINE: f32 = 100.0;

/// Drive every enabled [`OrbitControls`] that owns its pose, and apply the smoothed pose to the
/// camera transform.
pub fn drive_orbit_controls(
    mut controls: Query<(&mut OrbitControls, &mut Transform)>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    time: Res<Time>,
) {
    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let panning = buttons.pressed(MouseButton::Right)
        || (shift && buttons.pressed(MouseButton::Left));
    let orbiting = !panning && buttons.pressed(MouseButton::Left);
    let scroll_lines = match scroll.unit {
        MouseScrollUnit::Line => scroll.delta.y,
        MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_LINE,
    };

    for (mut controls, mut transform) in &mut controls {
        if !controls.enabled || controls.writer() != PoseWriter::Controls {
            continue;
        }

        if motion.delta != bevy_math::Vec2::ZERO {
            if panning {
                controls.pan(motion.delta);
            } else if orbiting {
                controls.orbit(motion.delta);
            }
        }
        if scroll_lines != 0.0 {
            controls.zoom(scroll_lines);
        }

        let dt = controls.smoothing.clamp_delta(time.delta_secs());
        controls.tick(dt);
        controls.apply_to_transform(&mut transform);
    }
}
