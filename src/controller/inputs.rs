//! Pointer, keyboard, and wheel input for the parallax animator.

use bevy_ecs::prelude::*;
use bevy_input::{mouse::MouseWheel, prelude::*};
use bevy_math::prelude::*;
use bevy_window::{CursorMoved, Window};

use super::{
    component::ParallaxCam,
    zoom::{DistanceNudge, DollySource},
};

/// Sent whenever the pointer moves over a camera's window while the animator is following it.
///
/// Hosts can use the first one to dismiss onboarding hints.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ParallaxPointerMoved {
    /// The camera entity whose animator received the pointer.
    pub camera: Entity,
    /// The normalized pointer position.
    pub pointer: Vec2,
}

/// Map a pointer position in logical pixels to `[-1, 1]` on both axes, with `(0, 0)` at the
/// centre of the window and `y` growing downward. Returns `None` for an empty window.
pub fn normalize_pointer(position: Vec2, window_size: Vec2) -> Option<Vec2> {
    if !(window_size.x > 0.0 && window_size.y > 0.0) {
        return None;
    }
    Some((position / window_size * 2.0 - Vec2::ONE).clamp(Vec2::NEG_ONE, Vec2::ONE))
}

/// Feed the latest cursor position to every enabled [`ParallaxCam`].
pub fn track_pointer(
    mut cursor: EventReader<CursorMoved>,
    windows: Query<&Window>,
    mut cameras: Query<(Entity, &mut ParallaxCam)>,
    mut moved: EventWriter<ParallaxPointerMoved>,
) {
    let Some(latest) = cursor.read().last() else {
        return;
    };
    let Ok(window) = windows.get(latest.window) else {
        return;
    };
    let Some(pointer) = normalize_pointer(latest.position, window.size()) else {
        return;
    };

    for (camera, mut cam) in &mut cameras {
        if !cam.enabled {
            continue;
        }
        cam.set_pointer(pointer);
        moved.write(ParallaxPointerMoved {
            camera,
            pointer: cam.pointer(),
        });
    }
}

/// `+` dollies out and `-` dollies in.
pub fn dolly_from_keyboard(keys: Res<ButtonInput<KeyCode>>, mut cameras: Query<&mut ParallaxCam>) {
    let mut nudges = Vec::with_capacity(2);
    if keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        nudges.push(DistanceNudge::Increase);
    }
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        nudges.push(DistanceNudge::Decrease);
    }
    apply_dolly(&nudges, DollySource::Keyboard, &mut cameras);
}

/// Scrolling up dollies in, scrolling down dollies out. Each wheel event is one step, however far
/// it scrolled.
pub fn dolly_from_wheel(mut wheel: EventReader<MouseWheel>, mut cameras: Query<&mut ParallaxCam>) {
    let nudges: Vec<_> = wheel
        .read()
        .filter_map(|event| match event.y {
            y if y > 0.0 => Some(DistanceNudge::Decrease),
            y if y < 0.0 => Some(DistanceNudge::Increase),
            _ => None,
        })
        .collect();
    apply_dolly(&nudges, DollySource::Wheel, &mut cameras);
}

fn apply_dolly(
    nudges: &[DistanceNudge],
    source: DollySource,
    cameras: &mut Query<&mut ParallaxCam>,
) {
    if nudges.is_empty() {
        return;
    }
    for mut cam in cameras.iter_mut() {
        if !cam.enabled {
            continue;
        }
        for nudge in nudges {
            cam.nudge_dolly(*nudge, source);
        }
    }
}
