//! Edit mode nudges, and the transient overrides they leave behind until the scene changes.

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::camera::Projection;
use bevy_state::prelude::*;

use super::ViewMode;
use crate::{
    controls::{OrbitControls, PositionAxis},
    scene::{field_of_view, ActiveScene, ParallaxAmount, DEFAULT_FOV},
};

/// Values changed in edit mode that take precedence over the active scene's configuration.
///
/// Cleared whenever the active scene changes.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct ModeOverrides {
    /// Field of view in degrees.
    pub active_fov: Option<f32>,
    /// Parallax amount in degrees.
    pub active_parallax: Option<ParallaxAmount>,
}

impl ModeOverrides {
    /// Drop all overrides, falling back to the scene configuration.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` if nothing is overridden.
    pub fn is_empty(&self) -> bool {
        self.active_fov.is_none() && self.active_parallax.is_none()
    }
}

/// Which axis of the parallax amount a nudge changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ParallaxAxis {
    /// Horizontal parallax.
    Yaw,
    /// Vertical parallax.
    Pitch,
}

/// A discrete edit mode adjustment. Nudges are ignored outside edit mode.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum CameraNudge {
    /// Change the field of view by this many degrees.
    FieldOfView(f32),
    /// Change the orbit distance, keeping the camera in place.
    Distance(f32),
    /// Move the camera along one world axis.
    Position(PositionAxis, f32),
    /// Change one axis of the parallax amount, in degrees.
    Parallax(ParallaxAxis, f32),
}

impl CameraNudge {
    /// Field of view step of the edit panel, in degrees.
    pub const FOV_STEP: f32 = 1.0;
    /// Distance step of the edit panel.
    pub const DISTANCE_STEP: f32 = 0.1;
    /// Position step of the edit panel.
    pub const POSITION_STEP: f32 = 0.05;
    /// Parallax step of the edit panel, in degrees.
    pub const PARALLAX_STEP: f32 = 0.5;
}

/// The field of view after a nudge: whole degrees, never below one.
pub fn nudged_fov(current: f32, delta: f32) -> f32 {
    (current + delta).round().max(1.0)
}

/// The parallax amount after a nudge: one decimal, never negative.
pub fn nudged_parallax(base: ParallaxAmount, axis: ParallaxAxis, delta: f32) -> ParallaxAmount {
    let nudge = |value: f32| ((value + delta) * 10.0).round() / 10.0;
    let mut amount = base;
    match axis {
        ParallaxAxis::Yaw => amount.yaw = nudge(base.yaw).max(0.0),
        ParallaxAxis::Pitch => amount.pitch = nudge(base.pitch).max(0.0),
    }
    amount
}

/// Apply [`CameraNudge`]s while in edit mode.
///
/// Field of view and parallax nudges are recorded in [`ModeOverrides`] and reach the cameras
/// through the active scene. Distance and position nudges go straight to the [`OrbitControls`]
/// pose.
pub fn apply_camera_nudges(
    mut nudges: EventReader<CameraNudge>,
    mode: Res<State<ViewMode>>,
    active: Option<Res<ActiveScene>>,
    mut overrides: ResMut<ModeOverrides>,
    mut cameras: Query<(&mut OrbitControls, Option<&Projection>)>,
) {
    if *mode.get() != ViewMode::Edit {
        if !nudges.is_empty() {
            debug!("ignoring camera nudges outside edit mode");
            nudges.clear();
        }
        return;
    }

    let scene = active.as_deref().and_then(ActiveScene::camera);
    for nudge in nudges.read() {
        match *nudge {
            CameraNudge::FieldOfView(delta) => {
                let current = overrides
                    .active_fov
                    .or_else(|| cameras.iter().find_map(|(_, p)| p.and_then(field_of_view)))
                    .or(scene.map(|s| s.field_of_view))
                    .unwrap_or(DEFAULT_FOV);
                overrides.active_fov = Some(nudged_fov(current, delta));
            }
            CameraNudge::Parallax(axis, delta) => {
                let base = overrides
                    .active_parallax
                    .or(scene.map(|s| s.parallax))
                    .unwrap_or_default();
                overrides.active_parallax = Some(nudged_parallax(base, axis, delta));
            }
            CameraNudge::Distance(delta) => {
                for (mut controls, _) in &mut cameras {
                    controls.nudge_distance(delta);
                }
            }
            CameraNudge::Position(axis, delta) => {
                for (mut controls, _) in &mut cameras {
                    controls.nudge_position(axis, delta);
                }
            }
        }
    }
}
