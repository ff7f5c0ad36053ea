//! The parallax animator that drives the camera in ambient mode.

pub mod component;
pub mod inputs;
pub mod motion;
pub mod pose;
pub mod smoothing;
pub mod zoom;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::mouse::MouseWheel;
use bevy_window::{CursorMoved, RequestRedraw};

use crate::SplatCamSet;

use component::ParallaxCam;
use inputs::ParallaxPointerMoved;

/// Adds the [`ParallaxCam`] animator and its input systems.
pub struct ParallaxCamPlugin;

impl Plugin for ParallaxCamPlugin {
    fn build(&self, app: &mut App) {
        crate::configure_sets(app);
        app.add_event::<CursorMoved>()
            .add_event::<MouseWheel>()
            .add_event::<RequestRedraw>()
            .add_event::<ParallaxPointerMoved>()
            .add_systems(
                Update,
                (
                    inputs::track_pointer,
                    inputs::dolly_from_keyboard,
                    inputs::dolly_from_wheel,
                )
                    .in_set(SplatCamSet::Input),
            )
            .add_systems(
                Update,
                ParallaxCam::update_camera_positions.in_set(SplatCamSet::Animate),
            )
            .register_type::<ParallaxCam>();
    }
}
