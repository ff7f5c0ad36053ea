//! An extension that draws an indicator at the focus point while the camera is in edit mode. This
//! makes it obvious which point the camera orbits, and where an exported `focusPoint` will land.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::camera::Projection;
use bevy_state::prelude::*;
use bevy_transform::{prelude::*, TransformSystem};

use crate::{controls::OrbitControls, mode::ViewMode};

/// See the [module](self) docs.
pub struct FocusIndicatorPlugin;

impl Plugin for FocusIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            draw_focus
                .after(TransformSystem::TransformPropagate)
                .run_if(in_state(ViewMode::Edit)),
        )
        .register_type::<FocusIndicator>();
    }
}

/// Optional. Configures whether a camera shows the focus indicator in edit mode. The indicator is
/// shown if this component is not present.
#[derive(Debug, Component, Reflect)]
pub struct FocusIndicator {
    /// Should the indicator be visible on this camera?
    pub enabled: bool,
    /// Color of the indicator.
    pub color: Color,
}

impl Default for FocusIndicator {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color::WHITE,
        }
    }
}

/// Use gizmos to draw the focus point in world space.
pub fn draw_focus(
    cameras: Query<(
        &OrbitControls,
        &Projection,
        &GlobalTransform,
        Option<&FocusIndicator>,
    )>,
    mut gizmos: Gizmos,
) {
    for (controls, projection, cam_transform, indicator) in &cameras {
        if indicator.is_some_and(|i| !i.enabled) {
            continue;
        }
        let color = indicator.map_or(Color::WHITE, |i| i.color);
        let focus = controls.focus();

        let scale = match projection {
            Projection::Perspective(perspective) => controls.pose().distance * perspective.fov,
            Projection::Orthographic(ortho) => ortho.scale * 750.0,
            _ => controls.pose().distance,
        } * 0.01;

        // Pull the indicator toward the camera so it does not clip into the splat.
        let shift = (cam_transform.translation() - focus).normalize_or_zero() * scale;
        let focus = focus + shift;

        gizmos.circle(Isometry3d::new(focus, cam_transform.rotation()), scale, color);
        let offset = 1.5 * scale;
        let arm_length = 0.4;
        for direction in [
            cam_transform.left(),
            cam_transform.right(),
            cam_transform.up(),
            cam_transform.down(),
        ] {
            let direction = direction.as_vec3();
            gizmos.ray(
                focus + offset * direction,
                offset * arm_length * direction,
                color,
            );
        }
    }
}
