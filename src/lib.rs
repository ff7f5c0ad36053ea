//! A camera controller for viewers that page through captured Gaussian splat "memories".
//!
//! Every scene has an authored rest pose. While the viewer is in [`ViewMode::Ambient`], the
//! [`ParallaxCam`] animator orbits the camera a few degrees around the scene's focus point as the
//! pointer moves, producing a pseudo-3D parallax effect, and lets the viewer dolly in and out
//! within the scene's zoom range. [`ViewMode::Edit`] hands the camera to an [`OrbitControls`]
//! component for free manual orbiting, which is what an author uses to tune each scene's pose and
//! export it back into the scene configuration.
//!
//! Both sides describe the camera with the same pose record on [`OrbitControls`]. Only one of them
//! may write it at a time. The mode controller moves that ownership at every transition, and each
//! side re-reads the pose when it takes over, so switching modes never makes the camera jump.
//!
//! # Getting started
//!
//! ```rust,ignore
//! App::new()
//!     .add_plugins((
//!         DefaultPlugins,
//!         DefaultSplatCamPlugins.set(ScenePlugin::from_path("assets/splats/config.json")),
//!     ))
//!     .add_systems(Startup, |mut commands: Commands| {
//!         commands.spawn((Camera3d::default(), ParallaxCam::default(), OrbitControls::default()));
//!     })
//!     .run();
//! ```
//!
//! [`ViewMode::Ambient`]: crate::mode::ViewMode::Ambient
//! [`ViewMode::Edit`]: crate::mode::ViewMode::Edit
//! [`ParallaxCam`]: crate::controller::component::ParallaxCam
//! [`OrbitControls`]: crate::controls::OrbitControls

pub mod controller;
pub mod controls;
pub mod extensions;
pub mod mode;
pub mod scene;

#[cfg(test)]
mod test_utils;

use bevy_app::{prelude::*, PluginGroupBuilder};
use bevy_ecs::prelude::*;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            component::ParallaxCam,
            inputs::ParallaxPointerMoved,
            pose::{AngleConvention, Pose},
            zoom::{DistanceNudge, DollySource, ZoomRange},
            ParallaxCamPlugin,
        },
        controls::{ExternalPose, OrbitControls, OrbitControlsPlugin, PoseWriter},
        mode::{
            overrides::{CameraNudge, ModeOverrides},
            readback::{CameraExport, CameraExported, ExportCamera, LivePose},
            ModeControllerPlugin, SetViewMode, ToggleEditMode, ViewMode,
        },
        scene::{
            ActiveScene, NavigateScene, ParallaxAmount, ResetCamera, SceneCameraConfig,
            SceneChanged, ScenePlugin, Scenes, ViewerConfig,
        },
        DefaultSplatCamPlugins, SplatCamSet,
    };
}

/// Adds the parallax animator, the orbit controls, the mode controller, scene configuration, and
/// all enabled extensions.
pub struct DefaultSplatCamPlugins;

impl PluginGroup for DefaultSplatCamPlugins {
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>()
            .add(controller::ParallaxCamPlugin)
            .add(controls::OrbitControlsPlugin)
            .add(mode::ModeControllerPlugin)
            .add(scene::ScenePlugin::default());

        #[cfg(feature = "extension_focus_indicator")]
        let group = group.add(extensions::focus_indicator::FocusIndicatorPlugin);

        group
    }
}

/// System sets used by this crate, in the order they run within `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplatCamSet {
    /// Scene switches, camera adoption, and mode requests.
    Scene,
    /// Pointer, keyboard, and wheel input for the parallax animator.
    Input,
    /// The parallax animator.
    Animate,
    /// Edit mode nudges and the orbit controls driver.
    Controls,
    /// Pose readback and export.
    Readback,
}

pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SplatCamSet::Scene,
            SplatCamSet::Input,
            SplatCamSet::Animate,
            SplatCamSet::Controls,
            SplatCamSet::Readback,
        )
            .chain(),
    );
}
