//! Scene configuration, the active scene, and navigation between scenes.

pub mod config;

pub use config::{
    format_coordinates, ConfigError, ParallaxAmount, SceneCameraConfig, Settings, SplatConfig,
    ViewerConfig, DEFAULT_CAMERA_POSITION, DEFAULT_FOCUS_POINT, DEFAULT_FOV,
};

use std::path::PathBuf;

use bevy_app::prelude::*;
use bevy_derive::Deref;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_render::camera::Projection;
use bevy_state::prelude::*;

use crate::{
    controller::component::ParallaxCam,
    controls::OrbitControls,
    mode::{overrides::ModeOverrides, ViewMode},
    SplatCamSet,
};

/// Where [`ScenePlugin`] gets its configuration from.
#[derive(Debug, Clone)]
pub enum SceneSource {
    /// Read a JSON file at startup, falling back to no scenes if it cannot be loaded.
    Path(PathBuf),
    /// Use an already loaded configuration.
    Config(ViewerConfig),
}

/// Loads the scene configuration and keeps the cameras in sync with the active scene.
#[derive(Debug, Clone)]
pub struct ScenePlugin {
    /// Where the scene configuration comes from.
    pub source: SceneSource,
}

impl Default for ScenePlugin {
    fn default() -> Self {
        Self::from_path("assets/splats/config.json")
    }
}

impl ScenePlugin {
    /// Load the configuration from a JSON file at `path` when the plugin is built.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: SceneSource::Path(path.into()),
        }
    }

    /// Use `config` as is.
    pub fn from_config(config: ViewerConfig) -> Self {
        Self {
            source: SceneSource::Config(config),
        }
    }
}

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        let config = match &self.source {
            SceneSource::Path(path) => ViewerConfig::load_or_default(path),
            SceneSource::Config(config) => config.clone(),
        };
        if config.splats.is_empty() {
            warn!("no scenes configured");
        }
        let active = ActiveScene::select(&config, 0);

        crate::configure_sets(app);
        app.insert_resource(Scenes(config))
            .insert_resource(active)
            .add_event::<NavigateScene>()
            .add_event::<SceneChanged>()
            .add_event::<ResetCamera>()
            .add_systems(
                Update,
                (navigate_scenes, apply_active_scene)
                    .chain()
                    .in_set(SplatCamSet::Scene),
            )
            .register_type::<SceneCameraConfig>();
    }
}

/// The loaded scene configuration.
#[derive(Resource, Debug, Clone, Default, Deref)]
pub struct Scenes(pub ViewerConfig);

/// The scene currently shown, with its camera settings resolved.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ActiveScene {
    index: usize,
    camera: Option<SceneCameraConfig>,
}

impl ActiveScene {
    fn select(config: &ViewerConfig, index: usize) -> Self {
        Self {
            index,
            camera: config.scene_camera(index),
        }
    }

    /// Index of the scene in [`Scenes`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// Camera settings of the scene, or `None` if no scenes are configured.
    pub fn camera(&self) -> Option<&SceneCameraConfig> {
        self.camera.as_ref()
    }
}

/// Request to show another scene.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateScene {
    /// The next scene, wrapping around after the last one.
    Next,
    /// The previous scene, wrapping around before the first one.
    Previous,
    /// A specific scene. Out of range indices select the last scene.
    Index(usize),
}

impl NavigateScene {
    /// The index this request selects, from `current` in a list of `count` scenes.
    pub fn resolve(self, current: usize, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        match self {
            NavigateScene::Next => (current + 1) % count,
            NavigateScene::Previous => (current + count - 1) % count,
            NavigateScene::Index(index) => index.min(count - 1),
        }
    }
}

/// Sent after the active scene changed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChanged {
    /// Index of the new active scene in [`Scenes`].
    pub index: usize,
}

/// Request to put the camera back at the active scene's initial pose.
#[derive(Event, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResetCamera;

/// Handle [`NavigateScene`] requests. Navigation always returns the viewer to ambient mode, and
/// clears any overrides made for the previous scene.
pub fn navigate_scenes(
    mut requests: EventReader<NavigateScene>,
    scenes: Res<Scenes>,
    mut active: ResMut<ActiveScene>,
    mut changed: EventWriter<SceneChanged>,
    mut overrides: Option<ResMut<ModeOverrides>>,
    mode: Option<Res<State<ViewMode>>>,
    mut next_mode: Option<ResMut<NextState<ViewMode>>>,
) {
    for request in requests.read() {
        let count = scenes.splats.len();
        if count == 0 {
            warn_once!("ignoring {request:?}: no scenes configured");
            continue;
        }

        if let (Some(mode), Some(next_mode)) = (&mode, &mut next_mode) {
            if *mode.get() != ViewMode::Ambient {
                next_mode.set(ViewMode::Ambient);
            }
        }

        let index = request.resolve(active.index, count);
        if index == active.index {
            continue;
        }
        *active = ActiveScene::select(&scenes, index);
        if let Some(overrides) = &mut overrides {
            overrides.clear();
        }
        info!(
            "showing scene {}/{}: {}",
            index + 1,
            count,
            scenes.splats[index].title
        );
        changed.write(SceneChanged { index });
    }
}

/// Push the active scene into cameras when it changes, or when a camera is spawned, and keep the
/// effective field of view and parallax amount up to date.
pub fn apply_active_scene(
    active: Res<ActiveScene>,
    overrides: Option<Res<ModeOverrides>>,
    mut cameras: Query<(
        &mut ParallaxCam,
        Option<&mut OrbitControls>,
        Option<&mut Projection>,
    )>,
) {
    let Some(scene) = active.camera() else {
        return;
    };
    let overrides_changed = overrides.as_ref().is_some_and(|o| o.is_changed());
    let overrides = overrides.as_deref();
    let fov = overrides
        .and_then(|o| o.active_fov)
        .unwrap_or(scene.field_of_view);
    let parallax = overrides
        .and_then(|o| o.active_parallax)
        .unwrap_or(scene.parallax);

    for (mut cam, controls, projection) in &mut cameras {
        let mounting = active.is_changed() || cam.is_added();
        if !mounting && !overrides_changed {
            continue;
        }
        if mounting {
            debug!("mounting scene {}", active.index());
            cam.set_scene(scene);
            if let Some(mut controls) = controls {
                controls.reset(scene.focus_point, scene.rest_position);
            }
        }
        cam.parallax = parallax;
        if let Some(mut projection) = projection {
            set_field_of_view(&mut projection, fov);
        }
    }
}

/// Set the vertical field of view of a perspective projection, in degrees.
pub(crate) fn set_field_of_view(projection: &mut Projection, degrees: f32) {
    if let Projection::Perspective(perspective) = projection {
        perspective.fov = degrees.to_radians();
    }
}

/// The vertical field of view of a perspective projection, in degrees.
pub(crate) fn field_of_view(projection: &Projection) -> Option<f32> {
    match projection {
        Projection::Perspective(perspective) => Some(perspective.fov.to_degrees()),
        _ => None,
    }
}
