//! The mode controller, which decides whether the parallax animator or the orbit controls drive
//! the camera.
//!
//! Ownership of the shared pose record in [`OrbitControls`] only moves inside the state
//! transition systems of this module. Each transition first shuts the old writer off, then hands
//! the record to the new one:
//!
//! - Leaving [`ViewMode::Ambient`] disables the animator.
//! - Entering [`ViewMode::Edit`] resets the controls onto their own pose, which flushes stale
//!   smoothing, then gives them the record and enables them.
//! - Leaving [`ViewMode::Edit`] disables the controls and gives the record back to the animator.
//! - Entering [`ViewMode::Ambient`] enables the animator, which resumes from the record on its
//!   next frame.
//!
//! The animator's systems only run in ambient mode and the controls' driver only runs in edit
//! mode, so neither can write while the other owns the record.

pub mod keys;
pub mod overrides;
pub mod readback;

use std::time::Duration;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_reflect::prelude::*;
use bevy_state::prelude::*;
use bevy_time::common_conditions::on_timer;

use crate::{
    controller::component::ParallaxCam,
    controls::OrbitControls,
    scene::{self, ActiveScene, ResetCamera},
    SplatCamSet,
};

use keys::ViewerKeybindings;
use overrides::{CameraNudge, ModeOverrides};
use readback::{CameraExported, ExportCamera, LivePose};

/// How often [`LivePose`] is refreshed in edit mode.
pub const LIVE_POSE_INTERVAL: Duration = Duration::from_millis(100);

/// Who drives the camera.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ViewMode {
    /// The parallax animator follows the pointer.
    #[default]
    Ambient,
    /// The orbit controls follow mouse drags, for placing the camera by hand.
    Edit,
}

impl ViewMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Ambient => ViewMode::Edit,
            ViewMode::Edit => ViewMode::Ambient,
        }
    }
}

/// Request to switch between ambient and edit mode.
#[derive(Event, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToggleEditMode;

/// Request to enter a specific mode. Requesting the current mode does nothing.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetViewMode(pub ViewMode);

/// Adds [`ViewMode`] and the systems that hand the camera over between modes.
///
/// Requires the `StatesPlugin`, which is part of Bevy's default plugins.
pub struct ModeControllerPlugin;

impl Plugin for ModeControllerPlugin {
    fn build(&self, app: &mut App) {
        crate::configure_sets(app);
        app.init_state::<ViewMode>()
            .init_resource::<ModeOverrides>()
            .init_resource::<LivePose>()
            .init_resource::<ViewerKeybindings>()
            .add_event::<ToggleEditMode>()
            .add_event::<SetViewMode>()
            .add_event::<ResetCamera>()
            .add_event::<CameraNudge>()
            .add_event::<ExportCamera>()
            .add_event::<CameraExported>()
            .configure_sets(
                Update,
                (
                    SplatCamSet::Input.run_if(in_state(ViewMode::Ambient)),
                    SplatCamSet::Animate.run_if(in_state(ViewMode::Ambient)),
                    SplatCamSet::Controls.run_if(in_state(ViewMode::Edit)),
                ),
            )
            .add_systems(OnExit(ViewMode::Ambient), suspend_animator)
            .add_systems(
                OnEnter(ViewMode::Edit),
                (hand_over_to_controls, readback::poll_live_pose).chain(),
            )
            .add_systems(
                OnExit(ViewMode::Edit),
                (hand_back_to_animator, readback::clear_live_pose),
            )
            .add_systems(OnEnter(ViewMode::Ambient), resume_animator)
            .add_systems(
                Update,
                (
                    (keys::handle_viewer_keys, handle_mode_requests)
                        .chain()
                        .before(scene::navigate_scenes),
                    overrides::apply_camera_nudges
                        .after(scene::navigate_scenes)
                        .before(scene::apply_active_scene),
                    (adopt_cameras, reset_camera)
                        .chain()
                        .after(scene::apply_active_scene),
                )
                    .in_set(SplatCamSet::Scene),
            )
            .add_systems(
                Update,
                (
                    readback::poll_live_pose
                        .run_if(in_state(ViewMode::Edit).and(on_timer(LIVE_POSE_INTERVAL))),
                    readback::export_camera,
                )
                    .in_set(SplatCamSet::Readback),
            )
            .register_type::<ViewMode>()
            .register_type::<ModeOverrides>()
            .register_type::<ViewerKeybindings>();
    }
}

/// Turn [`ToggleEditMode`] and [`SetViewMode`] requests into a state change.
pub fn handle_mode_requests(
    mut toggles: EventReader<ToggleEditMode>,
    mut requests: EventReader<SetViewMode>,
    mode: Res<State<ViewMode>>,
    mut next_mode: ResMut<NextState<ViewMode>>,
) {
    let current = *mode.get();
    let mut target = current;
    for _ in toggles.read() {
        target = target.toggled();
    }
    for SetViewMode(requested) in requests.read() {
        target = *requested;
    }
    if target != current {
        debug!("switching view mode: {current:?} -> {target:?}");
        next_mode.set(target);
    }
}

fn suspend_animator(mut cameras: Query<&mut ParallaxCam>) {
    for mut cam in &mut cameras {
        cam.enabled = false;
        cam.deactivate();
    }
}

fn resume_animator(mut cameras: Query<&mut ParallaxCam>) {
    for mut cam in &mut cameras {
        cam.enabled = true;
    }
}

fn hand_over_to_controls(mut controls: Query<&mut OrbitControls>) {
    for mut controls in &mut controls {
        controls.take_over();
    }
}

fn hand_back_to_animator(mut controls: Query<&mut OrbitControls>) {
    for mut controls in &mut controls {
        controls.release();
    }
}

/// Bring cameras spawned after the last transition in line with the current mode.
fn adopt_cameras(
    mode: Res<State<ViewMode>>,
    mut cameras: Query<&mut ParallaxCam, Added<ParallaxCam>>,
    mut controls: Query<&mut OrbitControls, Added<OrbitControls>>,
) {
    let editing = *mode.get() == ViewMode::Edit;
    for mut cam in &mut cameras {
        cam.enabled = !editing;
    }
    for mut controls in &mut controls {
        if editing {
            controls.take_over();
        } else {
            controls.release();
        }
    }
}

/// Put cameras back at the active scene's initial pose.
///
/// In ambient mode this remounts the animator, so the intro plays again. In edit mode the controls
/// stay in charge and are reset in place.
fn reset_camera(
    mut requests: EventReader<ResetCamera>,
    mode: Res<State<ViewMode>>,
    active: Option<Res<ActiveScene>>,
    mut cameras: Query<
        (Option<&mut ParallaxCam>, Option<&mut OrbitControls>),
        Or<(With<ParallaxCam>, With<OrbitControls>)>,
    >,
) {
    if requests.read().count() == 0 {
        return;
    }
    let Some(scene) = active.as_deref().and_then(ActiveScene::camera) else {
        warn!("cannot reset the camera: no active scene");
        return;
    };

    let editing = *mode.get() == ViewMode::Edit;
    for (cam, controls) in &mut cameras {
        if let Some(mut controls) = controls {
            controls.reset(scene.focus_point, scene.rest_position);
            if editing {
                controls.apply_edit_limits();
            }
        }
        if !editing {
            if let Some(mut cam) = cam {
                cam.remount();
            }
        }
    }
    info!("camera reset to the initial pose of the active scene");
}
