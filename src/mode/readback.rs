//! Reading the camera pose back out of [`OrbitControls`], for display and export.

use bevy_derive::Deref;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::camera::Projection;
use serde::{Deserialize, Serialize};

use super::overrides::ModeOverrides;
use crate::{
    controller::pose::AngleConvention,
    controls::{ExternalPose, OrbitControls},
    scene::{field_of_view, ActiveScene, ParallaxAmount, DEFAULT_FOV},
};

/// A rounded snapshot of the camera, as shown in the edit panel.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CameraReadback {
    /// Field of view in whole degrees.
    pub fov: f32,
    /// Camera position, two decimals.
    pub camera_position: [f32; 3],
    /// The point the camera orbits, two decimals.
    pub focus_point: [f32; 3],
    /// Distance from the camera to the focus point, two decimals.
    pub distance: f32,
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Snapshot a pose, rounding positions and distance to two decimals.
pub fn read_camera_state(
    pose: &ExternalPose,
    convention: AngleConvention,
    fov: f32,
) -> CameraReadback {
    let focus = pose.focus(convention);
    CameraReadback {
        fov: fov.round(),
        camera_position: pose.position.to_array().map(round2),
        focus_point: focus.to_array().map(round2),
        distance: round2(pose.distance),
    }
}

/// The latest camera snapshot, refreshed ten times a second while in edit mode and `None`
/// otherwise.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Deref)]
pub struct LivePose(Option<CameraReadback>);

impl LivePose {
    /// The latest snapshot, if in edit mode.
    pub fn get(&self) -> Option<&CameraReadback> {
        self.0.as_ref()
    }
}

/// The scene configuration fragment describing the current camera.
///
/// Pasting [`CameraExport::to_json`] into a scene entry reproduces the current view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraExport {
    /// Field of view in whole degrees.
    pub fov: f32,
    /// Camera position.
    pub camera_position: [f32; 3],
    /// The point the camera orbits.
    pub focus_point: [f32; 3],
    /// The parallax amount in effect, including edit mode overrides.
    pub parallax_amount: ParallaxAmount,
}

impl CameraExport {
    /// An export of `readback` with the given parallax amount.
    pub fn new(readback: &CameraReadback, parallax_amount: ParallaxAmount) -> Self {
        Self {
            fov: readback.fov,
            camera_position: readback.camera_position,
            focus_point: readback.focus_point,
            parallax_amount,
        }
    }

    /// Pretty printed JSON, in the shape of a scene configuration entry.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Request to export the current camera.
#[derive(Event, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportCamera;

/// The result of an [`ExportCamera`] request, for the host to put on the clipboard.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CameraExported {
    /// The exported [`CameraExport`], pretty printed.
    pub json: String,
}

type ReadbackCameras<'w, 's> = Query<'w, 's, (&'static OrbitControls, Option<&'static Projection>)>;

fn effective_fov(
    overrides: &ModeOverrides,
    projection: Option<&Projection>,
    active: Option<&ActiveScene>,
) -> f32 {
    overrides
        .active_fov
        .or_else(|| projection.and_then(field_of_view))
        .or_else(|| active.and_then(ActiveScene::camera).map(|s| s.field_of_view))
        .unwrap_or(DEFAULT_FOV)
}

/// Refresh [`LivePose`] from the first camera with [`OrbitControls`].
pub fn poll_live_pose(
    cameras: ReadbackCameras,
    overrides: Res<ModeOverrides>,
    active: Option<Res<ActiveScene>>,
    mut live: ResMut<LivePose>,
) {
    // A missing camera leaves the last snapshot in place until the next poll.
    let Some((controls, projection)) = cameras.iter().next() else {
        return;
    };
    let fov = effective_fov(&overrides, projection, active.as_deref());
    let readback = read_camera_state(controls.pose(), controls.convention, fov);
    live.set_if_neq(LivePose(Some(readback)));
}

/// Forget the snapshot when edit mode is left.
pub fn clear_live_pose(mut live: ResMut<LivePose>) {
    live.0 = None;
}

/// Answer [`ExportCamera`] requests with the current camera, and log it.
pub fn export_camera(
    mut requests: EventReader<ExportCamera>,
    cameras: ReadbackCameras,
    overrides: Res<ModeOverrides>,
    active: Option<Res<ActiveScene>>,
    mut exported: EventWriter<CameraExported>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let Some((controls, projection)) = cameras.iter().next() else {
        warn!("cannot export the camera: no camera with orbit controls");
        return;
    };

    let active = active.as_deref();
    let fov = effective_fov(&overrides, projection, active);
    let parallax = overrides
        .active_parallax
        .or_else(|| active.and_then(ActiveScene::camera).map(|s| s.parallax))
        .unwrap_or_default();
    let readback = read_camera_state(controls.pose(), controls.convention, fov);

    match CameraExport::new(&readback, parallax).to_json() {
        Ok(json) => {
            info!("current camera state:\n{json}");
            exported.write(CameraExported { json });
        }
        Err(err) => error!("failed to serialize the camera state: {err}"),
    }
}
