//! The orbit-control component that owns the camera in edit mode.
//!
//! [`OrbitControls`] holds the pose record shared with the parallax animator. The animator mirrors
//! its pose into the record every ambient frame, and the controls drive the record from user
//! input in edit mode. Which of the two may write is tracked by a [`PoseWriter`] tag on the
//! component, and every write goes through [`OrbitControls::pose_mut`], which refuses writers that
//! do not currently own the pose.

pub mod driver;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use crate::{
    controller::{
        pose::{distance_and_angles, forward_from_angles, AngleConvention, Pose},
        smoothing::{approach, approach_vec2, approach_vec3, Smoothing},
    },
    scene::{DEFAULT_CAMERA_POSITION, DEFAULT_FOCUS_POINT},
    SplatCamSet,
};

/// Adds the edit mode driver for [`OrbitControls`].
pub struct OrbitControlsPlugin;

impl Plugin for OrbitControlsPlugin {
    fn build(&self, app: &mut App) {
        crate::configure_sets(app);
        app.add_systems(
            Update,
            driver::drive_orbit_controls.in_set(SplatCamSet::Controls),
        )
        .register_type::<OrbitControls>();
    }
}

/// Which side currently owns the shared pose record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum PoseWriter {
    /// The parallax animator, in ambient mode.
    #[default]
    Animator,
    /// The orbit controls, in edit mode.
    Controls,
}

/// A camera pose as stored by [`OrbitControls`].
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ExternalPose {
    /// `x` is pitch and `y` is yaw, in degrees, in the controls' [`AngleConvention`].
    pub angles: Vec2,
    /// World space camera position.
    pub position: Vec3,
    /// Distance from the camera to the point it orbits.
    pub distance: f32,
}

impl ExternalPose {
    /// A pose at `position` looking at `focus`.
    pub fn looking_at(focus: Vec3, position: Vec3, convention: AngleConvention) -> Self {
        let angles = distance_and_angles(position, focus);
        Self {
            angles: convention.to_external(angles.yaw.to_degrees(), angles.pitch.to_degrees()),
            position,
            distance: angles.distance.max(OrbitControls::MIN_DISTANCE),
        }
    }

    /// Internal `(yaw, pitch)` of this pose, in radians.
    pub fn internal_angles(&self, convention: AngleConvention) -> (f32, f32) {
        let (yaw, pitch) = convention.from_external(self.angles);
        (yaw.to_radians(), pitch.to_radians())
    }

    /// The direction the camera is looking in.
    pub fn forward(&self, convention: AngleConvention) -> Vec3 {
        let (yaw, pitch) = self.internal_angles(convention);
        forward_from_angles(yaw, pitch)
    }

    /// The point the camera orbits, `distance` units in front of it.
    pub fn focus(&self, convention: AngleConvention) -> Vec3 {
        self.position + self.forward(convention) * self.distance
    }

    /// Orientation of a camera at this pose, with no roll.
    pub fn rotation(&self, convention: AngleConvention) -> Quat {
        let (yaw, pitch) = self.internal_angles(convention);
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
    }
}

impl Default for ExternalPose {
    fn default() -> Self {
        Self::looking_at(
            DEFAULT_FOCUS_POINT,
            DEFAULT_CAMERA_POSITION,
            AngleConvention::default(),
        )
    }
}

/// Axis of a world space position nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PositionAxis {
    /// World X.
    X,
    /// World Y.
    Y,
    /// World Z.
    Z,
}

/// Orbit camera controls used for manual camera placement.
///
/// In ambient mode the controls are disabled and their pose is written by the parallax animator.
/// In edit mode they orbit (left drag), pan (right drag or shift + left drag), and zoom (wheel)
/// about the focus point in front of the camera, easing the camera [`Transform`] toward the pose.
#[derive(Debug, Clone, Reflect, Component)]
pub struct OrbitControls {
    /// Whether the controls react to input and drive the camera transform.
    pub enabled: bool,
    /// Allowed pitch, in degrees, in the controls' angle convention.
    pub pitch_range: Vec2,
    /// Allowed yaw, in degrees, in the controls' angle convention.
    pub yaw_range: Vec2,
    /// Degrees of rotation per pixel of drag.
    pub rotate_speed: f32,
    /// Fraction of the distance covered per line of scroll.
    pub zoom_speed: f32,
    /// World units of pan per pixel of drag, per unit of distance.
    pub pan_speed: f32,
    /// How fast the camera transform eases toward the pose.
    pub smoothing: Smoothing,
    /// How [`ExternalPose::angles`] relate to the animator's angles.
    pub convention: AngleConvention,
    pose: ExternalPose,
    smoothed: ExternalPose,
    writer: PoseWriter,
}

impl Default for OrbitControls {
    fn default() -> Self {
        let pose = ExternalPose::default();
        Self {
            enabled: false,
            pitch_range: Vec2::new(-90.0, 90.0),
            yaw_range: Vec2::new(f32::NEG_INFINITY, f32::INFINITY),
            rotate_speed: Self::AMBIENT_ROTATE_SPEED,
            zoom_speed: 0.1,
            pan_speed: 0.001,
            smoothing: Smoothing {
                rate: 12.0,
                ..Default::default()
            },
            convention: AngleConvention::default(),
            pose,
            smoothed: pose,
            writer: PoseWriter::default(),
        }
    }
}

impl OrbitControls {
    /// The closest the camera may get to the point it orbits.
    pub const MIN_DISTANCE: f32 = 0.1;
    /// Rotate speed while the controls sit idle behind the animator.
    pub const AMBIENT_ROTATE_SPEED: f32 = 0.08;
    /// Rotate speed for manual control in edit mode.
    pub const EDIT_ROTATE_SPEED: f32 = 0.3;

    /// The current pose record.
    pub fn pose(&self) -> &ExternalPose {
        &self.pose
    }

    /// The pose the camera transform is currently at, trailing [`Self::pose`] while smoothing.
    pub fn smoothed_pose(&self) -> &ExternalPose {
        &self.smoothed
    }

    /// The side that currently owns the pose record.
    pub fn writer(&self) -> PoseWriter {
        self.writer
    }

    /// The point the camera orbits.
    pub fn focus(&self) -> Vec3 {
        self.pose.focus(self.convention)
    }

    /// Mutable access to the pose record, for the side that owns it. Returns `None` for any other
    /// writer.
    pub fn pose_mut(&mut self, writer: PoseWriter) -> Option<&mut ExternalPose> {
        if writer != self.writer {
            warn_once!(
                "{:?} attempted to write an orbit pose owned by {:?}; the write was dropped",
                writer,
                self.writer
            );
            return None;
        }
        Some(&mut self.pose)
    }

    /// Hand ownership of the pose record to `writer`. Only the mode controller moves ownership.
    pub(crate) fn set_writer(&mut self, writer: PoseWriter) {
        self.writer = writer;
    }

    /// Place the camera at `position` looking at `focus`, discarding any smoothing in progress.
    ///
    /// This rewrites the record whoever owns it, so only the mode controller and scene mounting
    /// call it. Ownership stays where it is.
    pub(crate) fn reset(&mut self, focus: Vec3, position: Vec3) {
        self.pose = ExternalPose::looking_at(focus, position, self.convention);
        self.smoothed = self.pose;
    }

    /// Limit pitch to 90 degrees either side of the current pitch, and leave yaw free.
    pub fn apply_edit_limits(&mut self) {
        let pitch = self.pose.angles.x;
        self.pitch_range = Vec2::new(pitch - 90.0, pitch + 90.0);
        self.yaw_range = Vec2::new(f32::NEG_INFINITY, f32::INFINITY);
        self.rotate_speed = Self::EDIT_ROTATE_SPEED;
    }

    /// Take the pose over from the animator for manual control.
    ///
    /// The pose is first reset onto itself, which flushes any smoothing left over from the last
    /// time the controls were enabled.
    pub(crate) fn take_over(&mut self) {
        let (focus, position) = (self.focus(), self.pose.position);
        self.reset(focus, position);
        self.writer = PoseWriter::Controls;
        self.enabled = true;
        self.apply_edit_limits();
    }

    /// Hand the pose back to the animator. The record settles where the camera currently is, so
    /// the animator resumes from what is on screen.
    pub(crate) fn release(&mut self) {
        self.enabled = false;
        self.pose = self.smoothed;
        self.writer = PoseWriter::Animator;
        self.rotate_speed = Self::AMBIENT_ROTATE_SPEED;
    }

    /// Mirror an animator pose into the record. Returns `false` if `writer` does not own it.
    pub fn write_pose(&mut self, writer: PoseWriter, pose: &Pose) -> bool {
        let angles = self.convention.to_external(pose.yaw_deg, pose.pitch_deg);
        let Some(record) = self.pose_mut(writer) else {
            return false;
        };
        *record = ExternalPose {
            angles,
            position: pose.position,
            distance: pose.distance,
        };
        true
    }

    /// Rotate about the focus point by a pointer drag, in pixels.
    pub fn orbit(&mut self, drag: Vec2) -> bool {
        let (convention, speed) = (self.convention, self.rotate_speed);
        let (pitch_range, yaw_range) = (self.pitch_range, self.yaw_range);
        let Some(pose) = self.pose_mut(PoseWriter::Controls) else {
            return false;
        };
        let focus = pose.focus(convention);
        let angles = pose.angles - Vec2::new(drag.y, drag.x) * speed;
        pose.angles = Vec2::new(
            clamp_to_range(angles.x, pitch_range),
            clamp_to_range(angles.y, yaw_range),
        );
        pose.position = focus - pose.forward(convention) * pose.distance;
        true
    }

    /// Move the camera and its focus point across the view plane by a pointer drag, in pixels.
    pub fn pan(&mut self, drag: Vec2) -> bool {
        let (convention, speed) = (self.convention, self.pan_speed);
        let Some(pose) = self.pose_mut(PoseWriter::Controls) else {
            return false;
        };
        let forward = pose.forward(convention);
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        pose.position += (-right * drag.x + up * drag.y) * speed * pose.distance;
        true
    }

    /// Move toward (positive) or away from (negative) the focus point by lines of scroll.
    pub fn zoom(&mut self, lines: f32) -> bool {
        let (convention, speed) = (self.convention, self.zoom_speed);
        let Some(pose) = self.pose_mut(PoseWriter::Controls) else {
            return false;
        };
        let focus = pose.focus(convention);
        let factor = (1.0 - lines * speed).max(0.1);
        pose.distance = (pose.distance * factor).max(Self::MIN_DISTANCE);
        pose.position = focus - pose.forward(convention) * pose.distance;
        true
    }

    /// Change the orbit distance, keeping the camera in place and moving the focus point.
    pub fn nudge_distance(&mut self, delta: f32) -> bool {
        let Some(pose) = self.pose_mut(PoseWriter::Controls) else {
            return false;
        };
        pose.distance = (pose.distance + delta).max(Self::MIN_DISTANCE);
        true
    }

    /// Move the camera along one world axis.
    pub fn nudge_position(&mut self, axis: PositionAxis, delta: f32) -> bool {
        let Some(pose) = self.pose_mut(PoseWriter::Controls) else {
            return false;
        };
        match axis {
            PositionAxis::X => pose.position.x += delta,
            PositionAxis::Y => pose.position.y += delta,
            PositionAxis::Z => pose.position.z += delta,
        }
        true
    }

    /// Ease the smoothed pose toward the pose record by one frame and return it.
    pub fn tick(&mut self, dt: f32) -> ExternalPose {
        let rate = self.smoothing.rate;
        self.smoothed = ExternalPose {
            angles: approach_vec2(self.smoothed.angles, self.pose.angles, rate, dt),
            position: approach_vec3(self.smoothed.position, self.pose.position, rate, dt),
            distance: approach(self.smoothed.distance, self.pose.distance, rate, dt),
        };
        self.smoothed
    }

    /// Write the smoothed pose into a camera transform.
    pub fn apply_to_transform(&self, transform: &mut Transform) {
        transform.translation = self.smoothed.position;
        transform.rotation = self.smoothed.rotation(self.convention);
    }
}

fn clamp_to_range(value: f32, range: Vec2) -> f32 {
    value.max(range.x).min(range.y)
}
