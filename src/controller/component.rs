//! The primary [`Component`] of the controller, [`ParallaxCam`].

use bevy_ecs::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_time::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::RequestRedraw;

use super::{
    motion::AmbientMotion,
    pose::{distance_and_angles, wrap_degrees, Pose, SphericalAngles, DEGENERATE_DISTANCE},
    smoothing::{approach, approach_vec2, IntroReveal, Smoothing},
    zoom::{DistanceNudge, DollySource, DollySteps, ZoomRange},
};
use crate::{
    controls::{ExternalPose, OrbitControls, PoseWriter},
    scene::{ParallaxAmount, SceneCameraConfig, DEFAULT_CAMERA_POSITION, DEFAULT_FOCUS_POINT},
};

/// Orbits the camera a few degrees around a scene's focus point as the pointer moves.
///
/// The camera rests at the scene's authored position when the pointer is centred. Moving the
/// pointer toward a screen edge rotates the camera about the focus point by up to
/// [`ParallaxCam::parallax`] degrees, and dolly nudges move it toward or away from the focus within
/// [`ParallaxCam::zoom_range`]. Every change is eased with frame rate independent exponential
/// smoothing, so the camera never snaps.
///
/// # Lifecycle
///
/// The first time the animator runs after a scene is mounted it plays the [`IntroReveal`]. When it
/// is re-enabled later, e.g. after edit mode, it reads the pose left behind in [`OrbitControls`]
/// and continues from there without a jump.
///
/// Each frame, the resulting pose is written to the camera [`Transform`] and mirrored into the
/// entity's [`OrbitControls`], if any, so the controls can take over from exactly where the
/// animator left off.
#[derive(Debug, Clone, Reflect, Component)]
pub struct ParallaxCam {
    /// Whether the animator drives the camera. Managed by the mode controller.
    pub enabled: bool,
    /// Maximum angular offset with the pointer at the screen edge.
    pub parallax: ParallaxAmount,
    /// Dolly limits, as multiples of the rest distance.
    pub zoom_range: ZoomRange,
    /// Steady state smoothing.
    pub smoothing: Smoothing,
    /// The reveal played the first time a scene is shown.
    pub intro: IntroReveal,
    /// Dolly step sizes.
    pub dolly_steps: DollySteps,
    rest_position: Vec3,
    focus_point: Vec3,
    rest: SphericalAngles,
    /// `x` is yaw and `y` is pitch, in degrees relative to the rest angles.
    offset: Vec2,
    target_distance: f32,
    current_distance: f32,
    pointer: Vec2,
    motion: AmbientMotion,
    revealed: bool,
    active: bool,
    integrated: bool,
}

impl Default for ParallaxCam {
    fn default() -> Self {
        Self::new(DEFAULT_CAMERA_POSITION, DEFAULT_FOCUS_POINT)
    }
}

impl ParallaxCam {
    /// An animator resting at `rest_position`, looking at `focus_point`.
    pub fn new(rest_position: Vec3, focus_point: Vec3) -> Self {
        let mut cam = Self {
            enabled: true,
            parallax: ParallaxAmount::default(),
            zoom_range: ZoomRange::default(),
            smoothing: Smoothing::default(),
            intro: IntroReveal::default(),
            dolly_steps: DollySteps::default(),
            rest_position,
            focus_point,
            rest: SphericalAngles::default(),
            offset: Vec2::ZERO,
            target_distance: 0.0,
            current_distance: 0.0,
            pointer: Vec2::ZERO,
            motion: AmbientMotion::Dormant,
            revealed: false,
            active: false,
            integrated: false,
        };
        cam.remount();
        cam
    }

    /// An animator configured for a scene.
    pub fn from_scene(scene: &SceneCameraConfig) -> Self {
        let mut cam = Self::default();
        cam.set_scene(scene);
        cam
    }

    /// Mount a scene: adopt its camera settings and start over from its rest pose.
    pub fn set_scene(&mut self, scene: &SceneCameraConfig) {
        self.parallax = scene.parallax;
        self.zoom_range = scene.zoom_range.unwrap_or_default();
        self.rest_position = scene.rest_position;
        self.focus_point = scene.focus_point;
        self.remount();
    }

    /// Forget all animation state and re-derive the rest angles. The next activation plays the
    /// intro again.
    pub fn remount(&mut self) {
        self.rest = distance_and_angles(self.rest_position, self.focus_point);
        self.target_distance = self.rest.distance;
        self.current_distance = self.rest.distance;
        self.offset = Vec2::ZERO;
        self.motion = AmbientMotion::Dormant;
        self.revealed = false;
        self.active = false;
        self.integrated = false;
    }

    /// Start animating.
    ///
    /// The first activation for a mounted scene starts the intro reveal. Later activations resume
    /// from `resume_from`, the pose left behind by whoever drove the camera in the meantime. If
    /// there is nothing to resume from, the animator continues from its own last state.
    pub fn activate(&mut self, resume_from: Option<&ExternalPose>) {
        if !self.revealed {
            self.offset = self.intro.start_offset();
            self.current_distance = self.rest.distance * self.intro.distance_factor;
            self.motion = AmbientMotion::Intro { elapsed: 0.0 };
            self.revealed = true;
        } else {
            if let Some(pose) = resume_from {
                self.resume_from(pose.position);
            }
            self.motion = AmbientMotion::Tracking;
        }
        self.active = true;
        self.integrated = false;
    }

    /// Seed the offset and distance from a camera position, so the animator continues from it.
    pub fn resume_from(&mut self, position: Vec3) {
        let current = distance_and_angles(position, self.focus_point);
        if current.distance < DEGENERATE_DISTANCE || self.rest.distance < DEGENERATE_DISTANCE {
            self.offset = Vec2::ZERO;
            return;
        }
        self.offset = Vec2::new(
            wrap_degrees(current.yaw.to_degrees() - self.rest.yaw.to_degrees()),
            current.pitch.to_degrees() - self.rest.pitch.to_degrees(),
        );
        self.current_distance = current.distance;
        self.target_distance = self.zoom_range.clamp(current.distance, self.rest.distance);
    }

    /// Stop animating. The pointer returns to the centre, so the next activation starts from
    /// neutral parallax.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.pointer = Vec2::ZERO;
        self.motion = AmbientMotion::Dormant;
    }

    /// Integrate one frame of `dt` seconds and return the resulting pose.
    pub fn advance(&mut self, dt: f32) -> Pose {
        let dt = if self.integrated {
            self.smoothing.clamp_delta(dt)
        } else {
            self.smoothing.first_frame_delta
        };
        self.integrated = true;

        let steady = self.smoothing.rate;
        let rate = match self.motion {
            AmbientMotion::Intro { elapsed } => {
                let rate = self.intro.rate_at(elapsed, steady);
                let elapsed = elapsed + dt;
                self.motion = if elapsed >= self.intro.duration.as_secs_f32() {
                    AmbientMotion::Tracking
                } else {
                    AmbientMotion::Intro { elapsed }
                };
                rate
            }
            _ => steady,
        };

        self.offset = approach_vec2(self.offset, self.target_offset(), rate, dt);
        self.current_distance = approach(self.current_distance, self.target_distance, rate, dt);
        self.pose()
    }

    /// The current pose, without advancing time.
    pub fn pose(&self) -> Pose {
        if self.rest.distance < DEGENERATE_DISTANCE {
            return Pose::from_angles(self.focus_point, self.rest);
        }
        Pose::from_angles(
            self.focus_point,
            SphericalAngles {
                yaw: self.rest.yaw + self.offset.x.to_radians(),
                pitch: self.rest.pitch + self.offset.y.to_radians(),
                distance: self.current_distance,
            },
        )
    }

    /// The offset the animator is easing toward, `x` yaw and `y` pitch in degrees.
    pub fn target_offset(&self) -> Vec2 {
        self.pointer * Vec2::new(self.parallax.yaw, self.parallax.pitch)
    }

    /// Move the target distance by one dolly step, staying within the zoom range.
    pub fn nudge_dolly(&mut self, nudge: DistanceNudge, source: DollySource) {
        let delta = self.dolly_steps.delta(nudge, source, self.rest.distance);
        self.target_distance = self
            .zoom_range
            .clamp(self.target_distance + delta, self.rest.distance);
    }

    /// Set the normalized pointer position, clamped to `[-1, 1]` on both axes. `y` grows toward
    /// the bottom of the screen.
    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Where the camera rests with the pointer centred.
    pub fn rest_position(&self) -> Vec3 {
        self.rest_position
    }

    /// The point the camera looks at and orbits.
    pub fn focus_point(&self) -> Vec3 {
        self.focus_point
    }

    /// Yaw, pitch and distance of the rest pose.
    pub fn rest_angles(&self) -> SphericalAngles {
        self.rest
    }

    /// The smoothed offset from the rest angles, `x` yaw and `y` pitch in degrees.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// The distance the animator is easing toward.
    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    /// The smoothed distance from the focus point.
    pub fn current_distance(&self) -> f32 {
        self.current_distance
    }

    /// The normalized pointer, `(0, 0)` at the centre of the window.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// What the animator is currently doing.
    pub fn motion(&self) -> AmbientMotion {
        self.motion
    }

    /// Returns `true` between [`Self::activate`] and [`Self::deactivate`].
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance every enabled animator and write its pose to the camera. Called once per frame.
    pub fn update_camera_positions(
        mut cameras: Query<(&mut ParallaxCam, &mut Transform, Option<&mut OrbitControls>)>,
        mut redraw: EventWriter<RequestRedraw>,
        time: Res<Time>,
    ) {
        for (mut cam, mut transform, mut controls) in &mut cameras {
            if !cam.enabled {
                if cam.is_active() {
                    cam.deactivate();
                }
                continue;
            }
            if !cam.is_active() {
                cam.activate(controls.as_deref().map(OrbitControls::pose));
            }

            let pose = cam.advance(time.delta_secs());
            let scale = transform.scale;
            let moved = transform.set_if_neq(Transform {
                translation: pose.position,
                rotation: pose.rotation(),
                scale,
            });
            if let Some(controls) = controls.as_mut() {
                controls.write_pose(PoseWriter::Animator, &pose);
            }
            if moved {
                redraw.write(RequestRedraw);
            }
        }
    }
}
