//! Conversions between camera positions and spherical orbit poses.
//!
//! Internally, yaw is measured from the -Z axis in a right handed frame and pitch is positive when
//! the camera sits below its focus point, looking up. Both are radians unless a field name says
//! otherwise. [`spherical_to_cartesian`] is the only place a camera gets placed from angles, and
//! [`AngleConvention`] is the only place internal angles are translated into the angles stored by
//! an orbit-control component.

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

/// Below this distance a camera is considered to be sitting on its focus point.
pub const DEGENERATE_DISTANCE: f32 = 1e-3;

/// Yaw, pitch (radians) and distance of a camera relative to the point it orbits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct SphericalAngles {
    /// Rotation about the Y axis, zero when the camera looks down -Z.
    pub yaw: f32,
    /// Elevation, positive when the camera looks up at its focus.
    pub pitch: f32,
    /// Distance between the camera and its focus.
    pub distance: f32,
}

/// Yaw, pitch and distance of the direction `from -> to`.
///
/// When the two points coincide the direction is undefined, and this returns zero yaw and pitch
/// instead of propagating NaN.
pub fn distance_and_angles(from: Vec3, to: Vec3) -> SphericalAngles {
    let delta = to - from;
    let distance = delta.length();
    if !distance.is_finite() || distance < DEGENERATE_DISTANCE {
        return SphericalAngles {
            yaw: 0.0,
            pitch: 0.0,
            distance: if distance.is_finite() { distance } else { 0.0 },
        };
    }
    SphericalAngles {
        yaw: (-delta.x).atan2(-delta.z),
        // Rounding can push the ratio just past 1.0 for vertical directions.
        pitch: (delta.y / distance).clamp(-1.0, 1.0).asin(),
        distance,
    }
}

/// Place a camera on the sphere of radius `distance` around `focus`.
pub fn spherical_to_cartesian(focus: Vec3, yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    focus
        + Vec3::new(
            sin_yaw * cos_pitch * distance,
            -sin_pitch * distance,
            cos_yaw * cos_pitch * distance,
        )
}

/// The direction a camera with this yaw and pitch is looking in.
///
/// This matches the forward vector of a Bevy [`Transform`](bevy_transform::prelude::Transform)
/// rotated by `Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)`.
pub fn forward_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
}

/// The point `distance` units in front of a camera at `position`.
pub fn focus_from_pose(position: Vec3, yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    position + forward_from_angles(yaw, pitch) * distance
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// A camera placement, as computed by the parallax animator each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct Pose {
    /// World space position of the camera.
    pub position: Vec3,
    /// Internal yaw, in degrees.
    pub yaw_deg: f32,
    /// Internal pitch, in degrees.
    pub pitch_deg: f32,
    /// Distance to the focus point.
    pub distance: f32,
}

impl Pose {
    /// Build a pose orbiting `focus` at the given angles.
    pub fn from_angles(focus: Vec3, angles: SphericalAngles) -> Self {
        Self {
            position: spherical_to_cartesian(focus, angles.yaw, angles.pitch, angles.distance),
            yaw_deg: angles.yaw.to_degrees(),
            pitch_deg: angles.pitch.to_degrees(),
            distance: angles.distance,
        }
    }

    /// Orientation of a camera at this pose, looking at its focus with no roll.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw_deg.to_radians(),
            self.pitch_deg.to_radians(),
            0.0,
        )
    }

    /// The focus point this pose orbits.
    pub fn focus(&self) -> Vec3 {
        focus_from_pose(
            self.position,
            self.yaw_deg.to_radians(),
            self.pitch_deg.to_radians(),
            self.distance,
        )
    }
}

/// How an orbit-control component stores its angles relative to the internal convention.
///
/// The angles are stored as a `Vec2` in degrees, with `x` holding pitch and `y` holding yaw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AngleConvention {
    /// The component uses Bevy's -Z forward with YXZ euler angles, the same as the animator.
    #[default]
    Matching,
    /// The component stores both angles negated.
    Inverted,
}

impl AngleConvention {
    fn sign(self) -> f32 {
        match self {
            AngleConvention::Matching => 1.0,
            AngleConvention::Inverted => -1.0,
        }
    }

    /// Convert internal yaw and pitch (degrees) into the component's `angles`.
    pub fn to_external(self, yaw_deg: f32, pitch_deg: f32) -> Vec2 {
        Vec2::new(pitch_deg, yaw_deg) * self.sign()
    }

    /// Convert the component's `angles` back into internal `(yaw, pitch)`, in degrees.
    pub fn from_external(self, angles: Vec2) -> (f32, f32) {
        let internal = angles * self.sign();
        (internal.y, internal.x)
    }
}
