//! Frame rate independent exponential smoothing, and the intro reveal that eases into it.

use std::time::Duration;

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

/// The fraction of the remaining distance to cover in one step of `dt` seconds at `rate`.
///
/// Always in `[0, 1)` for non-negative inputs, so a smoothed value can never overshoot.
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate.max(0.0) * dt.max(0.0)).exp()
}

/// Move `current` toward `target` by one smoothing step.
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * smoothing_factor(rate, dt)
}

/// [`approach`] for both components of a vector.
pub fn approach_vec2(current: Vec2, target: Vec2, rate: f32, dt: f32) -> Vec2 {
    current + (target - current) * smoothing_factor(rate, dt)
}

/// [`approach`] for all components of a vector.
pub fn approach_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current + (target - current) * smoothing_factor(rate, dt)
}

/// Settings for the steady state response of the animator.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Smoothing {
    /// Exponential decay rate per second. The response covers ~63% of a change in `1 / rate`
    /// seconds.
    pub rate: f32,
    /// The longest frame time that will be integrated at once, in seconds. Longer frames, e.g.
    /// after a stalled tab, are integrated as if they took this long.
    pub max_delta: f32,
    /// Frame time used for the first frame after the animator is activated, in seconds.
    pub first_frame_delta: f32,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            rate: 8.0,
            max_delta: 0.1,
            first_frame_delta: 1.0 / 60.0,
        }
    }
}

impl Smoothing {
    /// Clamp a measured frame time into the range the animator will integrate.
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_delta)
        } else {
            self.first_frame_delta
        }
    }
}

/// The reveal animation played the first time a scene becomes visible.
///
/// The camera starts slightly pulled in and rotated, then relaxes toward the live target with a
/// slower rate that ramps linearly up to the steady state rate over `duration`.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct IntroReveal {
    /// Length of the reveal.
    pub duration: Duration,
    /// Smoothing rate at the very start of the reveal.
    pub initial_rate: f32,
    /// Starting yaw offset, in degrees.
    pub yaw_offset: f32,
    /// Starting pitch offset, in degrees.
    pub pitch_offset: f32,
    /// Starting distance, as a fraction of the rest distance.
    pub distance_factor: f32,
}

impl Default for IntroReveal {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1200),
            initial_rate: 1.5,
            yaw_offset: -4.0,
            pitch_offset: -2.0,
            distance_factor: 0.88,
        }
    }
}

impl IntroReveal {
    /// The smoothing rate `elapsed` seconds into the reveal.
    pub fn rate_at(&self, elapsed: f32, steady_rate: f32) -> f32 {
        let duration = self.duration.as_secs_f32();
        if duration <= 0.0 {
            return steady_rate;
        }
        let progress = (elapsed / duration).clamp(0.0, 1.0);
        self.initial_rate + (steady_rate - self.initial_rate) * progress
    }

    /// The angular offset the reveal starts from, `x` yaw and `y` pitch in degrees.
    pub fn start_offset(&self) -> Vec2 {
        Vec2::new(self.yaw_offset, self.pitch_offset)
    }
}
