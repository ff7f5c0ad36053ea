//! Provides [`ZoomRange`] and the dolly step settings.

use bevy_reflect::prelude::*;

/// Bound dolly zoom, as multiples of a scene's rest distance.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ZoomRange {
    /// The closest the camera may dolly in, as a multiple of the rest distance.
    pub min: f32,
    /// The farthest the camera may dolly out, as a multiple of the rest distance.
    pub max: f32,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

impl ZoomRange {
    /// Smallest multiplier accepted from configuration. Anything at or below zero would let the
    /// camera reach its focus point.
    pub const MIN_MULTIPLIER: f32 = 0.01;

    /// Build a range from a `[min, max]` pair as written in scene configuration. The bounds are
    /// reordered if needed.
    pub fn from_pair([a, b]: [f32; 2]) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self {
            min: min.max(Self::MIN_MULTIPLIER),
            max: max.max(Self::MIN_MULTIPLIER),
        }
    }

    /// Absolute distance bounds for a scene with the given rest distance.
    pub fn bounds(&self, rest_distance: f32) -> (f32, f32) {
        (rest_distance * self.min, rest_distance * self.max)
    }

    /// Clamp an absolute distance into this range.
    pub fn clamp(&self, distance: f32, rest_distance: f32) -> f32 {
        let (min, max) = self.bounds(rest_distance);
        distance.clamp(min, max)
    }
}

/// Which way a dolly nudge moves the target distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DistanceNudge {
    /// Move the camera away from its focus.
    Increase,
    /// Move the camera toward its focus.
    Decrease,
}

impl DistanceNudge {
    fn sign(self) -> f32 {
        match self {
            DistanceNudge::Increase => 1.0,
            DistanceNudge::Decrease => -1.0,
        }
    }
}

/// Where a dolly nudge came from. Keyboard nudges are coarser than wheel nudges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DollySource {
    /// A `+` or `-` key press.
    Keyboard,
    /// A single mouse wheel event.
    Wheel,
}

/// Dolly step sizes, as fractions of the rest distance.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct DollySteps {
    /// Step for each `+`/`-` key press.
    pub keyboard: f32,
    /// Step for each wheel event.
    pub wheel: f32,
}

impl Default for DollySteps {
    fn default() -> Self {
        Self {
            keyboard: 0.1,
            wheel: 0.05,
        }
    }
}

impl DollySteps {
    /// The signed change in distance for one nudge, for a scene with the given rest distance.
    pub fn delta(&self, nudge: DistanceNudge, source: DollySource, rest_distance: f32) -> f32 {
        let fraction = match source {
            DollySource::Keyboard => self.keyboard,
            DollySource::Wheel => self.wheel,
        };
        nudge.sign() * fraction * rest_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_reordered() {
        let range = ZoomRange::from_pair([1.5, 0.5]);
        assert_eq!(range, ZoomRange { min: 0.5, max: 1.5 });
    }

    #[test]
    fn pair_is_kept_positive() {
        let range = ZoomRange::from_pair([-1.0, 0.0]);
        assert!(range.min > 0.0 && range.max > 0.0);
    }

    #[test]
    fn clamps_to_rest_multiples() {
        let range = ZoomRange::from_pair([0.5, 1.5]);
        assert_eq!(range.clamp(10.0, 3.0), 4.5);
        assert_eq!(range.clamp(0.1, 3.0), 1.5);
        assert_eq!(range.clamp(2.0, 3.0), 2.0);
    }

    #[test]
    fn keyboard_steps_are_coarser() {
        let steps = DollySteps::default();
        let key = steps.delta(DistanceNudge::Increase, DollySource::Keyboard, 3.0);
        let wheel = steps.delta(DistanceNudge::Increase, DollySource::Wheel, 3.0);
        assert!(key > wheel && wheel > 0.0);
        assert!(steps.delta(DistanceNudge::Decrease, DollySource::Wheel, 3.0) < 0.0);
    }
}
