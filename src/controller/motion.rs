//! Provides [`AmbientMotion`], the phase of the parallax animator.

use bevy_reflect::prelude::*;

/// What the parallax animator is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum AmbientMotion {
    /// Not animating. The animator is disabled or has not run since the scene was mounted.
    #[default]
    Dormant,
    /// Playing the reveal animation for a freshly mounted scene.
    Intro {
        /// Seconds since the reveal started.
        elapsed: f32,
    },
    /// Following the pointer at the steady state rate.
    Tracking,
}

impl AmbientMotion {
    /// Returns `true` while the reveal animation is playing.
    pub fn is_intro(&self) -> bool {
        matches!(self, Self::Intro { .. })
    }

    /// Seconds into the reveal, if it is still playing.
    pub fn intro_elapsed(&self) -> Option<f32> {
        match self {
            Self::Intro { elapsed } => Some(*elapsed),
            _ => None,
        }
    }
}
