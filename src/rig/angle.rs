//! Angle wrapping and clamping shared by every rig.

use bevy_reflect::prelude::*;

/// Wrap an angle in degrees into the canonical range `[-180, 180)`.
///
/// The result is congruent to `angle` modulo 360. Non-finite input is not guarded and
/// propagates as NaN.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // `rem_euclid` can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Clamp `value` between `min` and `max`.
///
/// The lower bound is checked first, then the upper one. Unlike [`f32::clamp`] this never
/// panics when `min > max`: with reversed bounds any value below `min` yields `min` and
/// everything else yields `max`.
pub fn clamp_between(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// An inclusive `(min, max)` range of angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AngleLimits {
    /// Smallest allowed angle.
    pub min: f32,
    /// Largest allowed angle.
    pub max: f32,
}

impl AngleLimits {
    /// Limits spanning `a..=b`, whichever order they are given in.
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Default pitch range, straight down to straight up.
    pub const PITCH: Self = Self {
        min: -90.0,
        max: 90.0,
    };

    /// Default heading range, a full turn.
    pub const HEADING: Self = Self {
        min: -180.0,
        max: 180.0,
    };

    /// Clamp an angle that has already been wrapped.
    pub fn clamp(&self, angle: f32) -> f32 {
        clamp_between(angle, self.min, self.max)
    }

    /// Wrap `angle` into `[-180, 180)` and then clamp it to these limits.
    pub fn wrap_and_clamp(&self, angle: f32) -> f32 {
        self.clamp(wrap_angle(angle))
    }

    /// Does this range contain `angle`?
    pub fn contains(&self, angle: f32) -> bool {
        (self.min..=self.max).contains(&angle)
    }
}
