//! A free-flying camera, [`FlyRig`].

use bevy_ecs::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use super::{angle::AngleLimits, euler_degrees, inputs_are_finite, look_rotation, CameraRig};

/// The frame [`FlyRig::altitude`] moves the rig in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AltitudeSpace {
    /// Along the parent's up axis.
    #[default]
    Local,
    /// Along the world's up axis.
    World,
}

/// Settings of a free-flying camera.
///
/// The rig moves and turns relative to its own axes. Callers drive it by passing the
/// entity's [`Transform`] into [`FlyRig::move_by`], [`FlyRig::look`] and
/// [`FlyRig::altitude`]; the rig never reads input devices itself.
#[derive(Debug, Clone, Component, Reflect)]
pub struct FlyRig {
    /// The frame used by [`FlyRig::altitude`].
    pub altitude_space: AltitudeSpace,
    /// Allowed pitch, in degrees.
    pub pitch_limits: AngleLimits,
    /// Allowed heading, in degrees.
    pub heading_limits: AngleLimits,
}

impl Default for FlyRig {
    fn default() -> Self {
        Self {
            altitude_space: AltitudeSpace::Local,
            pitch_limits: AngleLimits::PITCH,
            heading_limits: AngleLimits::HEADING,
        }
    }
}

impl CameraRig for FlyRig {
    fn pitch_limits(&self) -> AngleLimits {
        self.pitch_limits
    }

    fn heading_limits(&self) -> AngleLimits {
        self.heading_limits
    }
}

impl FlyRig {
    /// Create a fly rig moving vertically in the given frame.
    pub fn new(altitude_space: AltitudeSpace) -> Self {
        Self {
            altitude_space,
            ..Default::default()
        }
    }

    /// Translate along the rig's own right and forward axes.
    pub fn move_by(&self, transform: &mut Transform, right_delta: f32, forward_delta: f32) {
        if !inputs_are_finite("FlyRig::move_by", &[right_delta, forward_delta]) {
            return;
        }
        let offset = *transform.right() * right_delta + *transform.forward() * forward_delta;
        transform.translation += offset;
    }

    /// [`FlyRig::move_by`] with `x` right and `y` forward.
    pub fn move_by_vec(&self, transform: &mut Transform, delta: Vec2) {
        self.move_by(transform, delta.x, delta.y);
    }

    /// Add to the local pitch and heading, then wrap and clamp both. Roll is reset to zero.
    pub fn look(&self, transform: &mut Transform, pitch_delta: f32, heading_delta: f32) {
        if !inputs_are_finite("FlyRig::look", &[pitch_delta, heading_delta]) {
            return;
        }
        let (pitch, heading, _) = euler_degrees(transform.rotation);
        let (pitch, heading) = self.constrain_look(pitch + pitch_delta, heading + heading_delta);
        transform.rotation = look_rotation(pitch, heading, 0.0);
    }

    /// [`FlyRig::look`] with `x` pitch and `y` heading.
    pub fn look_by_vec(&self, transform: &mut Transform, delta: Vec2) {
        self.look(transform, delta.x, delta.y);
    }

    /// Raise or lower the rig in its [`AltitudeSpace`].
    ///
    /// `parent` is the parent's global transform, if the rig has a parent. Without one the
    /// local and world frames coincide.
    pub fn altitude(
        &self,
        transform: &mut Transform,
        parent: Option<&GlobalTransform>,
        up_delta: f32,
    ) {
        if !inputs_are_finite("FlyRig::altitude", &[up_delta]) {
            return;
        }
        match (self.altitude_space, parent) {
            (AltitudeSpace::Local, _) | (AltitudeSpace::World, None) => {
                transform.translation.y += up_delta;
            }
            (AltitudeSpace::World, Some(parent)) => {
                let mut world = parent.transform_point(transform.translation);
                world.y += up_delta;
                transform.translation = parent.affine().inverse().transform_point3(world);
            }
        }
    }
}
