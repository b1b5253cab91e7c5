//! The orbit-around-target camera, [`OrbitRig`].

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use super::{
    angle::{clamp_between, AngleLimits},
    euler_degrees, inputs_are_finite,
    lens::{Lens, RigCamera},
    look_rotation,
    zoom::{percent, remap_percent, ZoomChange, ZoomLimits, ZoomListeners},
    CameraRig,
};

/// What an [`OrbitRig`] orbits around.
///
/// Either a scene entity, whose world position the [`RigPlugin`](super::RigPlugin) keeps up
/// to date, or a fixed point in world space. The entity is held weakly: once it is
/// despawned the rig loses its target.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct OrbitTarget {
    entity: Option<Entity>,
    position: Vec3,
}

impl OrbitTarget {
    /// Orbit a fixed point in world space.
    pub fn point(position: Vec3) -> Self {
        Self {
            entity: None,
            position,
        }
    }

    /// Orbit an entity, currently located at `position` in world space.
    pub fn entity(entity: Entity, position: Vec3) -> Self {
        Self {
            entity: Some(entity),
            position,
        }
    }

    /// The followed entity, if this target is not a fixed point.
    pub fn target_entity(&self) -> Option<Entity> {
        self.entity
    }

    /// The last known world position of the target.
    pub fn position(&self) -> Vec3 {
        self.position
    }
}

/// Configuration of an [`OrbitRig`], fixed for the rig's lifetime apart from
/// [`OrbitRig::set_use_distance_zoom`].
#[derive(Debug, Clone, Reflect)]
pub struct OrbitSettings {
    /// Allowed pitch, in degrees.
    pub pitch_limits: AngleLimits,
    /// Allowed heading, in degrees.
    pub heading_limits: AngleLimits,
    /// Zoom by moving toward the target when true, by narrowing the lens when false.
    pub use_distance_zoom: bool,
    /// Bounds for both zoom representations.
    pub zoom_limits: ZoomLimits,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            pitch_limits: AngleLimits::PITCH,
            heading_limits: AngleLimits::HEADING,
            use_distance_zoom: true,
            zoom_limits: ZoomLimits::default(),
        }
    }
}

/// The mutable state of an [`OrbitRig`]. Angles are in degrees.
///
/// Only one of `zoom_distance` and `zoom_fov` drives the camera at a time, selected by
/// [`OrbitSettings::use_distance_zoom`]. The other one is kept but never written to the
/// camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct OrbitState {
    /// Rotation about the lateral axis. Positive looks up, placing the rig below the target.
    pub pitch: f32,
    /// Rotation about the vertical axis.
    pub heading: f32,
    /// Rotation about the viewing axis. Never wrapped or clamped.
    pub roll: f32,
    /// Distance between the rig and its target.
    pub zoom_distance: f32,
    /// Focal length or field of view, depending on the camera's [`Lens`].
    pub zoom_fov: f32,
}

/// A camera orbiting a target at a given pitch, heading, roll and zoom.
///
/// Every setter that changes the rig's pose recomputes the entity's [`Transform`] before it
/// returns, so the transform always matches [`OrbitRig::state`]:
///
/// - rotation is `pitch`/`heading` followed by `roll`,
/// - translation is the target position plus `zoom_distance` along the rotated back (+Z)
///   axis, so the camera looks at the target down its forward (-Z) axis.
///
/// The transform is written as a world-space pose, so orbit rigs should not have a parent.
///
/// # Driving the rig
///
/// Query the rig together with its `Transform` and [`RigCamera`] and call the setters:
///
/// ```rust,ignore
/// fn zoom_in(mut rigs: Query<(&mut OrbitRig, &mut Transform, &mut RigCamera)>) {
///     for (mut rig, mut transform, mut camera) in &mut rigs {
///         rig.modify_zoom(&mut transform, &mut camera, -1.0);
///     }
/// }
/// ```
///
/// The [`RigPlugin`](super::RigPlugin) activates new rigs, which reads the initial angles from
/// the transform and the initial zoom from the target distance and the camera lens.
#[derive(Debug, Clone, Component, Reflect)]
pub struct OrbitRig {
    settings: OrbitSettings,
    target: Option<OrbitTarget>,
    state: OrbitState,
    /// Forces the next zoom setter through even if the value did not change.
    zoom_dirty: bool,
    activated: bool,
    /// Zoom change callbacks.
    #[reflect(ignore)]
    pub listeners: ZoomListeners,
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

impl CameraRig for OrbitRig {
    fn pitch_limits(&self) -> AngleLimits {
        self.settings.pitch_limits
    }

    fn heading_limits(&self) -> AngleLimits {
        self.settings.heading_limits
    }
}

impl OrbitRig {
    /// Create a rig with no target.
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            target: None,
            state: OrbitState::default(),
            zoom_dirty: false,
            activated: false,
            listeners: ZoomListeners::default(),
        }
    }

    /// Set the initial target. Does not move the camera; use [`OrbitRig::set_target`] for that.
    pub fn with_target(self, target: OrbitTarget) -> Self {
        Self {
            target: Some(target),
            ..self
        }
    }

    /// Register zoom listeners before spawning.
    pub fn with_listeners(self, listeners: ZoomListeners) -> Self {
        Self { listeners, ..self }
    }

    /// The rig's configuration.
    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    /// The rig's current pitch, heading, roll and zoom.
    pub fn state(&self) -> OrbitState {
        self.state
    }

    /// The current target, if any.
    pub fn target(&self) -> Option<OrbitTarget> {
        self.target
    }

    /// Has [`OrbitRig::activate`] run?
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Current pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.state.pitch
    }

    /// Current heading in degrees.
    pub fn heading(&self) -> f32 {
        self.state.heading
    }

    /// Current roll in degrees.
    pub fn roll(&self) -> f32 {
        self.state.roll
    }

    /// Current distance to the target.
    pub fn zoom_distance(&self) -> f32 {
        self.state.zoom_distance
    }

    /// Current focal length or field of view.
    pub fn zoom_fov(&self) -> f32 {
        self.state.zoom_fov
    }

    /// Is zoom driven by distance rather than by the lens?
    pub fn use_distance_zoom(&self) -> bool {
        self.settings.use_distance_zoom
    }

    /// Switch between distance and lens zoom. The next zoom setter always applies and
    /// notifies, even if its value is unchanged.
    pub fn set_use_distance_zoom(&mut self, enabled: bool) {
        if self.settings.use_distance_zoom != enabled {
            self.settings.use_distance_zoom = enabled;
            self.zoom_dirty = true;
        }
    }

    /// Make the next zoom setter apply and notify even if its value is unchanged.
    pub fn force_zoom_refresh(&mut self) {
        self.zoom_dirty = true;
    }

    /// Initialize the rig from its current transform and camera. Runs once; later calls do
    /// nothing.
    ///
    /// Pitch and heading are read from the rotation as is. Zoom is initialized in two
    /// phases, distance first, then field of view: assigning the field of view re-evaluates
    /// the pose and syncs the orthographic size, both of which read the distance.
    pub fn activate(&mut self, transform: &mut Transform, camera: &mut RigCamera) {
        if self.activated {
            return;
        }
        self.activated = true;

        let (pitch, heading, _) = euler_degrees(transform.rotation);
        self.state.pitch = pitch;
        self.state.heading = heading;

        self.init_zoom_distance(transform, camera);
        self.init_zoom_fov(transform, camera);
        debug!(
            "Activated orbit rig: pitch {pitch:.2}, heading {heading:.2}, distance {:.3}, \
             fov {:.3}",
            self.state.zoom_distance, self.state.zoom_fov
        );
    }

    /// First activation phase: the distance to the target, if there is one.
    fn init_zoom_distance(&mut self, transform: &mut Transform, camera: &mut RigCamera) {
        let Some(target) = self.target else {
            return;
        };
        let distance = transform.translation.distance(target.position);
        if self.settings.use_distance_zoom {
            // Through the setter, so listeners hear about the initial value.
            self.zoom_dirty = true;
            self.set_zoom_distance(transform, camera, distance);
        } else {
            self.state.zoom_distance = distance;
        }
    }

    /// Second activation phase: the camera's current focal length or field of view.
    fn init_zoom_fov(&mut self, transform: &mut Transform, camera: &mut RigCamera) {
        let value = camera.lens.zoom_value();
        if self.settings.use_distance_zoom {
            self.state.zoom_fov = value;
        } else {
            self.zoom_dirty = true;
            self.set_zoom_fov(transform, camera, value);
        }
    }

    /// Replace the target and move the camera to orbit it.
    pub fn set_target(&mut self, transform: &mut Transform, target: Option<OrbitTarget>) {
        self.target = target;
        self.evaluate(transform);
    }

    /// Store the resolved world position of an entity target without moving the rig, clearing
    /// the target if the entity no longer exists. Returns true if the stored position changed.
    pub(crate) fn refresh_target(&mut self, resolved: Option<Vec3>) -> bool {
        let Some(target) = self.target.as_mut() else {
            return false;
        };
        let Some(entity) = target.entity else {
            return false;
        };
        match resolved {
            None => {
                debug!("Orbit target {entity} is gone, clearing it");
                self.target = None;
                false
            }
            Some(position) if position != target.position => {
                target.position = position;
                true
            }
            Some(_) => false,
        }
    }

    /// [`OrbitRig::refresh_target`], then move the rig to orbit the new position. Returns true
    /// if the transform moved.
    pub(crate) fn track_target(
        &mut self,
        transform: &mut Transform,
        resolved: Option<Vec3>,
    ) -> bool {
        let moved = self.refresh_target(resolved);
        if moved {
            self.evaluate(transform);
        }
        moved
    }

    /// Set pitch and heading in degrees. Each is wrapped into `[-180, 180)` and clamped to
    /// its limits.
    pub fn set_pitch_and_heading(&mut self, transform: &mut Transform, pitch: f32, heading: f32) {
        if !inputs_are_finite("OrbitRig::set_pitch_and_heading", &[pitch, heading]) {
            return;
        }
        let (pitch, heading) = self.constrain_look(pitch, heading);
        self.state.pitch = pitch;
        self.state.heading = heading;
        self.evaluate(transform);
    }

    /// Add to pitch and heading. See [`OrbitRig::set_pitch_and_heading`].
    pub fn modify_pitch_and_heading(
        &mut self,
        transform: &mut Transform,
        pitch_delta: f32,
        heading_delta: f32,
    ) {
        self.set_pitch_and_heading(
            transform,
            self.state.pitch + pitch_delta,
            self.state.heading + heading_delta,
        );
    }

    /// Set roll in degrees. Roll is neither wrapped nor clamped.
    pub fn set_roll(&mut self, transform: &mut Transform, roll: f32) {
        if !inputs_are_finite("OrbitRig::set_roll", &[roll]) {
            return;
        }
        self.state.roll = roll;
        self.evaluate(transform);
    }

    /// Set the distance to the target, clamped to the zoom limits.
    ///
    /// Does nothing unless distance zoom is active. Listeners are notified, distance channel
    /// first, whenever the stored distance changes or a refresh was forced.
    pub fn set_zoom_distance(
        &mut self,
        transform: &mut Transform,
        camera: &mut RigCamera,
        value: f32,
    ) {
        if !self.settings.use_distance_zoom {
            return;
        }
        if !inputs_are_finite("OrbitRig::set_zoom_distance", &[value]) {
            return;
        }
        let value = self.settings.zoom_limits.clamp_distance(value);
        if value == self.state.zoom_distance && !self.zoom_dirty {
            return;
        }

        self.state.zoom_distance = value;
        self.sync_orthographic_size(camera);
        self.evaluate(transform);

        self.listeners.dispatch(ZoomChange::Distance(value));
        self.zoom_dirty = false;
    }

    /// Set the lens zoom value and write it to the camera.
    ///
    /// Does nothing while distance zoom is active. With a [`Lens::Physical`] camera the value
    /// is a focal length clamped to `[min_fov, max_fov]`. With a [`Lens::Simple`] camera it is
    /// a field of view clamped with the bounds swapped, `clamp_between(value, max_fov,
    /// min_fov)`, which snaps every value to one of the two bounds. Listeners are notified,
    /// fov channel first, whenever the stored value changes or a refresh was forced.
    pub fn set_zoom_fov(&mut self, transform: &mut Transform, camera: &mut RigCamera, value: f32) {
        if self.settings.use_distance_zoom {
            return;
        }
        if !inputs_are_finite("OrbitRig::set_zoom_fov", &[value]) {
            return;
        }
        let ZoomLimits {
            min_fov, max_fov, ..
        } = self.settings.zoom_limits;
        let value = match camera.lens {
            Lens::Physical { .. } => clamp_between(value, min_fov, max_fov),
            // TODO: decide with downstream users whether the simple lens should clamp to
            // `[min_fov, max_fov]` like the physical one.
            Lens::Simple { .. } => clamp_between(value, max_fov, min_fov),
        };
        if value == self.state.zoom_fov && !self.zoom_dirty {
            return;
        }

        camera.lens.set_zoom_value(value);
        self.state.zoom_fov = value;
        self.sync_orthographic_size(camera);
        self.evaluate(transform);

        self.listeners.dispatch(ZoomChange::Fov(value));
        self.zoom_dirty = false;
    }

    /// The active zoom as a fraction of its limits: `0.0` at the minimum, `1.0` at the
    /// maximum. Lens zoom reads the camera's live value. Degenerate limits read as `0.0`.
    pub fn zoom_percent(&self, camera: &RigCamera) -> f32 {
        let limits = &self.settings.zoom_limits;
        if self.settings.use_distance_zoom {
            percent(
                self.state.zoom_distance,
                limits.min_distance,
                limits.max_distance,
            )
        } else {
            percent(camera.lens.zoom_value(), limits.min_fov, limits.max_fov)
        }
    }

    /// Set the active zoom as a fraction of its limits. See [`OrbitRig::zoom_percent`].
    pub fn set_zoom_percent(
        &mut self,
        transform: &mut Transform,
        camera: &mut RigCamera,
        value: f32,
    ) {
        let limits = self.settings.zoom_limits;
        if self.settings.use_distance_zoom {
            let distance = remap_percent(value, limits.min_distance, limits.max_distance);
            self.set_zoom_distance(transform, camera, distance);
        } else {
            let fov = remap_percent(value, limits.min_fov, limits.max_fov);
            self.set_zoom_fov(transform, camera, fov);
        }
        // The setters skip unchanged values, which is every value once the limits collapse.
        self.evaluate(transform);
    }

    /// Add to whichever zoom value is active.
    pub fn modify_zoom(&mut self, transform: &mut Transform, camera: &mut RigCamera, delta: f32) {
        if self.settings.use_distance_zoom {
            self.set_zoom_distance(transform, camera, self.state.zoom_distance + delta);
        } else {
            self.set_zoom_fov(transform, camera, self.state.zoom_fov + delta);
        }
    }

    /// Set whichever zoom value is active.
    pub fn set_zoom(&mut self, transform: &mut Transform, camera: &mut RigCamera, value: f32) {
        if self.settings.use_distance_zoom {
            self.set_zoom_distance(transform, camera, value);
        } else {
            self.set_zoom_fov(transform, camera, value);
        }
    }

    /// Keep an orthographic camera's extent equal to what a perspective camera at the current
    /// distance would see at the target.
    fn sync_orthographic_size(&self, camera: &mut RigCamera) {
        if camera.is_orthographic() && self.settings.use_distance_zoom {
            camera.orthographic_size =
                self.state.zoom_distance * (camera.field_of_view() * 0.5).to_radians().tan();
        }
    }

    /// Recompute the pose from the state. Does nothing without a target.
    fn evaluate(&self, transform: &mut Transform) {
        let Some(target) = self.target else {
            return;
        };
        let rotation = look_rotation(self.state.pitch, self.state.heading, 0.0)
            * Quat::from_rotation_z(self.state.roll.to_radians());
        let translation = target.position + rotation * (Vec3::Z * self.state.zoom_distance);
        *transform = Transform {
            translation,
            rotation,
            scale: transform.scale,
        };
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Log = Arc<Mutex<Vec<(&'static str, f32)>>>;

    fn record(rig: &mut OrbitRig) -> Log {
        let log: Log = Default::default();
        let l = log.clone();
        rig.listeners
            .on_zoom_distance_changed(move |c| l.lock().unwrap().push(("distance", c.value())));
        let l = log.clone();
        rig.listeners
            .on_zoom_fov_changed(move |c| l.lock().unwrap().push(("fov", c.value())));
        let l = log.clone();
        rig.listeners
            .on_zoom_changed(move |c| l.lock().unwrap().push(("zoom", c.value())));
        log
    }

    fn settings(min_distance: f32, max_distance: f32) -> OrbitSettings {
        OrbitSettings {
            zoom_limits: ZoomLimits {
                min_distance,
                max_distance,
                min_fov: 20.0,
                max_fov: 60.0,
            },
            ..Default::default()
        }
    }

    /// A rig `distance` units behind a target at the origin, already activated.
    fn orbiting(
        settings: OrbitSettings,
        distance: f32,
        camera: &mut RigCamera,
    ) -> (OrbitRig, Transform) {
        let mut rig = OrbitRig::new(settings).with_target(OrbitTarget::point(Vec3::ZERO));
        let mut transform = Transform::from_xyz(0.0, 0.0, distance);
        rig.activate(&mut transform, camera);
        (rig, transform)
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-4), "{a} != {b}");
    }

    #[test]
    fn rests_behind_target_facing_it() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(1.0, 100.0), 10.0, &mut camera);
        rig.set_pitch_and_heading(&mut transform, 0.0, 0.0);

        assert_close(transform.translation, Vec3::new(0.0, 0.0, 10.0));
        assert_close(*transform.forward(), Vec3::NEG_Z);
        assert_eq!(rig.zoom_distance(), 10.0);
    }

    #[test]
    fn pose_stays_at_zoom_distance() {
        let mut camera = RigCamera::default();
        let target = Vec3::new(1.0, -2.0, 3.0);
        let mut rig = OrbitRig::new(settings(1.0, 100.0)).with_target(OrbitTarget::point(target));
        let mut transform = Transform::from_xyz(1.0, -2.0, 10.0);
        rig.activate(&mut transform, &mut camera);

        for (pitch, heading, roll, zoom) in [
            (10.0, 20.0, 0.0, 3.0),
            (-75.0, 170.0, 45.0, 12.5),
            (89.0, -179.0, -720.0, 99.0),
            (400.0, -400.0, 10.0, 0.5),
        ] {
            rig.set_pitch_and_heading(&mut transform, pitch, heading);
            rig.set_roll(&mut transform, roll);
            rig.set_zoom_distance(&mut transform, &mut camera, zoom);
            let distance = transform.translation.distance(target);
            assert!((distance - rig.zoom_distance()).abs() < 1e-3);
            // Forward always points at the target.
            let to_target = (target - transform.translation).normalize();
            assert_close(*transform.forward(), to_target);
        }
    }

    #[test]
    fn pitch_and_heading_stay_within_limits() {
        let mut camera = RigCamera::default();
        let settings = OrbitSettings {
            pitch_limits: AngleLimits::new(-30.0, 60.0),
            heading_limits: AngleLimits::new(-90.0, 90.0),
            ..settings(1.0, 100.0)
        };
        let (mut rig, mut transform) = orbiting(settings, 10.0, &mut camera);
        let mut angle = -1000.0;
        while angle < 1000.0 {
            rig.set_pitch_and_heading(&mut transform, angle, -angle * 1.7);
            assert!(rig.pitch_limits().contains(rig.pitch()), "{angle}");
            assert!(rig.heading_limits().contains(rig.heading()), "{angle}");
            angle += 13.0;
        }
    }

    #[test]
    fn modify_pitch_and_heading_accumulates() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(1.0, 100.0), 10.0, &mut camera);
        rig.modify_pitch_and_heading(&mut transform, 10.0, 170.0);
        rig.modify_pitch_and_heading(&mut transform, 10.0, 20.0);
        assert!((rig.pitch() - 20.0).abs() < 1e-4);
        // 190 wraps around to -170.
        assert!((rig.heading() + 170.0).abs() < 1e-4);
    }

    #[test]
    fn roll_is_not_wrapped() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(1.0, 100.0), 10.0, &mut camera);
        rig.set_roll(&mut transform, 450.0);
        assert_eq!(rig.roll(), 450.0);
        // A 450 degree roll turns the camera's up vector onto its left.
        assert_close(*transform.up(), Vec3::NEG_X);
        assert_close(transform.translation, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn modify_zoom_clamps_and_notifies_once() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);
        let log = record(&mut rig);

        rig.modify_zoom(&mut transform, &mut camera, -10.0);

        assert_eq!(rig.zoom_distance(), 2.0);
        assert_eq!(*log.lock().unwrap(), [("distance", 2.0), ("zoom", 2.0)]);
        assert_close(transform.translation, Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn unchanged_distance_is_silent_until_forced() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);
        let log = record(&mut rig);

        rig.set_zoom_distance(&mut transform, &mut camera, 5.0);
        rig.set_zoom(&mut transform, &mut camera, 25.0);
        rig.set_zoom(&mut transform, &mut camera, 30.0);
        assert_eq!(log.lock().unwrap().len(), 2, "only the first clamp to 20 notifies");

        rig.force_zoom_refresh();
        rig.set_zoom_distance(&mut transform, &mut camera, 20.0);
        assert_eq!(log.lock().unwrap().len(), 4);

        // The forced refresh is consumed.
        rig.set_zoom_distance(&mut transform, &mut camera, 20.0);
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn distance_setter_ignored_in_fov_mode() {
        let mut camera = RigCamera::physical(35.0, 24.0);
        let settings = OrbitSettings {
            use_distance_zoom: false,
            ..settings(2.0, 20.0)
        };
        let (mut rig, mut transform) = orbiting(settings, 5.0, &mut camera);
        let log = record(&mut rig);
        let before = transform;

        rig.set_zoom_distance(&mut transform, &mut camera, 10.0);

        assert_eq!(rig.zoom_distance(), 5.0);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(transform, before);
    }

    #[test]
    fn fov_setter_ignored_in_distance_mode() {
        let mut camera = RigCamera::simple(40.0);
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);
        let log = record(&mut rig);

        rig.set_zoom_fov(&mut transform, &mut camera, 50.0);

        assert_eq!(rig.zoom_fov(), 40.0);
        assert_eq!(camera.field_of_view(), 40.0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn simple_lens_clamps_with_swapped_bounds() {
        // fov limits are (20, 60). The simple lens clamps as clamp_between(value, 60, 20):
        // anything below 60 snaps to 60, anything else to 20.
        let mut camera = RigCamera::simple(40.0);
        let settings = OrbitSettings {
            use_distance_zoom: false,
            ..settings(2.0, 20.0)
        };
        let (mut rig, mut transform) = orbiting(settings, 5.0, &mut camera);
        assert_eq!(rig.zoom_fov(), 60.0, "activation assigns through the setter");
        let log = record(&mut rig);

        rig.set_zoom_fov(&mut transform, &mut camera, 80.0);
        assert_eq!(rig.zoom_fov(), 20.0);
        assert_eq!(camera.field_of_view(), 20.0);

        rig.set_zoom_fov(&mut transform, &mut camera, 30.0);
        assert_eq!(rig.zoom_fov(), 60.0);
        assert_eq!(camera.field_of_view(), 60.0);

        assert_eq!(
            *log.lock().unwrap(),
            [("fov", 20.0), ("zoom", 20.0), ("fov", 60.0), ("zoom", 60.0)]
        );
    }

    #[test]
    fn physical_lens_clamps_focal_length() {
        let mut camera = RigCamera::physical(35.0, 24.0);
        let settings = OrbitSettings {
            use_distance_zoom: false,
            ..settings(2.0, 20.0)
        };
        let (mut rig, mut transform) = orbiting(settings, 5.0, &mut camera);
        assert_eq!(rig.zoom_fov(), 35.0);

        rig.set_zoom_fov(&mut transform, &mut camera, 80.0);
        assert_eq!(rig.zoom_fov(), 60.0);
        assert_eq!(camera.lens.zoom_value(), 60.0);

        rig.modify_zoom(&mut transform, &mut camera, -45.0);
        assert_eq!(rig.zoom_fov(), 20.0);
        // Lens zoom leaves the distance alone.
        assert_close(transform.translation, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn zoom_percent_round_trips() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);

        rig.set_zoom_percent(&mut transform, &mut camera, 0.0);
        assert_eq!(rig.zoom_percent(&camera), 0.0);
        assert_eq!(rig.zoom_distance(), 2.0);

        for p in [0.1, 0.25, 0.5, 0.9] {
            rig.set_zoom_percent(&mut transform, &mut camera, p);
            assert!((rig.zoom_percent(&camera) - p).abs() < 1e-5);
        }
    }

    #[test]
    fn zoom_percent_reads_the_live_lens() {
        let mut camera = RigCamera::physical(35.0, 24.0);
        let settings = OrbitSettings {
            use_distance_zoom: false,
            ..settings(2.0, 20.0)
        };
        let (mut rig, mut transform) = orbiting(settings, 5.0, &mut camera);

        rig.set_zoom_percent(&mut transform, &mut camera, 0.75);
        assert!((rig.zoom_percent(&camera) - 0.75).abs() < 1e-5);
        assert!((camera.lens.zoom_value() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_percent_refreshes_pose_with_degenerate_limits() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(5.0, 5.0), 5.0, &mut camera);
        assert_eq!(rig.zoom_percent(&camera), 0.0);

        // Something else moved the camera; the distance setter short-circuits, but the
        // percent setter still restores the orbit pose.
        transform.translation = Vec3::new(3.0, 3.0, 3.0);
        rig.set_zoom_percent(&mut transform, &mut camera, 0.5);
        assert_close(transform.translation, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn orthographic_size_follows_distance() {
        // With a 90 degree field of view the half height equals the distance.
        let mut camera = RigCamera::simple(90.0).with_orthographic(1.0);
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);
        assert!((camera.orthographic_size - 5.0).abs() < 1e-4);

        rig.set_zoom_distance(&mut transform, &mut camera, 8.0);
        assert!((camera.orthographic_size - 8.0).abs() < 1e-4);
    }

    #[test]
    fn orthographic_size_untouched_by_lens_zoom() {
        let mut camera = RigCamera::physical(35.0, 24.0).with_orthographic(1.0);
        let settings = OrbitSettings {
            use_distance_zoom: false,
            ..settings(2.0, 20.0)
        };
        let (mut rig, mut transform) = orbiting(settings, 5.0, &mut camera);
        rig.set_zoom_fov(&mut transform, &mut camera, 50.0);
        assert_eq!(camera.orthographic_size, 1.0);
    }

    #[test]
    fn activation_reads_pose_and_notifies() {
        let mut camera = RigCamera::simple(40.0);
        let mut rig =
            OrbitRig::new(settings(2.0, 20.0)).with_target(OrbitTarget::point(Vec3::ZERO));
        let log = record(&mut rig);
        let mut transform =
            Transform::from_xyz(0.0, 0.0, 30.0).with_rotation(look_rotation(0.0, 25.0, 0.0));

        rig.activate(&mut transform, &mut camera);

        assert!(rig.is_activated());
        assert!((rig.heading() - 25.0).abs() < 1e-3);
        assert!(rig.pitch().abs() < 1e-3);
        // 30 units away, clamped to the 20 unit limit.
        assert_eq!(rig.zoom_distance(), 20.0);
        assert_eq!(rig.zoom_fov(), 40.0);
        assert_eq!(*log.lock().unwrap(), [("distance", 20.0), ("zoom", 20.0)]);

        // Activation only happens once.
        rig.activate(&mut transform, &mut camera);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn activation_initializes_distance_before_fov() {
        // In lens mode the distance is not clamped, and the fov phase evaluates the pose
        // with it, so the rig ends up 50 units out rather than at the origin.
        let mut camera = RigCamera::physical(35.0, 24.0);
        let settings = OrbitSettings {
            use_distance_zoom: false,
            ..settings(2.0, 20.0)
        };
        let mut rig = OrbitRig::new(settings).with_target(OrbitTarget::point(Vec3::ZERO));
        let log = record(&mut rig);
        let mut transform = Transform::from_xyz(0.0, 0.0, 50.0);

        rig.activate(&mut transform, &mut camera);

        assert_eq!(rig.zoom_distance(), 50.0);
        assert_eq!(rig.zoom_fov(), 35.0);
        assert_close(transform.translation, Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(*log.lock().unwrap(), [("fov", 35.0), ("zoom", 35.0)]);
    }

    #[test]
    fn activation_without_target_keeps_pose() {
        let mut camera = RigCamera::simple(40.0);
        let mut rig = OrbitRig::new(settings(2.0, 20.0));
        let log = record(&mut rig);
        let mut transform = Transform::from_xyz(4.0, 5.0, 6.0);

        rig.activate(&mut transform, &mut camera);
        rig.set_pitch_and_heading(&mut transform, 30.0, 40.0);
        rig.set_roll(&mut transform, 10.0);

        assert_eq!(transform, Transform::from_xyz(4.0, 5.0, 6.0));
        assert_eq!(rig.zoom_distance(), 0.0);
        assert_eq!(rig.zoom_fov(), 40.0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn set_target_moves_without_reinitializing() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);
        let log = record(&mut rig);

        rig.set_target(&mut transform, Some(OrbitTarget::point(Vec3::new(10.0, 0.0, 0.0))));

        assert_eq!(rig.zoom_distance(), 5.0);
        assert_close(transform.translation, Vec3::new(10.0, 0.0, 5.0));
        assert!(log.lock().unwrap().is_empty());

        rig.set_target(&mut transform, None);
        rig.set_pitch_and_heading(&mut transform, 45.0, 45.0);
        assert_close(transform.translation, Vec3::new(10.0, 0.0, 5.0));
    }

    #[test]
    fn entity_target_is_tracked_and_dropped() {
        let mut camera = RigCamera::default();
        let entity = Entity::from_raw(7);
        let mut rig = OrbitRig::new(settings(2.0, 20.0))
            .with_target(OrbitTarget::entity(entity, Vec3::ZERO));
        let mut transform = Transform::from_xyz(0.0, 0.0, 5.0);
        rig.activate(&mut transform, &mut camera);

        assert!(!rig.track_target(&mut transform, Some(Vec3::ZERO)));
        assert!(rig.track_target(&mut transform, Some(Vec3::Y)));
        assert_close(transform.translation, Vec3::new(0.0, 1.0, 5.0));

        assert!(!rig.track_target(&mut transform, None));
        assert!(rig.target().is_none());
    }

    #[test]
    fn refreshing_target_leaves_pose_alone() {
        let mut camera = RigCamera::default();
        let entity = Entity::from_raw(7);
        let mut rig = OrbitRig::new(settings(2.0, 20.0))
            .with_target(OrbitTarget::entity(entity, Vec3::ZERO));
        let mut transform = Transform::from_xyz(5.0, 0.0, 10.0);

        assert!(rig.refresh_target(Some(Vec3::new(5.0, 0.0, 0.0))));
        assert_eq!(transform, Transform::from_xyz(5.0, 0.0, 10.0));

        rig.activate(&mut transform, &mut camera);
        assert_eq!(rig.zoom_distance(), 10.0);
        assert_close(transform.translation, Vec3::new(5.0, 0.0, 10.0));
    }

    #[test]
    fn switching_zoom_mode_forces_refresh() {
        let mut camera = RigCamera::physical(35.0, 24.0);
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);
        let log = record(&mut rig);

        rig.set_use_distance_zoom(false);
        rig.set_zoom(&mut transform, &mut camera, 35.0);
        assert_eq!(*log.lock().unwrap(), [("fov", 35.0), ("zoom", 35.0)]);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut camera = RigCamera::default();
        let (mut rig, mut transform) = orbiting(settings(2.0, 20.0), 5.0, &mut camera);
        let state = rig.state();
        let before = transform;

        rig.set_pitch_and_heading(&mut transform, f32::NAN, 0.0);
        rig.set_roll(&mut transform, f32::INFINITY);
        rig.set_zoom_distance(&mut transform, &mut camera, f32::NAN);

        assert_eq!(rig.state(), state);
        assert_eq!(transform, before);
    }
}
