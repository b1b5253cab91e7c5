//! Provides [`ZoomLimits`] settings and the [`ZoomListeners`] change notifications.

use std::sync::Arc;

use bevy_reflect::prelude::*;

use super::angle::clamp_between;

/// Bound zooming, for both the distance and the field of view representation.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ZoomLimits {
    /// Closest the camera may get to its target, in world units.
    pub min_distance: f32,
    /// Farthest the camera may get from its target, in world units.
    pub max_distance: f32,
    /// Lower field of view bound: degrees for simple lenses, focal length in millimetres for
    /// physical lenses.
    pub min_fov: f32,
    /// Upper field of view bound, in the same unit as `min_fov`.
    pub max_fov: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 100.0,
            min_fov: 10.0,
            max_fov: 90.0,
        }
    }
}

impl ZoomLimits {
    /// Clamp a distance into `[min_distance, max_distance]`.
    pub fn clamp_distance(&self, distance: f32) -> f32 {
        clamp_between(distance, self.min_distance, self.max_distance)
    }
}

/// Where `value` sits between `min` and `max`, as a fraction.
///
/// Returns `0.0` when the bounds are degenerate.
pub fn percent(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span == 0.0 {
        0.0
    } else {
        (value - min) / span
    }
}

/// The value a fraction of the way from `min` to `max`. Inverse of [`percent`].
pub fn remap_percent(percent: f32, min: f32, max: f32) -> f32 {
    min + (max - min) * percent
}

/// A change to one of the two zoom representations of an
/// [`OrbitRig`](crate::rig::orbit::OrbitRig), with the new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomChange {
    /// The camera-to-target distance changed.
    Distance(f32),
    /// The field of view (or focal length) changed.
    Fov(f32),
}

impl ZoomChange {
    /// The new zoom value.
    pub fn value(&self) -> f32 {
        match *self {
            ZoomChange::Distance(value) | ZoomChange::Fov(value) => value,
        }
    }
}

/// A zoom change callback.
pub type ZoomListener = Arc<dyn Fn(ZoomChange) + Send + Sync>;

/// Callbacks invoked synchronously whenever an orbit rig's zoom changes.
///
/// Every change is delivered twice: first on the channel specific to the representation
/// that changed, then on the generic `zoom` channel.
#[derive(Clone, Default)]
pub struct ZoomListeners {
    distance: Vec<ZoomListener>,
    fov: Vec<ZoomListener>,
    zoom: Vec<ZoomListener>,
}

impl ZoomListeners {
    /// Listen for zoom distance changes.
    pub fn on_zoom_distance_changed<F>(&mut self, f: F)
    where
        F: Fn(ZoomChange) + Send + Sync + 'static,
    {
        self.distance.push(Arc::new(f));
    }

    /// Listen for field of view changes.
    pub fn on_zoom_fov_changed<F>(&mut self, f: F)
    where
        F: Fn(ZoomChange) + Send + Sync + 'static,
    {
        self.fov.push(Arc::new(f));
    }

    /// Listen for any zoom change.
    pub fn on_zoom_changed<F>(&mut self, f: F)
    where
        F: Fn(ZoomChange) + Send + Sync + 'static,
    {
        self.zoom.push(Arc::new(f));
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.distance.clear();
        self.fov.clear();
        self.zoom.clear();
    }

    /// Are there no listeners at all?
    pub fn is_empty(&self) -> bool {
        self.distance.is_empty() && self.fov.is_empty() && self.zoom.is_empty()
    }

    pub(crate) fn dispatch(&self, change: ZoomChange) {
        let specific = match change {
            ZoomChange::Distance(_) => &self.distance,
            ZoomChange::Fov(_) => &self.fov,
        };
        for listener in specific.iter().chain(self.zoom.iter()) {
            listener(change);
        }
    }
}

impl std::fmt::Debug for ZoomListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoomListeners")
            .field("distance", &self.distance.len())
            .field("fov", &self.fov.len())
            .field("zoom", &self.zoom.len())
            .finish()
    }
}
