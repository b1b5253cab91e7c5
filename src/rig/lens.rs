//! Provides [`RigCamera`], the projection and lens model a rig drives.
//!
//! bevy's [`Projection`] only knows an angular field of view, so the rigs work against this
//! richer description and [`RigCamera::apply_to`] writes the result back into the real
//! projection every frame it changes.

use bevy_ecs::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::camera::{OrthographicProjection, PerspectiveProjection, Projection, ScalingMode};

/// Sensor height of a full-frame camera, in millimetres.
pub const DEFAULT_SENSOR_HEIGHT: f32 = 24.0;

/// How the camera projects the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum ProjectionKind {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection, sized by [`RigCamera::orthographic_size`].
    Orthographic,
}

/// The camera's lens model. Decides which parameter FOV zoom drives.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum Lens {
    /// A physical lens described by focal length and sensor height, both in millimetres.
    Physical {
        /// Distance from lens to sensor.
        focal_length: f32,
        /// Vertical size of the sensor.
        sensor_height: f32,
    },
    /// A plain vertical field of view in degrees.
    Simple {
        /// Vertical field of view.
        field_of_view: f32,
    },
}

impl Default for Lens {
    fn default() -> Self {
        Self::Simple {
            field_of_view: 45.0,
        }
    }
}

impl Lens {
    /// Is this a [`Lens::Physical`] lens?
    pub fn is_physical(&self) -> bool {
        matches!(self, Lens::Physical { .. })
    }

    /// The vertical field of view in degrees, derived from focal length for physical lenses.
    pub fn field_of_view(&self) -> f32 {
        match *self {
            Lens::Physical {
                focal_length,
                sensor_height,
            } => (2.0 * (sensor_height / (2.0 * focal_length)).atan()).to_degrees(),
            Lens::Simple { field_of_view } => field_of_view,
        }
    }

    /// The value FOV zoom drives: focal length for physical lenses, field of view otherwise.
    pub fn zoom_value(&self) -> f32 {
        match *self {
            Lens::Physical { focal_length, .. } => focal_length,
            Lens::Simple { field_of_view } => field_of_view,
        }
    }

    /// Overwrite the value FOV zoom drives.
    pub fn set_zoom_value(&mut self, value: f32) {
        match self {
            Lens::Physical { focal_length, .. } => *focal_length = value,
            Lens::Simple { field_of_view } => *field_of_view = value,
        }
    }
}

/// The camera parameters an [`OrbitRig`](crate::rig::orbit::OrbitRig) reads and writes.
///
/// Add this next to bevy's `Camera` and `Projection`. The
/// [`RigPlugin`](crate::rig::RigPlugin) copies it into the `Projection` whenever it changes.
#[derive(Debug, Clone, PartialEq, Component, Reflect)]
pub struct RigCamera {
    /// Perspective or orthographic.
    pub projection: ProjectionKind,
    /// Lens model used in perspective.
    pub lens: Lens,
    /// Half of the vertical extent of the view in world units, used in orthographic.
    pub orthographic_size: f32,
}

impl Default for RigCamera {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            lens: Lens::default(),
            orthographic_size: 5.0,
        }
    }
}

impl RigCamera {
    /// A perspective camera with a simple lens.
    pub fn simple(field_of_view: f32) -> Self {
        Self {
            lens: Lens::Simple { field_of_view },
            ..Default::default()
        }
    }

    /// A perspective camera with a physical lens.
    pub fn physical(focal_length: f32, sensor_height: f32) -> Self {
        Self {
            lens: Lens::Physical {
                focal_length,
                sensor_height,
            },
            ..Default::default()
        }
    }

    /// Switch this camera to an orthographic projection.
    pub fn with_orthographic(self, orthographic_size: f32) -> Self {
        Self {
            projection: ProjectionKind::Orthographic,
            orthographic_size,
            ..self
        }
    }

    /// Build a camera description matching an existing bevy projection.
    pub fn from_projection(projection: &Projection) -> Self {
        match projection {
            Projection::Perspective(perspective) => Self::simple(perspective.fov.to_degrees()),
            Projection::Orthographic(ortho) => {
                let orthographic_size = match ortho.scaling_mode {
                    ScalingMode::FixedVertical { viewport_height } => {
                        viewport_height * ortho.scale * 0.5
                    }
                    _ => ortho.scale,
                };
                Self::default().with_orthographic(orthographic_size)
            }
        }
    }

    /// Is the projection orthographic?
    pub fn is_orthographic(&self) -> bool {
        self.projection == ProjectionKind::Orthographic
    }

    /// Vertical field of view in degrees.
    pub fn field_of_view(&self) -> f32 {
        self.lens.field_of_view()
    }

    /// Write these parameters into a bevy projection, replacing it if the kind differs.
    pub fn apply_to(&self, projection: &mut Projection) {
        match (self.projection, projection) {
            (ProjectionKind::Perspective, Projection::Perspective(perspective)) => {
                perspective.fov = self.field_of_view().to_radians();
            }
            (ProjectionKind::Orthographic, Projection::Orthographic(ortho)) => {
                ortho.scale = 1.0;
                ortho.scaling_mode = ScalingMode::FixedVertical {
                    viewport_height: self.orthographic_size * 2.0,
                };
            }
            (ProjectionKind::Perspective, projection) => {
                *projection = Projection::Perspective(PerspectiveProjection {
                    fov: self.field_of_view().to_radians(),
                    ..Default::default()
                });
            }
            (ProjectionKind::Orthographic, projection) => {
                *projection = Projection::Orthographic(OrthographicProjection {
                    scaling_mode: ScalingMode::FixedVertical {
                        viewport_height: self.orthographic_size * 2.0,
                    },
                    ..OrthographicProjection::default_3d()
                });
            }
        }
    }
}
