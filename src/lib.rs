//! Camera rigs for bevy viewports.
//!
//! - [`FlyRig`](crate::rig::fly::FlyRig): a free-flying camera that moves and turns along its
//!   own axes.
//! - [`OrbitRig`](crate::rig::orbit::OrbitRig): a camera orbiting a target, zooming either by
//!   distance or through its lens, with change notifications.
//! - [`ViewportMirror`](crate::extensions::viewport_mirror::ViewportMirror): shows a camera's
//!   live output in a UI image.
//!
//! The rigs never read input devices. Drive them from your own systems by calling their
//! methods with the entity's `Transform` and [`RigCamera`](crate::rig::lens::RigCamera).
//!
//! ```rust,ignore
//! App::new()
//!     .add_plugins((DefaultPlugins, DefaultCameraRigPlugins))
//!     .run();
//! ```

#![warn(missing_docs)]

use bevy_app::{PluginGroup, PluginGroupBuilder};

pub mod extensions;
pub mod rig;

/// Common imports.
pub mod prelude {
    #[cfg(feature = "extension_viewport_mirror")]
    pub use crate::extensions::viewport_mirror::{
        CameraResolver, CameraTag, MainCamera, ViewportMirror, ViewportMirrorPlugin,
    };
    pub use crate::{
        rig::{
            angle::{wrap_angle, AngleLimits},
            fly::{AltitudeSpace, FlyRig},
            lens::{Lens, ProjectionKind, RigCamera},
            orbit::{OrbitRig, OrbitSettings, OrbitState, OrbitTarget},
            zoom::{ZoomChange, ZoomLimits, ZoomListeners},
            CameraRig, RigPlugin, RigSystems,
        },
        DefaultCameraRigPlugins,
    };
}

/// Adds the [`RigPlugin`](crate::rig::RigPlugin) and every extension enabled by cargo
/// features.
pub struct DefaultCameraRigPlugins;

impl PluginGroup for DefaultCameraRigPlugins {
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>().add(rig::RigPlugin);
        #[cfg(feature = "extension_viewport_mirror")]
        let group = group.add(extensions::viewport_mirror::ViewportMirrorPlugin);
        group
    }
}
