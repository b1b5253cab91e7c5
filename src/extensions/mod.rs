//! Optional extensions to the camera rigs.

#[cfg(feature = "extension_viewport_mirror")]
pub mod viewport_mirror;
