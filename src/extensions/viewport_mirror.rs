//! A `bevy_camera_rigs` extension that mirrors a camera's live output onto a UI image.
//!
//! Add a [`ViewportMirror`] to an entity with an [`ImageNode`]. The plugin allocates a render
//! target with the node's aspect ratio at the window's height, renders the chosen camera into
//! it, and shows it in the node. The target is rebuilt whenever the node is resized.

use bevy_app::prelude::*;
use bevy_asset::{Assets, Handle};
use bevy_derive::{Deref, DerefMut};
use bevy_ecs::{prelude::*, system::SystemParam};
use bevy_image::Image;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::{
    camera::{Camera, RenderTarget},
    render_resource::{
        Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
    },
};
use bevy_ui::{widget::ImageNode, ComputedNode, UiSystem};
use bevy_window::{PrimaryWindow, Window};

/// Depth buffer precision requested for mirror render targets, in bits.
pub const DEPTH_BUFFER_BITS: u32 = 24;

/// See the [module](self) docs.
pub struct ViewportMirrorPlugin;

impl Plugin for ViewportMirrorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, ViewportMirror::update.after(UiSystem::Layout))
            .register_type::<ViewportMirror>()
            .register_type::<CameraTag>()
            .register_type::<MainCamera>();
    }
}

/// Tags a camera so a [`ViewportMirror`] can find it by name.
#[derive(Debug, Clone, PartialEq, Eq, Component, Reflect, Deref, DerefMut)]
pub struct CameraTag(pub String);

impl CameraTag {
    /// Create a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

/// Marks the scene's main camera, used by a [`ViewportMirror`] when nothing else matches.
#[derive(Debug, Clone, Copy, Default, Component, Reflect)]
pub struct MainCamera;

/// Finds cameras for a [`ViewportMirror`].
pub trait CameraResolver {
    /// The camera carrying `tag`, if any.
    fn camera_with_tag(&self, tag: &str) -> Option<Entity>;

    /// The scene's main camera, if any.
    fn main_camera(&self) -> Option<Entity>;
}

/// Resolves cameras from [`CameraTag`] and [`MainCamera`] components.
#[derive(SystemParam)]
pub struct SceneCameras<'w, 's> {
    tagged: Query<'w, 's, (Entity, &'static CameraTag), With<Camera>>,
    main: Query<'w, 's, Entity, (With<Camera>, With<MainCamera>)>,
}

impl CameraResolver for SceneCameras<'_, '_> {
    fn camera_with_tag(&self, tag: &str) -> Option<Entity> {
        self.tagged
            .iter()
            .find_map(|(entity, camera_tag)| (camera_tag.as_str() == tag).then_some(entity))
    }

    fn main_camera(&self) -> Option<Entity> {
        self.main.iter().next()
    }
}

/// Size and depth of a mirror render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Requested depth buffer precision, in bits.
    pub depth_bits: u32,
}

impl RenderTargetDescriptor {
    /// A target as tall as the display and as wide as the widget's aspect ratio demands.
    ///
    /// Returns `None` if the widget has no usable aspect ratio.
    pub fn for_widget(widget_size: Vec2, display_height: u32) -> Option<Self> {
        let aspect = widget_size.x / widget_size.y;
        if !aspect.is_finite() || aspect <= 0.0 || display_height == 0 {
            return None;
        }
        let width = (display_height as f32 * aspect) as u32;
        Some(Self {
            width: width.max(1),
            height: display_height,
            depth_bits: DEPTH_BUFFER_BITS,
        })
    }

    fn extent(&self) -> Extent3d {
        Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// An image usable as a camera render target and as a UI texture.
    pub fn create_image(&self) -> Image {
        let size = self.extent();
        let mut image = Image {
            texture_descriptor: TextureDescriptor {
                label: Some("viewport_mirror_target"),
                size,
                dimension: TextureDimension::D2,
                format: TextureFormat::Bgra8UnormSrgb,
                mip_level_count: 1,
                sample_count: 1,
                usage: TextureUsages::TEXTURE_BINDING
                    | TextureUsages::COPY_DST
                    | TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            },
            ..Default::default()
        };
        image.resize(size);
        image
    }
}

/// Mirrors a camera onto the [`ImageNode`] of the same entity.
///
/// The camera is `camera` if set, otherwise the camera tagged `camera_tag`, otherwise the
/// [`MainCamera`]. The resolved camera is remembered.
#[derive(Debug, Clone, Default, Component, Reflect)]
pub struct ViewportMirror {
    /// The camera to mirror.
    pub camera: Option<Entity>,
    /// Tag of the camera to mirror, used when `camera` is not set.
    pub camera_tag: Option<String>,
    #[reflect(ignore)]
    target: Option<Handle<Image>>,
    #[reflect(ignore)]
    descriptor: Option<RenderTargetDescriptor>,
}

impl ViewportMirror {
    /// Mirror a specific camera.
    pub fn for_camera(camera: Entity) -> Self {
        Self {
            camera: Some(camera),
            ..Default::default()
        }
    }

    /// Mirror the camera with the given [`CameraTag`].
    pub fn for_tag(tag: impl Into<String>) -> Self {
        Self {
            camera_tag: Some(tag.into()),
            ..Default::default()
        }
    }

    /// The current render target, if one has been allocated.
    pub fn render_target(&self) -> Option<&Handle<Image>> {
        self.target.as_ref()
    }

    /// The size of the current render target.
    pub fn descriptor(&self) -> Option<RenderTargetDescriptor> {
        self.descriptor
    }

    /// Resolve the mirrored camera, caching the result.
    pub fn resolve_camera(&mut self, resolver: &impl CameraResolver) -> Option<Entity> {
        if self.camera.is_none() {
            self.camera = self
                .camera_tag
                .as_deref()
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .and_then(|tag| resolver.camera_with_tag(tag))
                .or_else(|| resolver.main_camera());
        }
        self.camera
    }

    /// Release the current render target, if any.
    pub fn release(&mut self, images: &mut Assets<Image>) {
        if let Some(old) = self.target.take() {
            images.remove(&old);
        }
        self.descriptor = None;
    }

    /// Release the previous render target and allocate one matching the widget's aspect ratio
    /// at `display_height`.
    ///
    /// Returns the new target, or `None` if the widget has no usable size, in which case the
    /// mirror is left without a target.
    pub fn update_render_target(
        &mut self,
        widget_size: Vec2,
        display_height: u32,
        images: &mut Assets<Image>,
    ) -> Option<Handle<Image>> {
        self.release(images);
        let descriptor = RenderTargetDescriptor::for_widget(widget_size, display_height)?;
        let handle = images.add(descriptor.create_image());
        debug!(
            "Allocated {}x{} viewport mirror target",
            descriptor.width, descriptor.height
        );
        self.target = Some(handle.clone());
        self.descriptor = Some(descriptor);
        Some(handle)
    }

    /// Rebuild render targets for new or resized mirrors and bind them to camera and image.
    pub fn update(
        mut mirrors: Query<
            (&mut ViewportMirror, &ComputedNode, &mut ImageNode),
            Or<(Added<ViewportMirror>, Changed<ComputedNode>)>,
        >,
        mut cameras: Query<&mut Camera>,
        scene_cameras: SceneCameras,
        windows: Query<&Window, With<PrimaryWindow>>,
        mut images: ResMut<Assets<Image>>,
    ) {
        let Ok(window) = windows.get_single() else {
            return;
        };
        let display_height = window.resolution.physical_height();

        for (mut mirror, node, mut image_node) in &mut mirrors {
            let Some(camera_entity) = mirror.resolve_camera(&scene_cameras) else {
                warn_once!("ViewportMirror found no camera to mirror");
                continue;
            };
            let Ok(mut camera) = cameras.get_mut(camera_entity) else {
                warn!("ViewportMirror camera {camera_entity} has no Camera component");
                continue;
            };
            let Some(handle) =
                mirror.update_render_target(node.size(), display_height, &mut images)
            else {
                continue;
            };
            camera.target = RenderTarget::Image(handle.clone());
            image_node.image = handle;
        }
    }
}
