//! Camera rigs and the plugin that attaches them to the scene.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::{prelude::*, EulerRot};
use bevy_render::camera::{CameraUpdateSystem, Projection};
use bevy_transform::{helper::TransformHelper, prelude::*, TransformSystem};
use bevy_window::RequestRedraw;

pub mod angle;
pub mod fly;
pub mod lens;
pub mod orbit;
pub mod zoom;

use self::{angle::AngleLimits, lens::RigCamera, orbit::OrbitRig};

/// Something that positions and orients a camera: a [`Component`] living next to the
/// camera's [`Transform`] and [`RigCamera`].
///
/// Both rigs share the rule for turning the camera: the requested pitch and heading are
/// wrapped into `[-180, 180)` and then clamped to the rig's limits.
pub trait CameraRig: Component {
    /// Allowed pitch, in degrees.
    fn pitch_limits(&self) -> AngleLimits;

    /// Allowed heading, in degrees.
    fn heading_limits(&self) -> AngleLimits;

    /// Wrap and clamp a requested pitch and heading.
    fn constrain_look(&self, pitch: f32, heading: f32) -> (f32, f32) {
        (
            self.pitch_limits().wrap_and_clamp(pitch),
            self.heading_limits().wrap_and_clamp(heading),
        )
    }
}

/// Rotation for a pitch, heading and roll in degrees: roll about Z first, then pitch about X,
/// then heading about Y.
pub fn look_rotation(pitch: f32, heading: f32, roll: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        heading.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Pitch, heading and roll in degrees of a rotation. Inverse of [`look_rotation`].
pub fn euler_degrees(rotation: Quat) -> (f32, f32, f32) {
    let (heading, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    (pitch.to_degrees(), heading.to_degrees(), roll.to_degrees())
}

/// Rigs ignore non-finite input rather than poisoning their state with NaNs.
pub(crate) fn inputs_are_finite(operation: &str, values: &[f32]) -> bool {
    let finite = values.iter().all(|value| value.is_finite());
    if !finite {
        warn_once!("{operation} ignored non-finite input {values:?}");
    }
    finite
}

/// System set of the rig systems. Runs in [`PostUpdate`], before transform propagation and
/// before cameras compute their projections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SystemSet)]
pub struct RigSystems;

/// Activates orbit rigs, keeps them on their targets and syncs [`RigCamera`]s into bevy's
/// [`Projection`].
pub struct RigPlugin;

impl Plugin for RigPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RequestRedraw>()
            .configure_sets(
                PostUpdate,
                RigSystems
                    .before(TransformSystem::TransformPropagate)
                    .before(CameraUpdateSystem),
            )
            .add_systems(
                PostUpdate,
                (update_orbit_rigs, sync_rig_cameras)
                    .chain()
                    .in_set(RigSystems),
            )
            .register_type::<fly::FlyRig>()
            .register_type::<orbit::OrbitRig>()
            .register_type::<lens::RigCamera>();
    }
}

/// Follow entity targets and activate rigs that have not been activated yet.
pub fn update_orbit_rigs(
    mut params: ParamSet<(
        TransformHelper,
        Query<(Entity, &mut OrbitRig, &mut Transform, &mut RigCamera)>,
    )>,
    mut redraw: EventWriter<RequestRedraw>,
) {
    let followed: Vec<(Entity, Entity)> = params
        .p1()
        .iter()
        .filter_map(|(rig_entity, rig, ..)| Some((rig_entity, rig.target()?.target_entity()?)))
        .collect();

    let resolved: Vec<(Entity, Option<Vec3>)> = {
        let helper = params.p0();
        followed
            .into_iter()
            .map(|(rig_entity, target)| {
                let position = helper
                    .compute_global_transform(target)
                    .ok()
                    .map(|global| global.translation());
                (rig_entity, position)
            })
            .collect()
    };

    let mut rigs = params.p1();
    for (rig_entity, position) in resolved {
        let Ok((_, mut rig, mut transform, _)) = rigs.get_mut(rig_entity) else {
            continue;
        };
        if rig.target().map(|target| target.position()) == position {
            continue;
        }
        if !rig.is_activated() {
            // Activation measures the distance from the spawn pose, so only the target moves.
            rig.refresh_target(position);
        } else if rig.track_target(&mut transform, position) {
            redraw.send(RequestRedraw);
        }
    }

    for (rig_entity, mut rig, mut transform, mut camera) in &mut rigs {
        if rig.is_activated() {
            continue;
        }
        debug!("Activating orbit rig on {rig_entity}");
        rig.activate(&mut transform, &mut camera);
        redraw.send(RequestRedraw);
    }
}

/// Copy changed [`RigCamera`]s into their [`Projection`].
pub fn sync_rig_cameras(mut cameras: Query<(&RigCamera, &mut Projection), Changed<RigCamera>>) {
    for (rig_camera, mut projection) in &mut cameras {
        rig_camera.apply_to(&mut projection);
    }
}
