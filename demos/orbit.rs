//! Orbit a cube with the keyboard.
//!
//! Arrows orbit, `Q`/`E` roll, `W`/`S` zoom, `Tab` switches between distance and lens zoom.

use bevy::prelude::*;
use bevy_camera_rigs::prelude::*;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultCameraRigPlugins))
        .add_systems(Startup, setup)
        .add_systems(Update, drive_orbit)
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let target = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.2, 0.4, 0.9))),
            Transform::from_xyz(0.0, 0.5, 0.0),
        ))
        .id();

    let mut listeners = ZoomListeners::default();
    listeners.on_zoom_changed(|change| info!("zoom is now {:.2}", change.value()));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 0.5, 8.0),
        RigCamera::physical(35.0, 24.0),
        OrbitRig::new(OrbitSettings {
            zoom_limits: ZoomLimits {
                min_distance: 2.0,
                max_distance: 20.0,
                min_fov: 18.0,
                max_fov: 85.0,
            },
            ..default()
        })
        .with_target(OrbitTarget::entity(target, Vec3::new(0.0, 0.5, 0.0)))
        .with_listeners(listeners),
    ));

    commands.spawn((
        PointLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));
}

fn drive_orbit(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut rigs: Query<(&mut OrbitRig, &mut Transform, &mut RigCamera)>,
) {
    let step = 90.0 * time.delta_secs();
    let axis = |negative, positive| {
        keys.pressed(positive) as i32 as f32 - keys.pressed(negative) as i32 as f32
    };

    for (mut rig, mut transform, mut camera) in &mut rigs {
        // Rigs initialize from their spawn pose in `PostUpdate`.
        if !rig.is_activated() {
            continue;
        }
        let pitch = axis(KeyCode::ArrowDown, KeyCode::ArrowUp);
        let heading = axis(KeyCode::ArrowRight, KeyCode::ArrowLeft);
        if pitch != 0.0 || heading != 0.0 {
            rig.modify_pitch_and_heading(&mut transform, pitch * step, heading * step);
        }

        let roll = axis(KeyCode::KeyE, KeyCode::KeyQ);
        if roll != 0.0 {
            let current = rig.roll();
            rig.set_roll(&mut transform, current + roll * step);
        }

        let zoom = axis(KeyCode::KeyW, KeyCode::KeyS);
        if zoom != 0.0 {
            rig.modify_zoom(&mut transform, &mut camera, zoom * step * 0.1);
        }

        if keys.just_pressed(KeyCode::Tab) {
            let distance = !rig.use_distance_zoom();
            rig.set_use_distance_zoom(distance);
            info!("distance zoom: {distance}");
        }
    }
}
