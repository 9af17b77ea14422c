use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use super::config::ViewerConfig;

/// Point on the ground the chunk streamer follows.
#[derive(Component)]
pub struct Viewer;

#[derive(Component)]
pub struct OrbitCamera;

#[derive(Resource, Clone)]
pub struct OrbitCameraSettings {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub pan_speed: f32,
    pub pan_speed_fast: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub mouse_rotate_sensitivity: f32,
}

impl Default for OrbitCameraSettings {
    fn default() -> Self {
        Self {
            yaw: 0.8,
            pitch: 0.9,
            distance: 250.0,
            min_distance: 20.0,
            max_distance: 1500.0,
            pan_speed: 80.0,
            pan_speed_fast: 400.0,
            rotate_speed: 1.8,
            zoom_speed: 0.12,
            mouse_rotate_sensitivity: 0.005,
        }
    }
}

pub fn setup_viewer(mut commands: Commands, config: Res<ViewerConfig>) {
    let half = config.terrain.chunk_size * 0.5;
    commands.spawn((Viewer, Transform::from_xyz(half, 0.0, half)));
    commands.spawn((OrbitCamera, Camera3d::default(), Transform::default()));
    commands.spawn((
        DirectionalLight {
            illuminance: config.sun_illuminance,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.8, 0.7, 0.0)),
    ));
}

pub fn orbit_camera_input(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut settings: ResMut<OrbitCameraSettings>,
    mut q_focus: Query<&mut Transform, With<Viewer>>,
) {
    let Ok(mut focus) = q_focus.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    if keys.pressed(KeyCode::KeyQ) {
        settings.yaw += settings.rotate_speed * dt;
    }
    if keys.pressed(KeyCode::KeyE) {
        settings.yaw -= settings.rotate_speed * dt;
    }

    let scroll: f32 = mouse_wheel.read().map(|ev| ev.y).sum();
    if scroll.abs() > 0.0 {
        let factor = (1.0 - scroll * settings.zoom_speed).clamp(0.2, 5.0);
        settings.distance =
            (settings.distance * factor).clamp(settings.min_distance, settings.max_distance);
    }

    // Right drag orbits; pitch stays above the horizon.
    let drag: Vec2 = mouse_motion.read().map(|ev| ev.delta).sum();
    if mouse_buttons.pressed(MouseButton::Right) && drag.length_squared() > 0.0 {
        settings.yaw -= drag.x * settings.mouse_rotate_sensitivity;
        settings.pitch = (settings.pitch + drag.y * settings.mouse_rotate_sensitivity).clamp(0.1, 1.5);
    }

    let mut input = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        input.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        input.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        input.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        input.x -= 1.0;
    }
    if input.length_squared() == 0.0 {
        return;
    }

    let yaw_rot = Quat::from_rotation_y(settings.yaw);
    let right = yaw_rot * Vec3::X;
    let forward = yaw_rot * Vec3::Z;
    let speed = if keys.pressed(KeyCode::ShiftLeft) || keys.pressed(KeyCode::ShiftRight) {
        settings.pan_speed_fast
    } else {
        settings.pan_speed
    };

    let delta = (right * input.x + forward * input.y).normalize_or_zero() * speed * dt;
    focus.translation += Vec3::new(delta.x, 0.0, delta.z);
}

pub fn update_orbit_camera(
    settings: Res<OrbitCameraSettings>,
    q_focus: Query<&Transform, (With<Viewer>, Without<OrbitCamera>)>,
    mut q_cam: Query<&mut Transform, (With<OrbitCamera>, Without<Viewer>)>,
) {
    let Ok(focus) = q_focus.single() else {
        return;
    };
    let Ok(mut cam) = q_cam.single_mut() else {
        return;
    };

    let rot = Quat::from_euler(EulerRot::YXZ, settings.yaw, settings.pitch, 0.0);
    cam.translation = focus.translation + rot * Vec3::new(0.0, 0.0, -settings.distance);
    cam.look_at(focus.translation, Vec3::Y);
}
