//! Input handling systems

use bevy::prelude::*;
use log::info;

use super::components::{CameraSettings, IntersectionResource, MainCamera};
use crate::simulation::Direction;

const SPAWN_RATE_STEP: f32 = 0.5;
const GREEN_STEP_MS: u64 = 1000;
const MIN_CAMERA_DISTANCE: f32 = 15.0;
const MAX_CAMERA_DISTANCE: f32 = 150.0;

/// Handle basic keyboard input
pub fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut exit: MessageWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

/// N/S/E/W press the crossing button for that direction
pub fn handle_crossing_requests(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut resource: ResMut<IntersectionResource>,
) {
    let bindings = [
        (KeyCode::KeyN, Direction::North),
        (KeyCode::KeyS, Direction::South),
        (KeyCode::KeyE, Direction::East),
        (KeyCode::KeyW, Direction::West),
    ];
    let resource = &mut *resource;
    for (key, direction) in bindings {
        if keyboard.just_pressed(key) {
            resource.sim.request_crossing(direction, &mut resource.observer);
        }
    }
}

/// Adjust spawn rate and green duration while the simulation runs
pub fn handle_tunables(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut resource: ResMut<IntersectionResource>,
) {
    let faster = keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]);
    let slower = keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]);
    let longer = keyboard.just_pressed(KeyCode::BracketRight);
    let shorter = keyboard.just_pressed(KeyCode::BracketLeft);
    if !(faster || slower || longer || shorter) {
        return;
    }

    resource.sim.update_config(|config| {
        if faster {
            config.spawn_rate += SPAWN_RATE_STEP;
        }
        if slower {
            config.spawn_rate -= SPAWN_RATE_STEP;
        }
        if longer {
            config.green_duration_ms += GREEN_STEP_MS;
        }
        if shorter {
            config.green_duration_ms = config.green_duration_ms.saturating_sub(GREEN_STEP_MS);
        }
    });

    let config = resource.sim.config();
    info!(
        "Spawn rate {:.1}/s, green {}ms",
        config.spawn_rate, config.green_duration_ms
    );
}

/// Orbit and zoom the camera with the arrow keys
pub fn handle_camera_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut settings: ResMut<CameraSettings>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
) {
    let dt = time.delta_secs();
    let mut changed = false;

    if keyboard.pressed(KeyCode::ArrowLeft) {
        settings.yaw -= settings.rotation_speed * dt;
        changed = true;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        settings.yaw += settings.rotation_speed * dt;
        changed = true;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        settings.distance -= settings.zoom_speed * dt;
        changed = true;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        settings.distance += settings.zoom_speed * dt;
        changed = true;
    }
    if !changed {
        return;
    }

    settings.distance = settings
        .distance
        .clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE);
    for mut transform in camera.iter_mut() {
        *transform = settings.transform();
    }
}
