//! World setup systems for camera, lighting, roads and signal heads

use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

use super::components::{
    CameraSettings, CrossingButton, Ground, MainCamera, SignalLamp, StatusText,
};
use crate::simulation::{Direction, LANE_OFFSET, SPAWN_DISTANCE, STOP_LINE_DISTANCE};

const ROAD_LENGTH: f32 = (SPAWN_DISTANCE + 10.0) * 2.0;
const ROAD_WIDTH: f32 = LANE_OFFSET * 4.0;

/// System to setup the world environment (ground, lighting, camera, roads)
pub fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    camera_settings: Res<CameraSettings>,
) {
    commands.spawn((MainCamera, Camera3d::default(), camera_settings.transform()));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(30.0, 50.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Ground,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(200.0, 200.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
    ));

    let asphalt = materials.add(Color::srgb(0.2, 0.2, 0.2));
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(ROAD_WIDTH, 0.1, ROAD_LENGTH))),
        MeshMaterial3d(asphalt.clone()),
        Transform::from_xyz(0.0, 0.05, 0.0),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(ROAD_LENGTH, 0.1, ROAD_WIDTH))),
        MeshMaterial3d(asphalt),
        Transform::from_xyz(0.0, 0.05, 0.0),
    ));

    let stop_line = materials.add(Color::WHITE);
    for direction in Direction::ALL {
        let approach = to_vec3(direction.vector()) * -STOP_LINE_DISTANCE;
        let right = to_vec3(direction.right_vector());

        // Stop line across the inbound lane
        let line_size = if direction.vector().x == 0.0 {
            Vec3::new(ROAD_WIDTH / 2.0, 0.02, 0.3)
        } else {
            Vec3::new(0.3, 0.02, ROAD_WIDTH / 2.0)
        };
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(line_size))),
            MeshMaterial3d(stop_line.clone()),
            Transform::from_translation(approach + right * LANE_OFFSET + Vec3::Y * 0.11),
        ));

        // Signal head on the kerb after the stop line
        let head_position = approach + right * (LANE_OFFSET * 2.0 + 0.5);
        commands.spawn((
            Mesh3d(meshes.add(Cylinder::new(0.1, 3.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.25, 0.25, 0.25))),
            Transform::from_translation(head_position + Vec3::Y * 1.5),
        ));
        commands.spawn((
            SignalLamp(direction),
            Mesh3d(meshes.add(Sphere::new(0.45))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.2, 0.2, 0.2),
                ..default()
            })),
            Transform::from_translation(head_position + Vec3::Y * 3.3),
        ));

        // Crossing request post before the crosswalk start
        commands.spawn((
            CrossingButton(direction),
            Mesh3d(meshes.add(Cuboid::new(0.4, 1.2, 0.4))),
            MeshMaterial3d(materials.add(Color::srgb(0.4, 0.4, 0.4))),
            Transform::from_translation(approach * 1.3 - right * (LANE_OFFSET * 2.0 + 0.5) + Vec3::Y * 0.6),
        ));
    }
}

/// System to build the status panel in the top-left corner
pub fn setup_status_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Auto,
                height: Val::Auto,
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(5.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ))
        .with_children(|parent| {
            spawn_status_text(parent, StatusText::Phase, "Phase: -", 18.0, Color::srgb(1.0, 1.0, 0.5));
            spawn_status_text(
                parent,
                StatusText::VehiclesPassed,
                "Vehicles passed: 0",
                16.0,
                Color::srgb(0.2, 1.0, 0.2),
            );
            spawn_status_text(parent, StatusText::Traffic, "Vehicles: 0", 14.0, Color::srgb(0.9, 0.9, 0.9));
            spawn_status_text(parent, StatusText::Requests, "Crossing requests: -", 14.0, Color::srgb(1.0, 0.6, 0.2));
            spawn_status_text(parent, StatusText::Tunables, "", 14.0, Color::srgb(0.7, 0.7, 0.9));
        });
}

fn spawn_status_text(
    parent: &mut ChildSpawnerCommands,
    kind: StatusText,
    text: &str,
    font_size: f32,
    color: Color,
) {
    parent.spawn((
        kind,
        Text::new(text),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    ));
}

/// Lift a ground-plane position into Bevy space
pub fn to_vec3(position: crate::simulation::Position) -> Vec3 {
    Vec3::new(position.x, 0.0, position.z)
}
