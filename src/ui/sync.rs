//! Systems for syncing Bevy entities with simulation state

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use super::components::{
    CrossingButton, IntersectionResource, PedestrianLink, SignalLamp, SimSynced, StatusText,
    VehicleLink,
};
use crate::simulation::{
    PedestrianId, SignalState, SimPedestrian, SimVehicle, VehicleClass, VehicleId,
};

/// System to run simulation tick
///
/// Bevy's fixed clock drives the simulation clock, so phase timing follows
/// game time rather than wall time.
pub fn tick_simulation(time: Res<Time>, mut resource: ResMut<IntersectionResource>) {
    let resource = &mut *resource;
    resource.clock.set(time.elapsed().as_millis() as u64);
    resource.sim.tick(&mut resource.observer);
}

/// System to sync vehicle visuals from simulation state
pub fn sync_vehicles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    resource: Res<IntersectionResource>,
    mut vehicle_query: Query<(Entity, &VehicleLink, &mut Transform)>,
) {
    let vehicles: HashMap<VehicleId, &SimVehicle> = resource
        .sim
        .vehicles()
        .iter()
        .map(|vehicle| (vehicle.id, vehicle))
        .collect();
    let mut existing: HashSet<VehicleId> = HashSet::new();

    for (entity, link, mut transform) in vehicle_query.iter_mut() {
        if let Some(vehicle) = vehicles.get(&link.0) {
            existing.insert(link.0);
            *transform = vehicle_transform(vehicle);
        } else {
            commands.entity(entity).despawn();
        }
    }

    for (id, vehicle) in &vehicles {
        if existing.contains(id) {
            continue;
        }
        let (width, height, color) = match vehicle.class {
            VehicleClass::Car => (1.0, 0.8, Color::hsl((id.0 .0 * 47 % 360) as f32, 0.7, 0.5)),
            VehicleClass::Truck => (1.2, 1.4, Color::srgb(0.55, 0.27, 0.07)),
        };
        commands.spawn((
            SimSynced,
            VehicleLink(*id),
            Mesh3d(meshes.add(Cuboid::new(width, height, vehicle.length()))),
            MeshMaterial3d(materials.add(color)),
            vehicle_transform(vehicle),
        ));
    }
}

fn vehicle_transform(vehicle: &SimVehicle) -> Transform {
    let height = match vehicle.class {
        VehicleClass::Car => 0.5,
        VehicleClass::Truck => 0.8,
    };
    Transform::from_xyz(vehicle.position.x, height, vehicle.position.z)
        .with_rotation(Quat::from_rotation_y(vehicle.heading))
}

/// System to sync pedestrian visuals from simulation state
pub fn sync_pedestrians(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    resource: Res<IntersectionResource>,
    mut pedestrian_query: Query<(Entity, &PedestrianLink, &mut Transform)>,
) {
    let pedestrians: HashMap<PedestrianId, &SimPedestrian> = resource
        .sim
        .pedestrians()
        .iter()
        .map(|pedestrian| (pedestrian.id, pedestrian))
        .collect();
    let mut existing: HashSet<PedestrianId> = HashSet::new();

    for (entity, link, mut transform) in pedestrian_query.iter_mut() {
        if let Some(pedestrian) = pedestrians.get(&link.0) {
            existing.insert(link.0);
            transform.translation = Vec3::new(pedestrian.position.x, 0.6, pedestrian.position.z);
        } else {
            commands.entity(entity).despawn();
        }
    }

    for (id, pedestrian) in &pedestrians {
        if existing.contains(id) {
            continue;
        }
        commands.spawn((
            SimSynced,
            PedestrianLink(*id),
            Mesh3d(meshes.add(Capsule3d::new(0.2, 0.8))),
            MeshMaterial3d(materials.add(Color::srgb(0.2, 0.4, 1.0))),
            Transform::from_xyz(pedestrian.position.x, 0.6, pedestrian.position.z),
        ));
    }
}

/// System to recolour signal lamps after a phase change
pub fn update_signal_lamps(
    mut resource: ResMut<IntersectionResource>,
    lamp_query: Query<(&SignalLamp, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !resource.observer.signals_dirty {
        return;
    }
    resource.observer.signals_dirty = false;

    let signals = resource.sim.signals();
    for (lamp, material_handle) in lamp_query.iter() {
        if let Some(material) = materials.get_mut(&material_handle.0) {
            let color = match signals.get(lamp.0) {
                SignalState::Red => Color::srgb(1.0, 0.0, 0.0),
                SignalState::Yellow => Color::srgb(1.0, 0.8, 0.0),
                SignalState::Green => Color::srgb(0.0, 1.0, 0.0),
            };
            material.base_color = color;
            material.emissive = color.to_linear();
        }
    }
}

/// System to light the crossing buttons that have a pending request
pub fn update_crossing_buttons(
    mut resource: ResMut<IntersectionResource>,
    button_query: Query<(&CrossingButton, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !resource.observer.requests_dirty {
        return;
    }
    resource.observer.requests_dirty = false;

    for (button, material_handle) in button_query.iter() {
        if let Some(material) = materials.get_mut(&material_handle.0) {
            material.base_color = if resource.sim.is_crossing_requested(button.0) {
                Color::srgb(1.0, 0.6, 0.0)
            } else {
                Color::srgb(0.4, 0.4, 0.4)
            };
        }
    }
}

/// System to refresh the status panel
pub fn update_status_text(
    resource: Res<IntersectionResource>,
    mut text_query: Query<(&StatusText, &mut Text)>,
) {
    let sim = &resource.sim;

    for (kind, mut text) in text_query.iter_mut() {
        match kind {
            StatusText::Phase => {
                let since = sim.time_ms().saturating_sub(
                    resource
                        .observer
                        .last_change
                        .as_ref()
                        .map_or(0, |change| change.at_ms),
                );
                **text = format!("Phase: {} ({:.1}s)", sim.phase(), since as f64 / 1000.0);
            }
            StatusText::VehiclesPassed => {
                **text = format!("Vehicles passed: {}", resource.observer.vehicles_passed);
            }
            StatusText::Traffic => {
                **text = format!(
                    "Vehicles: {}  Pedestrians: {}",
                    sim.vehicles().len(),
                    sim.pedestrians().len()
                );
            }
            StatusText::Requests => {
                let requests = sim.pedestrian_requests();
                **text = if requests.is_empty() {
                    "Crossing requests: -".to_string()
                } else {
                    let names: Vec<&str> = requests.iter().map(|d| d.name()).collect();
                    format!("Crossing requests: {}", names.join(", "))
                };
            }
            StatusText::Tunables => {
                let config = sim.config();
                **text = format!(
                    "Spawn {:.1}/s  Green {}ms  Yellow {}ms  Walk {}ms",
                    config.spawn_rate,
                    config.green_duration_ms,
                    config.yellow_duration_ms,
                    config.pedestrian_duration_ms
                );
            }
        }
    }
}
