//! Vehicle spawning and management for the intersection simulation
//!
//! This module contains functions for spawning, updating and despawning
//! vehicles. It separates vehicle management from the main world
//! coordination.

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::config::SimConfig;
use super::phase::SignalStates;
use super::types::{Direction, TurnIntent, VehicleClass, VehicleId};
use super::vehicle::{HoldReason, SimVehicle, TrafficView, VehicleUpdate};

/// The random choices made for one spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnDraw {
    pub direction: Direction,
    pub class: VehicleClass,
    pub intent: TurnIntent,
}

/// Draw direction, class and turn intent for a new vehicle
pub fn draw_spawn<R: Rng + ?Sized>(rng: &mut R, config: &SimConfig) -> SpawnDraw {
    let direction = *Direction::ALL
        .choose(rng)
        .unwrap_or(&Direction::North);
    let class = if rng.random_bool(f64::from(config.truck_probability)) {
        VehicleClass::Truck
    } else {
        VehicleClass::Car
    };
    let intent = if rng.random_bool(f64::from(config.left_turn_probability)) {
        TurnIntent::Left
    } else {
        TurnIntent::Straight
    };
    SpawnDraw {
        direction,
        class,
        intent,
    }
}

/// Spawn a vehicle on the approach for `draw.direction`.
///
/// Its speed is fixed from the current configuration for its class.
pub fn spawn_vehicle(id: VehicleId, draw: SpawnDraw, config: &SimConfig) -> SimVehicle {
    let speed = match draw.class {
        VehicleClass::Car => config.car_speed,
        VehicleClass::Truck => config.truck_speed,
    };
    debug!(
        "Spawning {:?} {:?} heading {} ({:?})",
        draw.class, id.0, draw.direction, draw.intent
    );
    SimVehicle::new(id, draw.direction, draw.class, draw.intent, speed)
}

/// What happened to the vehicle population during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleTickReport {
    /// Vehicles that left after crossing the centre
    pub passed: Vec<VehicleId>,
    /// Vehicles that left without ever crossing
    pub exited_uncrossed: Vec<VehicleId>,
    pub held_red: usize,
    pub held_following: usize,
    pub held_yielding: usize,
}

impl VehicleTickReport {
    fn record_hold(&mut self, reason: HoldReason) {
        match reason {
            HoldReason::RedSignal => self.held_red += 1,
            HoldReason::Following => self.held_following += 1,
            HoldReason::Yielding => self.held_yielding += 1,
        }
    }
}

/// Update all vehicles against the current signals and despawn those that
/// left the area.
///
/// Every vehicle sees the same start-of-tick snapshot, so the result does
/// not depend on iteration order.
pub fn update_vehicles(vehicles: &mut Vec<SimVehicle>, signals: &SignalStates) -> VehicleTickReport {
    let view = TrafficView::capture(vehicles.iter());
    let mut report = VehicleTickReport::default();

    vehicles.retain_mut(|vehicle| {
        match vehicle.update(signals.get(vehicle.direction), &view) {
            VehicleUpdate::Moved => true,
            VehicleUpdate::Held(reason) => {
                report.record_hold(reason);
                true
            }
            VehicleUpdate::Exited { crossed } => {
                debug!("Vehicle {:?} exited (crossed: {})", vehicle.id.0, crossed);
                if crossed {
                    report.passed.push(vehicle.id);
                } else {
                    report.exited_uncrossed.push(vehicle.id);
                }
                false
            }
        }
    });

    report
}
