//! Standalone intersection simulation module
//!
//! This module contains all the signal phasing and agent movement logic and
//! runs independently of the Bevy game engine. It can be driven from the
//! console or from tests without booting up the renderer.

mod clock;
mod config;
mod observer;
mod pedestrian;
mod phase;
mod types;
mod vehicle;
mod vehicle_manager;
mod world;

// Re-export public types for external use
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    SimConfig, DEFAULT_CAR_SPEED, DEFAULT_GREEN_DURATION_MS, DEFAULT_PEDESTRIAN_DURATION_MS,
    DEFAULT_SPAWN_RATE, DEFAULT_TRUCK_SPEED, DEFAULT_YELLOW_DURATION_MS, DURATION_RANGE_MS,
    SPAWN_RATE_RANGE, SPEED_RANGE,
};
pub use observer::{Frame, LogObserver, NullObserver, SceneObserver};
pub use pedestrian::{spawn_batch, SimPedestrian, MAX_BATCH, MIN_BATCH, PEDESTRIAN_SPEED_RANGE};
pub use phase::{PedestrianRequests, Phase, PhaseChange, PhaseController, SignalStates};
pub use types::{
    Axis, Direction, PedestrianId, Position, SignalState, SimId, TurnIntent, VehicleClass,
    VehicleId, CAR_LENGTH, CROSSWALK_HALF_LENGTH, EXIT_RADIUS, FOLLOWING_GAP, LANE_OFFSET,
    OPPOSING_PROXIMITY, SPAWN_DISTANCE, STOP_LINE_DISTANCE, TRUCK_LENGTH, TURN_ZONE_DISTANCE,
};
pub use vehicle::{HoldReason, SimVehicle, TrafficView, VehicleUpdate};
pub use vehicle_manager::{draw_spawn, spawn_vehicle, update_vehicles, SpawnDraw, VehicleTickReport};
pub use world::{IntersectionSim, SimStats};
