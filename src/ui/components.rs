//! UI components and resources for linking Bevy entities to simulation state

use bevy::prelude::*;
use std::sync::Arc;

use crate::simulation::{
    Direction, Frame, IntersectionSim, ManualClock, PedestrianId, PedestrianRequests, PhaseChange,
    SceneObserver, SimConfig, VehicleId,
};

/// Records what the simulation reported during the last ticks so display
/// systems can react without re-deriving it
#[derive(Debug, Default)]
pub struct UiObserver {
    pub signals_dirty: bool,
    pub requests_dirty: bool,
    pub vehicles_passed: u64,
    pub last_change: Option<PhaseChange>,
}

impl SceneObserver for UiObserver {
    fn on_phase_changed(&mut self, change: &PhaseChange) {
        self.signals_dirty = true;
        self.last_change = Some(change.clone());
    }

    fn on_pedestrian_requests_changed(&mut self, _requests: &PedestrianRequests) {
        self.requests_dirty = true;
    }

    fn on_vehicles_passed(&mut self, total: u64) {
        self.vehicles_passed = total;
    }

    fn render(&mut self, _frame: &Frame<'_>) {}
}

/// Resource wrapper for the simulation, driven by Bevy's clock
#[derive(Resource)]
pub struct IntersectionResource {
    pub sim: IntersectionSim,
    pub clock: Arc<ManualClock>,
    pub observer: UiObserver,
}

impl IntersectionResource {
    pub fn new(config: SimConfig) -> Self {
        let clock = Arc::new(ManualClock::new(0));
        Self {
            sim: IntersectionSim::with_clock(config, clock.clone()),
            clock,
            observer: UiObserver {
                signals_dirty: true,
                requests_dirty: true,
                ..default()
            },
        }
    }
}

/// Marker component for ground plane
#[derive(Component)]
pub struct Ground;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Orbit camera state around the intersection centre
#[derive(Resource)]
pub struct CameraSettings {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub rotation_speed: f32,
    pub zoom_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.55,
            distance: 66.0,
            rotation_speed: 1.0,
            zoom_speed: 30.0,
        }
    }
}

impl CameraSettings {
    pub fn transform(&self) -> Transform {
        let horizontal = self.distance * self.pitch.cos();
        Transform::from_xyz(
            horizontal * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            horizontal * self.yaw.cos(),
        )
        .looking_at(Vec3::ZERO, Vec3::Y)
    }
}

/// Marker for entities synced from simulation
#[derive(Component)]
pub struct SimSynced;

/// Links a Bevy entity to a simulation vehicle
#[derive(Component)]
pub struct VehicleLink(pub VehicleId);

/// Links a Bevy entity to a simulation pedestrian
#[derive(Component)]
pub struct PedestrianLink(pub PedestrianId);

/// The lamp of the signal head facing one approach
#[derive(Component)]
pub struct SignalLamp(pub Direction);

/// Push-button post that lights up while a crossing is requested
#[derive(Component)]
pub struct CrossingButton(pub Direction);

/// Marker for status panel text elements
#[derive(Component)]
pub enum StatusText {
    Phase,
    VehiclesPassed,
    Traffic,
    Requests,
    Tunables,
}
