//! Hooks for whatever presents the simulation
//!
//! The simulation pushes state out through [`SceneObserver`] and never reads
//! anything back. A renderer places meshes from a [`Frame`], a terminal
//! front end logs it, tests ignore it.

use log::{debug, info};

use super::pedestrian::SimPedestrian;
use super::phase::{PedestrianRequests, Phase, PhaseChange, SignalStates};
use super::vehicle::SimVehicle;

/// Read-only view of the simulation after a tick
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub time_ms: u64,
    pub phase: Phase,
    pub signals: SignalStates,
    pub vehicles: &'a [SimVehicle],
    pub pedestrians: &'a [SimPedestrian],
    pub vehicles_passed: u64,
}

/// Receives simulation output. Every hook except `render` is optional.
pub trait SceneObserver {
    /// Called on every phase transition with the new derived signals
    fn on_phase_changed(&mut self, _change: &PhaseChange) {}

    /// Called whenever the set of requested crossings changes
    fn on_pedestrian_requests_changed(&mut self, _requests: &PedestrianRequests) {}

    /// Called each time a vehicle that crossed the intersection leaves
    fn on_vehicles_passed(&mut self, _total: u64) {}

    /// Called once at the end of every tick
    fn render(&mut self, frame: &Frame<'_>);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SceneObserver for NullObserver {
    fn render(&mut self, _frame: &Frame<'_>) {}
}

/// Writes simulation events to the log
#[derive(Debug, Default, Clone)]
pub struct LogObserver {
    frames: u64,
}

impl SceneObserver for LogObserver {
    fn on_phase_changed(&mut self, change: &PhaseChange) {
        let lights: Vec<String> = change
            .signals
            .iter()
            .map(|(direction, state)| format!("{}={:?}", direction, state))
            .collect();
        info!("Signals now {} ({})", change.to, lights.join(", "));
        if !change.walk_directions.is_empty() {
            let crossings: Vec<&str> = change.walk_directions.iter().map(|d| d.name()).collect();
            info!("Pedestrians crossing: {}", crossings.join(", "));
        }
    }

    fn on_pedestrian_requests_changed(&mut self, requests: &PedestrianRequests) {
        let pending: Vec<&str> = requests.iter().map(|d| d.name()).collect();
        info!("Pending crossing requests: [{}]", pending.join(", "));
    }

    fn on_vehicles_passed(&mut self, total: u64) {
        debug!("Vehicles passed: {}", total);
    }

    fn render(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        if self.frames % 600 == 0 {
            debug!(
                "t={}ms phase={} vehicles={} pedestrians={}",
                frame.time_ms,
                frame.phase,
                frame.vehicles.len(),
                frame.pedestrians.len()
            );
        }
    }
}
