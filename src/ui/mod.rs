//! UI module that visualizes the intersection using Bevy
//!
//! This module is purely for visualization - all simulation logic is in the `simulation` module.
//! The UI reads state from `IntersectionSim` and renders it using Bevy's 3D graphics.

mod components;
mod input;
mod sync;
mod world;

use bevy::prelude::*;

pub use components::{IntersectionResource, UiObserver};

use crate::simulation::{Direction, SimConfig};
use components::CameraSettings;
use input::{handle_camera_movement, handle_crossing_requests, handle_input, handle_tunables};
use sync::{
    sync_pedestrians, sync_vehicles, tick_simulation, update_crossing_buttons,
    update_signal_lamps, update_status_text,
};
use world::{setup_status_panel, setup_world};

/// Plugin to register all UI systems
pub struct CrossroadsUIPlugin {
    pub config: SimConfig,
    /// Crossing requests pressed before the first tick
    pub requests: Vec<Direction>,
}

impl Plugin for CrossroadsUIPlugin {
    fn build(&self, app: &mut App) {
        let mut resource = IntersectionResource::new(self.config.clone());
        for direction in &self.requests {
            resource
                .sim
                .request_crossing(*direction, &mut resource.observer);
        }

        app.insert_resource(resource)
            .init_resource::<CameraSettings>()
            .add_systems(Startup, (setup_world, setup_status_panel))
            .add_systems(FixedUpdate, tick_simulation)
            .add_systems(
                Update,
                (
                    sync_vehicles,
                    sync_pedestrians,
                    update_signal_lamps,
                    update_crossing_buttons,
                    update_status_text,
                    handle_input,
                    handle_crossing_requests,
                    handle_tunables,
                    handle_camera_movement,
                ),
            );
    }
}
