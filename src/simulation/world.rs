//! Main simulation world that ties everything together
//!
//! This is the entry point for running the intersection simulation
//! without any Bevy dependencies.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::config::SimConfig;
use super::observer::{Frame, SceneObserver};
use super::pedestrian::{spawn_batch, SimPedestrian};
use super::phase::{PedestrianRequests, Phase, PhaseChange, PhaseController, SignalStates};
use super::types::{
    Direction, PedestrianId, Position, SignalState, SimId, TurnIntent, VehicleClass, VehicleId,
    CROSSWALK_HALF_LENGTH, EXIT_RADIUS, LANE_OFFSET, STOP_LINE_DISTANCE,
};
use super::vehicle::SimVehicle;
use super::vehicle_manager::{draw_spawn, spawn_vehicle, update_vehicles, SpawnDraw};

/// Running totals for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    pub ticks: u64,
    pub vehicles_spawned: u64,
    /// Vehicles that crossed the centre and then left
    pub vehicles_passed: u64,
    pub vehicles_exited_uncrossed: u64,
    pub phase_changes: u64,
    pub pedestrian_walks: u64,
    pub pedestrians_spawned: u64,
    pub pedestrians_finished: u64,
    /// Vehicle-ticks spent waiting at a non-green light
    pub red_hold_ticks: u64,
    /// Vehicle-ticks spent queued behind another vehicle
    pub following_hold_ticks: u64,
    /// Vehicle-ticks spent yielding before a left turn
    pub yield_hold_ticks: u64,
}

/// The main simulation world
pub struct IntersectionSim {
    config: SimConfig,
    clock: Arc<dyn Clock>,
    controller: PhaseController,
    vehicles: Vec<SimVehicle>,
    pedestrians: Vec<SimPedestrian>,
    last_spawn_ms: Option<u64>,
    spawning: bool,
    next_id: usize,
    /// Time sampled at the last tick
    now_ms: u64,
    stats: SimStats,
    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl Default for IntersectionSim {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl IntersectionSim {
    fn new_internal(config: SimConfig, clock: Arc<dyn Clock>, rng: Option<StdRng>) -> Self {
        let now_ms = clock.now_ms();
        Self {
            config: config.sanitized(),
            clock,
            controller: PhaseController::new(now_ms),
            vehicles: Vec::new(),
            pedestrians: Vec::new(),
            last_spawn_ms: None,
            spawning: true,
            next_id: 0,
            now_ms,
            stats: SimStats::default(),
            rng,
        }
    }

    /// Create a simulation on the wall clock
    pub fn new(config: SimConfig) -> Self {
        Self::new_internal(config, Arc::new(SystemClock::new()), None)
    }

    /// Create a simulation on the given clock
    pub fn with_clock(config: SimConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new_internal(config, clock, None)
    }

    /// Create a reproducible simulation on the given clock
    pub fn with_clock_and_seed(config: SimConfig, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::new_internal(config, clock, Some(StdRng::seed_from_u64(seed)))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Change tunables at runtime. The result is clamped before use.
    pub fn update_config(&mut self, update: impl FnOnce(&mut SimConfig)) {
        let mut config = self.config.clone();
        update(&mut config);
        self.config = config.sanitized();
    }

    pub fn set_config(&mut self, config: SimConfig) {
        self.config = config.sanitized();
    }

    /// Turn the automatic spawner on or off
    pub fn set_spawning(&mut self, enabled: bool) {
        self.spawning = enabled;
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn signals(&self) -> SignalStates {
        self.controller.signals()
    }

    pub fn signal_for(&self, direction: Direction) -> SignalState {
        self.controller.signals().get(direction)
    }

    pub fn pedestrian_requests(&self) -> &PedestrianRequests {
        self.controller.requests()
    }

    pub fn is_crossing_requested(&self, direction: Direction) -> bool {
        self.controller.requests().contains(direction)
    }

    pub fn vehicles(&self) -> &[SimVehicle] {
        &self.vehicles
    }

    pub fn pedestrians(&self) -> &[SimPedestrian] {
        &self.pedestrians
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Monotonic count of vehicles that crossed and then left
    pub fn vehicles_passed(&self) -> u64 {
        self.stats.vehicles_passed
    }

    pub fn time_ms(&self) -> u64 {
        self.now_ms
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queue a pedestrian crossing for the next yellow boundary
    pub fn request_crossing(&mut self, direction: Direction, observer: &mut dyn SceneObserver) {
        if self.controller.request_crossing(direction) {
            debug!("Crossing requested: {}", direction);
            observer.on_pedestrian_requests_changed(self.controller.requests());
        }
    }

    /// Place a vehicle on an approach immediately, bypassing the spawner
    pub fn spawn_vehicle(
        &mut self,
        direction: Direction,
        class: VehicleClass,
        intent: TurnIntent,
    ) -> VehicleId {
        let id = VehicleId(self.next_sim_id());
        let draw = SpawnDraw {
            direction,
            class,
            intent,
        };
        self.vehicles.push(spawn_vehicle(id, draw, &self.config));
        self.stats.vehicles_spawned += 1;
        id
    }

    /// Main simulation tick.
    ///
    /// Samples the clock once, then advances phases, spawns, moves vehicles,
    /// moves pedestrians and hands the result to `observer`.
    pub fn tick(&mut self, observer: &mut dyn SceneObserver) {
        // The clock is shared with the outside world; never let it run backwards here
        self.now_ms = self.now_ms.max(self.clock.now_ms());
        self.stats.ticks += 1;

        if let Some(change) = self.controller.advance(self.now_ms, &self.config) {
            self.apply_phase_change(&change, observer);
        }

        self.spawn_if_due();

        let signals = self.controller.signals();
        let report = update_vehicles(&mut self.vehicles, &signals);
        self.stats.red_hold_ticks += report.held_red as u64;
        self.stats.following_hold_ticks += report.held_following as u64;
        self.stats.yield_hold_ticks += report.held_yielding as u64;
        self.stats.vehicles_exited_uncrossed += report.exited_uncrossed.len() as u64;
        for _ in &report.passed {
            self.stats.vehicles_passed += 1;
            observer.on_vehicles_passed(self.stats.vehicles_passed);
        }

        self.update_pedestrians();

        observer.render(&Frame {
            time_ms: self.now_ms,
            phase: self.controller.phase(),
            signals,
            vehicles: &self.vehicles,
            pedestrians: &self.pedestrians,
            vehicles_passed: self.stats.vehicles_passed,
        });
    }

    fn apply_phase_change(&mut self, change: &PhaseChange, observer: &mut dyn SceneObserver) {
        self.stats.phase_changes += 1;
        observer.on_phase_changed(change);

        if change.to == Phase::PedestrianWalk {
            self.stats.pedestrian_walks += 1;
            for direction in &change.walk_directions {
                self.spawn_pedestrians(*direction);
            }
        }
        if change.requests_cleared {
            observer.on_pedestrian_requests_changed(self.controller.requests());
        }
    }

    fn spawn_if_due(&mut self) {
        if !self.spawning {
            return;
        }
        let interval = self.config.spawn_interval_ms();
        if let Some(last) = self.last_spawn_ms {
            if self.now_ms.saturating_sub(last) < interval {
                return;
            }
        }
        self.last_spawn_ms = Some(self.now_ms);

        let draw = match &mut self.rng {
            Some(rng) => draw_spawn(rng, &self.config),
            None => draw_spawn(&mut rand::rng(), &self.config),
        };
        self.spawn_vehicle(draw.direction, draw.class, draw.intent);
    }

    fn spawn_pedestrians(&mut self, direction: Direction) {
        let next_id = &mut self.next_id;
        let mut allocate = || {
            let id = PedestrianId(SimId(*next_id));
            *next_id += 1;
            id
        };
        let batch = match &mut self.rng {
            Some(rng) => spawn_batch(direction, rng, &mut allocate),
            None => spawn_batch(direction, &mut rand::rng(), &mut allocate),
        };
        debug!("{} pedestrians start crossing {}", batch.len(), direction);
        self.stats.pedestrians_spawned += batch.len() as u64;
        self.pedestrians.extend(batch);
    }

    fn update_pedestrians(&mut self) {
        let before = self.pedestrians.len();
        self.pedestrians.retain_mut(|pedestrian| !pedestrian.update());
        self.stats.pedestrians_finished += (before - self.pedestrians.len()) as u64;
    }

    /// Log the end-of-run summary
    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Simulated time: {:.1}s", self.now_ms as f64 / 1000.0);
        info!("Total vehicles spawned: {}", self.stats.vehicles_spawned);
        info!("Total vehicles passed: {}", self.stats.vehicles_passed);
        info!("Active vehicles: {}", self.vehicles.len());
        info!("Active pedestrians: {}", self.pedestrians.len());
        info!("Phase changes: {}", self.stats.phase_changes);
        info!("Pedestrian walks: {}", self.stats.pedestrian_walks);
        info!("Final phase: {}", self.controller.phase());
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Intersection Summary ===");
        println!("Time: {:.2}s", self.now_ms as f64 / 1000.0);
        println!(
            "Phase: {} (since {:.2}s)",
            self.controller.phase(),
            self.controller.phase_started_ms() as f64 / 1000.0
        );
        let lights: Vec<String> = self
            .signals()
            .iter()
            .map(|(direction, state)| format!("{}={:?}", direction, state))
            .collect();
        println!("Signals: {}", lights.join(" "));
        let pending: Vec<&str> = self.pedestrian_requests().iter().map(|d| d.name()).collect();
        println!("Crossing requests: [{}]", pending.join(", "));
        println!(
            "Vehicles: {} active, {} spawned, {} passed",
            self.vehicles.len(),
            self.stats.vehicles_spawned,
            self.stats.vehicles_passed
        );
        println!("Pedestrians: {} crossing", self.pedestrians.len());

        let waiting = self.vehicles.iter().filter(|v| v.last_hold.is_some()).count();
        let turning = self.vehicles.iter().filter(|v| v.turning).count();
        println!("Held this tick: {}, turning: {}", waiting, turning);
        println!(
            "Hold ticks: red={} following={} yielding={}",
            self.stats.red_hold_ticks, self.stats.following_hold_ticks, self.stats.yield_hold_ticks
        );
    }

    /// Draw a plan view of the intersection in the terminal
    pub fn draw_map(&self) {
        // Two world units per character
        const SCALE: f32 = 0.5;
        let half = (EXIT_RADIUS * SCALE).ceil() as i32;
        let size = (half * 2 + 1) as usize;
        let mut grid = vec![vec![' '; size]; size];

        let to_grid = |position: &Position| -> Option<(usize, usize)> {
            let col = (position.x * SCALE).round() as i32 + half;
            let row = (position.z * SCALE).round() as i32 + half;
            if (0..size as i32).contains(&col) && (0..size as i32).contains(&row) {
                Some((row as usize, col as usize))
            } else {
                None
            }
        };

        // Roads
        let road_half_width = (LANE_OFFSET * 2.0 * SCALE).round() as i32;
        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let dx = (col as i32 - half).abs();
                let dz = (row as i32 - half).abs();
                if dx < road_half_width || dz < road_half_width {
                    *cell = '.';
                }
            }
        }

        // Crosswalks
        for direction in Direction::ALL {
            let start = direction.vector().scaled(-CROSSWALK_HALF_LENGTH);
            let end = direction.vector().scaled(CROSSWALK_HALF_LENGTH);
            if self.is_crossing_requested(direction) {
                for step in 0..=8 {
                    if let Some((row, col)) = to_grid(&start.lerp(&end, step as f32 / 8.0)) {
                        grid[row][col] = '=';
                    }
                }
            }
        }

        // Signals at each stop line
        for (direction, state) in self.signals().iter() {
            let head = direction
                .vector()
                .scaled(-STOP_LINE_DISTANCE)
                .offset(&direction.right_vector().scaled(LANE_OFFSET * 2.0));
            if let Some((row, col)) = to_grid(&head) {
                grid[row][col] = match state {
                    SignalState::Red => 'R',
                    SignalState::Yellow => 'Y',
                    SignalState::Green => 'G',
                };
            }
        }

        for pedestrian in &self.pedestrians {
            if let Some((row, col)) = to_grid(&pedestrian.position) {
                grid[row][col] = 'p';
            }
        }

        for vehicle in &self.vehicles {
            if let Some((row, col)) = to_grid(&vehicle.position) {
                grid[row][col] = match vehicle.class {
                    VehicleClass::Car => 'c',
                    VehicleClass::Truck => 't',
                };
            }
        }

        println!("\n=== Intersection Map ===");
        println!("Legend: c=Car, t=Truck, p=Pedestrian, R/Y/G=Signal, ==Requested crosswalk, .=Road");
        println!("North is up");
        println!();
        for row in &grid {
            let line: String = row.iter().collect();
            println!("{}", line);
        }
        println!();
    }
}
