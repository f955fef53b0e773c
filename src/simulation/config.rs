//! Runtime tunables for the intersection simulation
//!
//! The simulation re-reads these every tick, so an external UI can change
//! them while it runs. Values are clamped on the way in; the tick loop
//! never sees a zero duration or a negative speed.

use log::warn;

pub const DEFAULT_SPAWN_RATE: f32 = 2.0;
pub const DEFAULT_GREEN_DURATION_MS: u64 = 5000;
pub const DEFAULT_YELLOW_DURATION_MS: u64 = 2000;
pub const DEFAULT_PEDESTRIAN_DURATION_MS: u64 = 8000;
pub const DEFAULT_CAR_SPEED: f32 = 0.05;
pub const DEFAULT_TRUCK_SPEED: f32 = 0.03;
pub const DEFAULT_LEFT_TURN_PROBABILITY: f32 = 0.2;
pub const DEFAULT_TRUCK_PROBABILITY: f32 = 0.3;

pub const SPAWN_RATE_RANGE: (f32, f32) = (0.1, 20.0);
pub const DURATION_RANGE_MS: (u64, u64) = (100, 600_000);
pub const SPEED_RANGE: (f32, f32) = (0.001, 1.0);

/// Tunables read by the simulation each tick
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Vehicles per second
    pub spawn_rate: f32,
    pub green_duration_ms: u64,
    pub yellow_duration_ms: u64,
    pub pedestrian_duration_ms: u64,
    /// World units per tick
    pub car_speed: f32,
    /// World units per tick
    pub truck_speed: f32,
    pub left_turn_probability: f32,
    pub truck_probability: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn_rate: DEFAULT_SPAWN_RATE,
            green_duration_ms: DEFAULT_GREEN_DURATION_MS,
            yellow_duration_ms: DEFAULT_YELLOW_DURATION_MS,
            pedestrian_duration_ms: DEFAULT_PEDESTRIAN_DURATION_MS,
            car_speed: DEFAULT_CAR_SPEED,
            truck_speed: DEFAULT_TRUCK_SPEED,
            left_turn_probability: DEFAULT_LEFT_TURN_PROBABILITY,
            truck_probability: DEFAULT_TRUCK_PROBABILITY,
        }
    }
}

impl SimConfig {
    /// Minimum time between two spawns, derived from the spawn rate
    pub fn spawn_interval_ms(&self) -> u64 {
        (1000.0 / self.spawn_rate).round() as u64
    }

    /// Return a copy with every field forced into its sane range
    pub fn sanitized(&self) -> SimConfig {
        SimConfig {
            spawn_rate: clamp_f32(
                "spawn_rate",
                self.spawn_rate,
                SPAWN_RATE_RANGE,
                DEFAULT_SPAWN_RATE,
            ),
            green_duration_ms: clamp_ms("green_duration_ms", self.green_duration_ms),
            yellow_duration_ms: clamp_ms("yellow_duration_ms", self.yellow_duration_ms),
            pedestrian_duration_ms: clamp_ms(
                "pedestrian_duration_ms",
                self.pedestrian_duration_ms,
            ),
            car_speed: clamp_f32("car_speed", self.car_speed, SPEED_RANGE, DEFAULT_CAR_SPEED),
            truck_speed: clamp_f32(
                "truck_speed",
                self.truck_speed,
                SPEED_RANGE,
                DEFAULT_TRUCK_SPEED,
            ),
            left_turn_probability: clamp_f32(
                "left_turn_probability",
                self.left_turn_probability,
                (0.0, 1.0),
                DEFAULT_LEFT_TURN_PROBABILITY,
            ),
            truck_probability: clamp_f32(
                "truck_probability",
                self.truck_probability,
                (0.0, 1.0),
                DEFAULT_TRUCK_PROBABILITY,
            ),
        }
    }

    /// Reject values that cannot be clamped meaningfully.
    ///
    /// Used at the CLI boundary, where a typo should fail loudly instead of
    /// silently falling back to a default.
    pub fn validate(&self) -> anyhow::Result<()> {
        let fields = [
            ("spawn rate", self.spawn_rate),
            ("car speed", self.car_speed),
            ("truck speed", self.truck_speed),
            ("left-turn probability", self.left_turn_probability),
            ("truck probability", self.truck_probability),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                anyhow::bail!("{} must be a finite number, got {}", name, value);
            }
        }
        Ok(())
    }
}

fn clamp_f32(name: &str, value: f32, (min, max): (f32, f32), default: f32) -> f32 {
    if value.is_nan() {
        warn!("{} is NaN, using default {}", name, default);
        return default;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{} = {} out of range, clamped to {}", name, value, clamped);
    }
    clamped
}

fn clamp_ms(name: &str, value: u64) -> u64 {
    let (min, max) = DURATION_RANGE_MS;
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{} = {}ms out of range, clamped to {}ms", name, value, clamped);
    }
    clamped
}
