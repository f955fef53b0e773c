//! Three-lane runner: dodge obstacles, collect coins, pick up power-ups
//!
//! The player stands still at z = 0 while items scroll towards it from
//! z = -30. Power-ups expire through a [`TimerQueue`] drained at the start
//! of each tick.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use super::timers::{TimerId, TimerQueue};

pub const LANE_SPACING: f32 = 2.5;
pub const MIN_LANE: i8 = -1;
pub const MAX_LANE: i8 = 1;

pub const ITEM_SPAWN_Z: f32 = -30.0;
pub const ITEM_DESPAWN_Z: f32 = 5.0;

pub const GROUND_HEIGHT: f32 = 0.5;
pub const JUMP_VELOCITY: f32 = 0.15;
pub const GRAVITY: f32 = 0.01;

pub const BASE_SPEED: f32 = 0.1;
pub const MAX_SPEED: f32 = 0.3;
pub const SPEED_RAMP: f32 = 0.0001;
/// Distance units gained per unit of speed each tick
pub const DISTANCE_PER_SPEED: f32 = 10.0;

pub const OBSTACLE_CHANCE: f64 = 0.02;
pub const COIN_CHANCE: f64 = 0.05;
pub const POWER_UP_CHANCE: f64 = 0.005;

pub const POWER_UP_DURATION_MS: u64 = 5000;
pub const MAGNET_RANGE: f32 = 3.0;
pub const BASE_PULL_RANGE: f32 = 1.0;
pub const PULL_STEP: f32 = 0.2;

const PLAYER_HALF_EXTENTS: Point3 = Point3::new(0.3, 0.3, 0.4);

/// A point or extent in runner space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Crate,
    Cone,
    Barrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Pulls coins in from further away
    Magnet,
    /// Obstacles are smashed instead of ending the run
    Invincible,
    /// Coins are worth two
    DoubleCoins,
    /// Halves the scroll speed
    Slow,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Magnet,
        PowerUpKind::Invincible,
        PowerUpKind::DoubleCoins,
        PowerUpKind::Slow,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Obstacle(ObstacleKind),
    Coin,
    PowerUp(PowerUpKind),
}

impl ItemKind {
    fn half_extents(self) -> Point3 {
        match self {
            ItemKind::Obstacle(ObstacleKind::Crate) => Point3::new(0.4, 0.4, 0.4),
            ItemKind::Obstacle(ObstacleKind::Cone) => Point3::new(0.4, 0.5, 0.4),
            ItemKind::Obstacle(ObstacleKind::Barrier) => Point3::new(1.0, 0.25, 0.15),
            ItemKind::Coin => Point3::new(0.3, 0.3, 0.05),
            ItemKind::PowerUp(_) => Point3::new(0.4, 0.4, 0.4),
        }
    }

    fn spawn_height(self) -> f32 {
        match self {
            ItemKind::Obstacle(_) => 0.5,
            ItemKind::Coin | ItemKind::PowerUp(_) => 1.0,
        }
    }
}

/// Something scrolling down a lane
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerItem {
    pub id: u32,
    pub kind: ItemKind,
    pub position: Point3,
}

impl RunnerItem {
    fn overlaps(&self, center: &Point3, half: &Point3) -> bool {
        let own = self.kind.half_extents();
        (self.position.x - center.x).abs() < own.x + half.x
            && (self.position.y - center.y).abs() < own.y + half.y
            && (self.position.z - center.z).abs() < own.z + half.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Paused,
    Over,
}

/// What a finished run is worth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub distance: u64,
    pub coins: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerTick {
    /// Nothing advanced (not running, or paused)
    Idle,
    Continue,
    GameOver(RunSummary),
}

/// The runner game state
pub struct RunnerGame {
    state: RunState,
    lane: i8,
    height: f32,
    /// Vertical speed while airborne
    jump_velocity: Option<f32>,
    distance: f32,
    speed: f32,
    coins: u64,
    items: Vec<RunnerItem>,
    active: HashMap<PowerUpKind, (TimerId, u64)>,
    timers: TimerQueue<PowerUpKind>,
    next_item_id: u32,
    now_ms: u64,
    /// Optional seeded RNG for reproducible runs
    rng: Option<StdRng>,
}

impl Default for RunnerGame {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerGame {
    fn new_internal(rng: Option<StdRng>) -> Self {
        Self {
            state: RunState::Ready,
            lane: 0,
            height: GROUND_HEIGHT,
            jump_velocity: None,
            distance: 0.0,
            speed: BASE_SPEED,
            coins: 0,
            items: Vec::new(),
            active: HashMap::new(),
            timers: TimerQueue::new(),
            next_item_id: 0,
            now_ms: 0,
            rng,
        }
    }

    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Create a runner with a seeded RNG for reproducible runs
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(Some(StdRng::seed_from_u64(seed)))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn lane(&self) -> i8 {
        self.lane
    }

    pub fn player_position(&self) -> Point3 {
        Point3::new(f32::from(self.lane) * LANE_SPACING, self.height, 0.0)
    }

    pub fn is_airborne(&self) -> bool {
        self.jump_velocity.is_some()
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn items(&self) -> &[RunnerItem] {
        &self.items
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Time left on an active power-up
    pub fn remaining_ms(&self, kind: PowerUpKind) -> Option<u64> {
        self.active
            .get(&kind)
            .map(|(_, expires)| expires.saturating_sub(self.now_ms))
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            distance: self.distance.floor() as u64,
            coins: self.coins,
        }
    }

    /// Start a fresh run at `now_ms`, discarding items and effects
    pub fn start(&mut self, now_ms: u64) {
        self.state = RunState::Running;
        self.lane = 0;
        self.height = GROUND_HEIGHT;
        self.jump_velocity = None;
        self.distance = 0.0;
        self.speed = BASE_SPEED;
        self.coins = 0;
        self.items.clear();
        self.active.clear();
        self.timers.clear();
        self.now_ms = now_ms;
        info!("Run started");
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
        }
    }

    pub fn move_left(&mut self) {
        if self.state == RunState::Running {
            self.lane = (self.lane - 1).max(MIN_LANE);
        }
    }

    pub fn move_right(&mut self) {
        if self.state == RunState::Running {
            self.lane = (self.lane + 1).min(MAX_LANE);
        }
    }

    /// Start a jump; ignored while already airborne
    pub fn jump(&mut self) {
        if self.state == RunState::Running && self.jump_velocity.is_none() {
            self.jump_velocity = Some(JUMP_VELOCITY);
        }
    }

    /// Activate a power-up for [`POWER_UP_DURATION_MS`] from now.
    ///
    /// Picking up one that is already active restarts its countdown.
    pub fn activate(&mut self, kind: PowerUpKind) {
        if let Some((previous, _)) = self.active.remove(&kind) {
            self.timers.cancel(previous);
        }
        let expires = self.now_ms + POWER_UP_DURATION_MS;
        let timer = self.timers.schedule(expires, kind);
        self.active.insert(kind, (timer, expires));
        debug!("Power-up {:?} active until {}ms", kind, expires);
    }

    /// Place an item at the far end of a lane
    pub fn spawn_item(&mut self, kind: ItemKind, lane: i8) -> u32 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        let lane = lane.clamp(MIN_LANE, MAX_LANE);
        self.items.push(RunnerItem {
            id,
            kind,
            position: Point3::new(f32::from(lane) * LANE_SPACING, kind.spawn_height(), ITEM_SPAWN_Z),
        });
        id
    }

    /// Advance one frame at `now_ms`
    pub fn tick(&mut self, now_ms: u64) -> RunnerTick {
        self.now_ms = self.now_ms.max(now_ms);
        for kind in self.timers.drain_due(self.now_ms) {
            self.active.remove(&kind);
            debug!("Power-up {:?} expired", kind);
        }

        if self.state != RunState::Running {
            return RunnerTick::Idle;
        }

        self.speed = (BASE_SPEED + self.distance * SPEED_RAMP).min(MAX_SPEED);
        let current = if self.is_active(PowerUpKind::Slow) {
            self.speed * 0.5
        } else {
            self.speed
        };
        self.distance += current * DISTANCE_PER_SPEED;

        if let Some(velocity) = self.jump_velocity {
            self.height += velocity;
            let velocity = velocity - GRAVITY;
            if self.height <= GROUND_HEIGHT {
                self.height = GROUND_HEIGHT;
                self.jump_velocity = None;
            } else {
                self.jump_velocity = Some(velocity);
            }
        }

        for item in &mut self.items {
            item.position.z += current;
        }
        self.items.retain(|item| item.position.z <= ITEM_DESPAWN_Z);

        self.spawn_random_items();

        match self.resolve_collisions() {
            Some(summary) => RunnerTick::GameOver(summary),
            None => RunnerTick::Continue,
        }
    }

    fn spawn_random_items(&mut self) {
        let mut spawns = Vec::new();
        {
            let mut thread_rng = rand::rng();
            let rng: &mut dyn rand::RngCore = match &mut self.rng {
                Some(rng) => rng,
                None => &mut thread_rng,
            };
            if rng.random_bool(OBSTACLE_CHANCE) {
                let kind = *[ObstacleKind::Crate, ObstacleKind::Cone, ObstacleKind::Barrier]
                    .choose(rng)
                    .unwrap_or(&ObstacleKind::Crate);
                spawns.push((ItemKind::Obstacle(kind), rng.random_range(MIN_LANE..=MAX_LANE)));
            }
            if rng.random_bool(COIN_CHANCE) {
                spawns.push((ItemKind::Coin, rng.random_range(MIN_LANE..=MAX_LANE)));
            }
            if rng.random_bool(POWER_UP_CHANCE) {
                let kind = *PowerUpKind::ALL.choose(rng).unwrap_or(&PowerUpKind::Magnet);
                spawns.push((ItemKind::PowerUp(kind), rng.random_range(MIN_LANE..=MAX_LANE)));
            }
        }
        for (kind, lane) in spawns {
            self.spawn_item(kind, lane);
        }
    }

    fn resolve_collisions(&mut self) -> Option<RunSummary> {
        let player = self.player_position();
        let invincible = self.is_active(PowerUpKind::Invincible);

        let hit_obstacle = self
            .items
            .iter()
            .any(|item| matches!(item.kind, ItemKind::Obstacle(_)) && item.overlaps(&player, &PLAYER_HALF_EXTENTS));
        if hit_obstacle {
            if !invincible {
                self.state = RunState::Over;
                let summary = self.summary();
                info!(
                    "Run over: distance {}, coins {}",
                    summary.distance, summary.coins
                );
                return Some(summary);
            }
            self.items.retain(|item| {
                !(matches!(item.kind, ItemKind::Obstacle(_))
                    && item.overlaps(&player, &PLAYER_HALF_EXTENTS))
            });
        }

        let pull_range = if self.is_active(PowerUpKind::Magnet) {
            MAGNET_RANGE
        } else {
            BASE_PULL_RANGE
        };
        let coin_value = if self.is_active(PowerUpKind::DoubleCoins) {
            2
        } else {
            1
        };

        let mut collected_coins = 0;
        let mut collected_power_ups = Vec::new();
        self.items.retain_mut(|item| match item.kind {
            ItemKind::Coin => {
                let distance = item.position.distance(&player);
                if distance < pull_range && distance > 0.0 {
                    let step = PULL_STEP.min(distance) / distance;
                    item.position.x += (player.x - item.position.x) * step;
                    item.position.y += (player.y - item.position.y) * step;
                    item.position.z += (player.z - item.position.z) * step;
                }
                if item.overlaps(&player, &PLAYER_HALF_EXTENTS) {
                    collected_coins += coin_value;
                    false
                } else {
                    true
                }
            }
            ItemKind::PowerUp(kind) => {
                if item.overlaps(&player, &PLAYER_HALF_EXTENTS) {
                    collected_power_ups.push(kind);
                    false
                } else {
                    true
                }
            }
            ItemKind::Obstacle(_) => true,
        });

        self.coins += collected_coins;
        for kind in collected_power_ups {
            self.activate(kind);
        }
        None
    }
}
