//! Runner mini-game core
//!
//! The lane runner, its timed power-ups, and the coin wallet that pays for
//! garden decorations. Rendering and the on-disk save format live outside
//! this module.

pub mod garden;
mod runner;
mod timers;
mod wallet;

pub use garden::{Decoration, GARDEN_HALF_EXTENT};
pub use runner::{
    ItemKind, ObstacleKind, Point3, PowerUpKind, RunState, RunSummary, RunnerGame, RunnerItem,
    RunnerTick, BASE_SPEED, GROUND_HEIGHT, ITEM_DESPAWN_Z, ITEM_SPAWN_Z, LANE_SPACING, MAX_SPEED,
    POWER_UP_DURATION_MS,
};
pub use timers::{TimerId, TimerQueue};
pub use wallet::{MemoryStore, PlacedItem, Progress, ProgressStore, Wallet};
