//! Core types for the intersection simulation
//!
//! These are standalone types that don't depend on Bevy.

use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

/// A unique identifier for simulation entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(pub SimId);

/// A wrapper type for pedestrian IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PedestrianId(pub SimId);

/// Compass direction of travel.
///
/// North is -z and East is +x on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// The two roads crossing at the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Direction a vehicle ends up travelling after a left turn
    pub fn left(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }

    /// Unit travel vector on the ground plane
    pub fn vector(self) -> Position {
        match self {
            Direction::North => Position::new(0.0, -1.0),
            Direction::South => Position::new(0.0, 1.0),
            Direction::East => Position::new(1.0, 0.0),
            Direction::West => Position::new(-1.0, 0.0),
        }
    }

    /// Unit vector pointing to the right-hand side of travel
    pub fn right_vector(self) -> Position {
        self.left().opposite().vector()
    }

    /// Y-axis rotation of the travel vector, `atan2(dx, dz)`
    pub fn heading(self) -> f32 {
        match self {
            Direction::North => PI,
            Direction::South => 0.0,
            Direction::East => FRAC_PI_2,
            Direction::West => -FRAC_PI_2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "s" | "south" => Ok(Direction::South),
            "e" | "east" => Ok(Direction::East),
            "w" | "west" => Ok(Direction::West),
            other => anyhow::bail!("unknown direction '{}' (expected north, south, east or west)", other),
        }
    }
}

/// Type of vehicle in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleClass {
    Car,
    Truck,
}

impl VehicleClass {
    /// Length along the direction of travel in world units
    pub fn length(self) -> f32 {
        match self {
            VehicleClass::Car => CAR_LENGTH,
            VehicleClass::Truck => TRUCK_LENGTH,
        }
    }
}

/// What a vehicle intends to do at the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnIntent {
    Straight,
    Left,
}

/// Light shown to one approach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Red,
    Yellow,
    Green,
}

/// A position on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, z: 0.0 };

    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn length(&self) -> f32 {
        self.distance(&Position::ORIGIN)
    }

    pub fn dot(&self, other: &Position) -> f32 {
        self.x * other.x + self.z * other.z
    }

    pub fn scaled(&self, factor: f32) -> Position {
        Position::new(self.x * factor, self.z * factor)
    }

    pub fn offset(&self, other: &Position) -> Position {
        Position::new(self.x + other.x, self.z + other.z)
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Distance from the intersection centre at which vehicles appear
pub const SPAWN_DISTANCE: f32 = 30.0;

/// Vehicles further than this from the centre are removed
pub const EXIT_RADIUS: f32 = 35.0;

/// Distance of the stop line before the intersection centre
pub const STOP_LINE_DISTANCE: f32 = 6.0;

/// Lateral offset of a lane from the road centre line
pub const LANE_OFFSET: f32 = 2.0;

/// Remaining distance to centre at which a left-turner starts arbitration
pub const TURN_ZONE_DISTANCE: f32 = 2.0;

/// Oncoming vehicles closer than this to the centre block a left turn
pub const OPPOSING_PROXIMITY: f32 = 10.0;

/// Share of the class speed used while turning
pub const TURN_SPEED_FACTOR: f32 = 0.8;

/// Share of the turning speed still carried along the approach axis
pub const TURN_FORWARD_FACTOR: f32 = 0.5;

/// Heading change per tick while turning, in radians
pub const TURN_RATE: f32 = 0.02;

pub const CAR_LENGTH: f32 = 1.5;
pub const TRUCK_LENGTH: f32 = 3.0;

/// Free space kept between bumpers of queued vehicles
pub const FOLLOWING_GAP: f32 = 1.0;

/// Half the length of a crosswalk
pub const CROSSWALK_HALF_LENGTH: f32 = 6.0;

/// Lateral spacing between pedestrians of one batch
pub const PEDESTRIAN_SPACING: f32 = 0.5;
