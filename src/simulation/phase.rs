//! Traffic signal phasing for the intersection
//!
//! Standalone implementation that doesn't depend on Bevy.

use std::collections::BTreeSet;
use std::fmt;

use log::info;

use super::config::SimConfig;
use super::types::{Axis, Direction, SignalState};

/// Named state of the signal cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NorthSouthGreen,
    NorthSouthYellow,
    EastWestGreen,
    EastWestYellow,
    /// All vehicle approaches red while pedestrians cross
    PedestrianWalk,
}

impl Phase {
    /// Light shown to vehicles travelling in `direction` during this phase
    pub fn signal_for(self, direction: Direction) -> SignalState {
        match (self, direction.axis()) {
            (Phase::PedestrianWalk, _) => SignalState::Red,
            (Phase::NorthSouthGreen, Axis::NorthSouth) => SignalState::Green,
            (Phase::NorthSouthYellow, Axis::NorthSouth) => SignalState::Yellow,
            (Phase::EastWestGreen, Axis::EastWest) => SignalState::Green,
            (Phase::EastWestYellow, Axis::EastWest) => SignalState::Yellow,
            _ => SignalState::Red,
        }
    }

    pub fn signals(self) -> SignalStates {
        SignalStates(Direction::ALL.map(|direction| self.signal_for(direction)))
    }

    pub fn is_green(self) -> bool {
        matches!(self, Phase::NorthSouthGreen | Phase::EastWestGreen)
    }

    pub fn is_yellow(self) -> bool {
        matches!(self, Phase::NorthSouthYellow | Phase::EastWestYellow)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NorthSouthGreen => "NS green",
            Phase::NorthSouthYellow => "NS yellow",
            Phase::EastWestGreen => "EW green",
            Phase::EastWestYellow => "EW yellow",
            Phase::PedestrianWalk => "pedestrian walk",
        };
        f.write_str(name)
    }
}

/// Derived light for each direction, indexed by [`Direction::index`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalStates(pub [SignalState; 4]);

impl SignalStates {
    pub fn get(&self, direction: Direction) -> SignalState {
        self.0[direction.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, SignalState)> + '_ {
        Direction::ALL.into_iter().map(|direction| (direction, self.get(direction)))
    }
}

/// Directions with an outstanding crossing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PedestrianRequests {
    directions: BTreeSet<Direction>,
}

impl PedestrianRequests {
    /// Returns true if the direction was not already requested
    pub fn insert(&mut self, direction: Direction) -> bool {
        self.directions.insert(direction)
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.directions.contains(&direction)
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.directions.iter().copied()
    }

    fn clear(&mut self) {
        self.directions.clear();
    }
}

/// Outcome of a phase transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    pub at_ms: u64,
    pub signals: SignalStates,
    /// Directions whose pedestrians cross in the new phase
    pub walk_directions: Vec<Direction>,
    /// Set when a walk ended and the request queue was emptied
    pub requests_cleared: bool,
}

/// The signal state machine.
///
/// Owns the current phase and the pedestrian request queue. Requests are
/// only honoured at a yellow boundary, never by cutting a green short.
#[derive(Debug, Clone)]
pub struct PhaseController {
    phase: Phase,
    phase_started_ms: u64,
    requests: PedestrianRequests,
}

impl PhaseController {
    pub fn new(start_ms: u64) -> Self {
        Self {
            phase: Phase::NorthSouthGreen,
            phase_started_ms: start_ms,
            requests: PedestrianRequests::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_started_ms(&self) -> u64 {
        self.phase_started_ms
    }

    pub fn signals(&self) -> SignalStates {
        self.phase.signals()
    }

    pub fn requests(&self) -> &PedestrianRequests {
        &self.requests
    }

    /// Queue a crossing request. Returns true if the queue changed.
    pub fn request_crossing(&mut self, direction: Direction) -> bool {
        self.requests.insert(direction)
    }

    /// Advance the state machine to `now_ms`.
    ///
    /// At most one transition happens per call; the new phase starts at
    /// `now_ms`.
    pub fn advance(&mut self, now_ms: u64, config: &SimConfig) -> Option<PhaseChange> {
        let elapsed = now_ms.saturating_sub(self.phase_started_ms);

        let next = match self.phase {
            Phase::NorthSouthGreen if elapsed >= config.green_duration_ms => {
                Phase::NorthSouthYellow
            }
            Phase::EastWestGreen if elapsed >= config.green_duration_ms => Phase::EastWestYellow,
            Phase::NorthSouthYellow if elapsed >= config.yellow_duration_ms => {
                self.after_yellow(Phase::EastWestGreen)
            }
            Phase::EastWestYellow if elapsed >= config.yellow_duration_ms => {
                self.after_yellow(Phase::NorthSouthGreen)
            }
            Phase::PedestrianWalk if elapsed >= config.pedestrian_duration_ms => {
                Phase::NorthSouthGreen
            }
            _ => return None,
        };

        let from = self.phase;
        let walk_directions = if next == Phase::PedestrianWalk {
            self.requests.iter().collect()
        } else {
            Vec::new()
        };
        let requests_cleared = from == Phase::PedestrianWalk;
        if requests_cleared {
            self.requests.clear();
        }

        self.phase = next;
        self.phase_started_ms = now_ms;
        info!("Phase {} -> {} at {}ms", from, next, now_ms);

        Some(PhaseChange {
            from,
            to: next,
            at_ms: now_ms,
            signals: next.signals(),
            walk_directions,
            requests_cleared,
        })
    }

    fn after_yellow(&self, other_green: Phase) -> Phase {
        if self.requests.is_empty() {
            other_green
        } else {
            Phase::PedestrianWalk
        }
    }
}
