//! Vehicle movement logic for the intersection simulation
//!
//! Standalone implementation that doesn't depend on Bevy.

use log::trace;
use ordered_float::OrderedFloat;
use std::f32::consts::FRAC_PI_2;

use super::types::{
    Axis, Direction, Position, SignalState, TurnIntent, VehicleClass, VehicleId, EXIT_RADIUS,
    FOLLOWING_GAP, LANE_OFFSET, OPPOSING_PROXIMITY, SPAWN_DISTANCE, STOP_LINE_DISTANCE,
    TURN_FORWARD_FACTOR, TURN_RATE, TURN_SPEED_FACTOR, TURN_ZONE_DISTANCE,
};

/// Why a vehicle did not move this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldReason {
    /// At or past the stop line facing a non-green light
    RedSignal,
    /// Too close to the vehicle ahead in the same lane
    Following,
    /// Waiting to turn left across oncoming traffic
    Yielding,
}

/// Result of a vehicle update indicating what action should be taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleUpdate {
    Moved,
    Held(HoldReason),
    /// Left the simulated area and should be despawned
    Exited { crossed: bool },
}

/// A vehicle approaching, crossing or leaving the intersection
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    /// Approach direction of travel, kept after a left turn
    pub direction: Direction,
    pub class: VehicleClass,
    pub intent: TurnIntent,
    /// World units per tick
    pub speed: f32,
    pub position: Position,
    /// Y-axis rotation, `atan2(dx, dz)` of the travel vector
    pub heading: f32,
    /// Passed the intersection centre; never stops at the light again
    pub crossed: bool,
    /// Reached the turn zone with a left turn pending
    pub waiting_for_turn: bool,
    /// Cleared arbitration and is executing the turn
    pub turning: bool,
    /// Radians of heading change applied so far
    turned: f32,
    pub last_hold: Option<HoldReason>,
}

impl SimVehicle {
    pub fn new(
        id: VehicleId,
        direction: Direction,
        class: VehicleClass,
        intent: TurnIntent,
        speed: f32,
    ) -> Self {
        let position = direction
            .vector()
            .scaled(-SPAWN_DISTANCE)
            .offset(&direction.right_vector().scaled(LANE_OFFSET));

        Self {
            id,
            direction,
            class,
            intent,
            speed,
            position,
            heading: direction.heading(),
            crossed: false,
            waiting_for_turn: false,
            turning: false,
            turned: 0.0,
            last_hold: None,
        }
    }

    /// Signed distance left to the intersection centre along the approach.
    /// Negative once the centre has been passed.
    pub fn remaining_to_center(&self) -> f32 {
        -self.position.dot(&self.direction.vector())
    }

    pub fn length(&self) -> f32 {
        self.class.length()
    }

    pub fn distance_from_center(&self) -> f32 {
        self.position.length()
    }

    /// Update vehicle movement for one tick.
    ///
    /// `signal` is the derived light for this vehicle's direction and `view`
    /// is the start-of-tick snapshot of every live vehicle.
    pub fn update(&mut self, signal: SignalState, view: &TrafficView) -> VehicleUpdate {
        let outcome = self.step(signal, view);
        self.last_hold = match outcome {
            VehicleUpdate::Held(reason) => Some(reason),
            _ => None,
        };

        if self.distance_from_center() > EXIT_RADIUS {
            return VehicleUpdate::Exited {
                crossed: self.crossed,
            };
        }
        outcome
    }

    fn step(&mut self, signal: SignalState, view: &TrafficView) -> VehicleUpdate {
        let remaining = self.remaining_to_center();
        if !self.crossed && remaining < 0.0 {
            self.crossed = true;
        }

        if self.turning {
            self.advance_turn();
            return VehicleUpdate::Moved;
        }

        let mut allowed = self.speed;

        if !self.crossed && signal != SignalState::Green {
            let to_line = remaining - STOP_LINE_DISTANCE;
            if to_line <= 0.0 {
                return VehicleUpdate::Held(HoldReason::RedSignal);
            }
            allowed = allowed.min(to_line);
        }

        if let Some(gap) = view.gap_to_vehicle_ahead(self) {
            if gap <= 0.0 {
                return VehicleUpdate::Held(HoldReason::Following);
            }
            allowed = allowed.min(gap);
        }

        if self.intent == TurnIntent::Left
            && !self.crossed
            && (self.waiting_for_turn || remaining < TURN_ZONE_DISTANCE)
        {
            self.waiting_for_turn = true;
            if view.has_oncoming_traffic(self) {
                trace!("Vehicle {:?} yielding to oncoming traffic", self.id.0);
                return VehicleUpdate::Held(HoldReason::Yielding);
            }
            self.turning = true;
            self.advance_turn();
            return VehicleUpdate::Moved;
        }

        self.position = self
            .position
            .offset(&self.direction.vector().scaled(allowed));
        VehicleUpdate::Moved
    }

    /// Blend a reduced forward step with a lateral step to the left and
    /// rotate the heading, up to a quarter turn
    fn advance_turn(&mut self) {
        let turn_speed = self.speed * TURN_SPEED_FACTOR;
        let forward = self
            .direction
            .vector()
            .scaled(turn_speed * TURN_FORWARD_FACTOR);
        let lateral = self.direction.left().vector().scaled(turn_speed);
        self.position = self.position.offset(&forward).offset(&lateral);

        if self.turned < FRAC_PI_2 {
            self.turned = (self.turned + TURN_RATE).min(FRAC_PI_2);
            self.heading = self.direction.heading() + self.turned;
        }
    }
}

/// What other vehicles need to know about a vehicle during one tick
#[derive(Debug, Clone, Copy)]
pub struct VehicleProbe {
    pub id: VehicleId,
    pub intent: TurnIntent,
    pub position: Position,
    pub remaining: f32,
    pub length: f32,
    pub waiting_for_turn: bool,
    pub turning: bool,
}

impl VehicleProbe {
    fn of(vehicle: &SimVehicle) -> Self {
        Self {
            id: vehicle.id,
            intent: vehicle.intent,
            position: vehicle.position,
            remaining: vehicle.remaining_to_center(),
            length: vehicle.length(),
            waiting_for_turn: vehicle.waiting_for_turn,
            turning: vehicle.turning,
        }
    }
}

/// Start-of-tick snapshot of live vehicles, bucketed by approach so that
/// lane and oncoming queries only scan one direction
#[derive(Debug, Clone, Default)]
pub struct TrafficView {
    by_direction: [Vec<VehicleProbe>; 4],
}

impl TrafficView {
    pub fn capture<'a>(vehicles: impl IntoIterator<Item = &'a SimVehicle>) -> Self {
        let mut view = TrafficView::default();
        for vehicle in vehicles {
            view.by_direction[vehicle.direction.index()].push(VehicleProbe::of(vehicle));
        }
        view
    }

    pub fn approaching(&self, direction: Direction) -> &[VehicleProbe] {
        &self.by_direction[direction.index()]
    }

    /// Free distance to the nearest vehicle ahead in the same lane, after
    /// keeping the following gap. `None` if the lane ahead is empty.
    pub fn gap_to_vehicle_ahead(&self, vehicle: &SimVehicle) -> Option<f32> {
        let remaining = vehicle.remaining_to_center();
        let ahead = self
            .approaching(vehicle.direction)
            .iter()
            .filter(|other| other.id != vehicle.id && !other.turning)
            .filter(|other| {
                other.remaining < remaining
                    || (other.remaining == remaining && other.id < vehicle.id)
            })
            .max_by_key(|other| OrderedFloat(other.remaining))?;

        let spacing = (vehicle.length() + ahead.length) / 2.0 + FOLLOWING_GAP;
        Some(remaining - ahead.remaining - spacing)
    }

    /// Oncoming vehicles near the centre on the other side of the road.
    ///
    /// Oncoming left-turners that are waiting or turning do not conflict.
    pub fn has_oncoming_traffic(&self, vehicle: &SimVehicle) -> bool {
        let lateral = lateral_coordinate(vehicle.direction.axis(), &vehicle.position);
        self.approaching(vehicle.direction.opposite())
            .iter()
            .filter(|other| other.id != vehicle.id)
            .filter(|other| {
                !(other.intent == TurnIntent::Left && (other.waiting_for_turn || other.turning))
            })
            .any(|other| {
                other.remaining.abs() < OPPOSING_PROXIMITY
                    && lateral_coordinate(vehicle.direction.axis(), &other.position) * lateral
                        < 0.0
            })
    }
}

fn lateral_coordinate(axis: Axis, position: &Position) -> f32 {
    match axis {
        Axis::NorthSouth => position.x,
        Axis::EastWest => position.z,
    }
}
