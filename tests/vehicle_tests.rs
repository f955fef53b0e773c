//! Vehicle movement, stop line, left-turn yielding and exit counting

use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use crossroads_sim::simulation::{
    Direction, HoldReason, IntersectionSim, ManualClock, NullObserver, SignalState, SimConfig,
    SimVehicle, TrafficView, TurnIntent, VehicleClass, VehicleId, CAR_LENGTH, FOLLOWING_GAP,
    LANE_OFFSET, SPAWN_DISTANCE, STOP_LINE_DISTANCE,
};

/// A simulation whose clock never moves, so north-south stays green
fn frozen_sim() -> (IntersectionSim, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let mut sim = IntersectionSim::with_clock_and_seed(SimConfig::default(), clock.clone(), 1);
    sim.set_spawning(false);
    (sim, clock)
}

fn find(sim: &IntersectionSim, id: VehicleId) -> Option<&SimVehicle> {
    sim.vehicles().iter().find(|vehicle| vehicle.id == id)
}

#[test]
fn test_vehicle_spawns_in_right_hand_lane() {
    let (mut sim, _clock) = frozen_sim();
    let north = sim.spawn_vehicle(Direction::North, VehicleClass::Car, TurnIntent::Straight);
    let east = sim.spawn_vehicle(Direction::East, VehicleClass::Truck, TurnIntent::Left);

    let vehicle = find(&sim, north).expect("north vehicle exists");
    assert_eq!(vehicle.position.x, LANE_OFFSET);
    assert_eq!(vehicle.position.z, SPAWN_DISTANCE);
    assert_eq!(vehicle.heading, PI);
    assert_eq!(vehicle.speed, SimConfig::default().car_speed);
    assert!(!vehicle.crossed);

    let truck = find(&sim, east).expect("east vehicle exists");
    assert_eq!(truck.position.x, -SPAWN_DISTANCE);
    assert_eq!(truck.position.z, LANE_OFFSET);
    assert_eq!(truck.speed, SimConfig::default().truck_speed);
    assert_eq!(sim.stats().vehicles_spawned, 2);
}

#[test]
fn test_north_car_exits_on_tick_1299() {
    let (mut sim, _clock) = frozen_sim();
    let id = sim.spawn_vehicle(Direction::North, VehicleClass::Car, TurnIntent::Straight);

    // The lane offset puts the car at (2, 30), so the exit radius is
    // crossed at |z| > 34.943 rather than after a flat 65 units
    for _ in 0..1298 {
        sim.tick(&mut NullObserver);
    }
    let vehicle = find(&sim, id).expect("still inside the exit radius");
    assert!(vehicle.crossed);
    assert!(vehicle.position.x.hypot(vehicle.position.z) <= 35.0);
    assert_eq!(sim.vehicles_passed(), 0);

    sim.tick(&mut NullObserver);
    assert!(find(&sim, id).is_none(), "vehicle should exit on tick 1299");
    assert_eq!(sim.vehicles_passed(), 1);
    assert_eq!(sim.stats().vehicles_exited_uncrossed, 0);
}

#[test]
fn test_vehicle_holds_at_red_stop_line() {
    let (mut sim, clock) = frozen_sim();
    let id = sim.spawn_vehicle(Direction::East, VehicleClass::Car, TurnIntent::Straight);
    assert_eq!(sim.signal_for(Direction::East), SignalState::Red);

    for _ in 0..1000 {
        sim.tick(&mut NullObserver);
        let vehicle = find(&sim, id).expect("vehicle waits at the light");
        assert!(vehicle.remaining_to_center() >= STOP_LINE_DISTANCE - 1e-3);
    }
    let vehicle = find(&sim, id).expect("vehicle waits at the light");
    assert!((vehicle.remaining_to_center() - STOP_LINE_DISTANCE).abs() < 1e-3);
    assert_eq!(vehicle.last_hold, Some(HoldReason::RedSignal));
    assert!(!vehicle.crossed);
    assert!(sim.stats().red_hold_ticks > 0);

    // Through yellow into east-west green
    clock.set(5000);
    sim.tick(&mut NullObserver);
    assert_eq!(sim.signal_for(Direction::East), SignalState::Red);
    clock.set(7000);
    sim.tick(&mut NullObserver);
    assert_eq!(sim.signal_for(Direction::East), SignalState::Green);

    for _ in 0..200 {
        sim.tick(&mut NullObserver);
    }
    let vehicle = find(&sim, id).expect("vehicle still on the map");
    assert!(vehicle.crossed);
}

#[test]
fn test_crossed_vehicle_ignores_red() {
    let (mut sim, clock) = frozen_sim();
    let id = sim.spawn_vehicle(Direction::South, VehicleClass::Car, TurnIntent::Straight);

    // Past the centre while still green
    for _ in 0..620 {
        sim.tick(&mut NullObserver);
    }
    assert!(find(&sim, id).map_or(false, |v| v.crossed));

    clock.set(5000);
    sim.tick(&mut NullObserver);
    clock.set(7000);
    sim.tick(&mut NullObserver);
    assert_eq!(sim.signal_for(Direction::South), SignalState::Red);

    let before = find(&sim, id).map(|v| v.position).expect("vehicle present");
    sim.tick(&mut NullObserver);
    let after = find(&sim, id).map(|v| v.position).expect("vehicle present");
    assert!(after.z > before.z, "crossed vehicle keeps driving south");
}

#[test]
fn test_following_vehicle_keeps_gap() {
    let (mut sim, _clock) = frozen_sim();
    let lead = sim.spawn_vehicle(Direction::West, VehicleClass::Car, TurnIntent::Straight);
    let follower = sim.spawn_vehicle(Direction::West, VehicleClass::Car, TurnIntent::Straight);
    let required = CAR_LENGTH + FOLLOWING_GAP;

    sim.tick(&mut NullObserver);
    let waiting = find(&sim, follower).expect("follower present");
    assert_eq!(waiting.last_hold, Some(HoldReason::Following));

    // West is red: the queue forms behind the stop line
    let mut previous = 0.0;
    for _ in 0..1000 {
        sim.tick(&mut NullObserver);
        let a = find(&sim, lead).expect("lead present");
        let b = find(&sim, follower).expect("follower present");
        let spacing = b.remaining_to_center() - a.remaining_to_center();
        assert!(spacing >= required.min(previous) - 1e-3);
        previous = spacing;
    }

    let a = find(&sim, lead).expect("lead present");
    let b = find(&sim, follower).expect("follower present");
    assert!((a.remaining_to_center() - STOP_LINE_DISTANCE).abs() < 1e-3);
    assert!((b.remaining_to_center() - a.remaining_to_center() - required).abs() < 1e-2);
    assert!(sim.stats().following_hold_ticks > 0);
}

#[test]
fn test_left_turner_yields_to_oncoming() {
    let (mut sim, _clock) = frozen_sim();
    let turner = sim.spawn_vehicle(Direction::North, VehicleClass::Car, TurnIntent::Left);
    let oncoming = sim.spawn_vehicle(Direction::South, VehicleClass::Car, TurnIntent::Straight);

    let mut yielded = false;
    let mut turned = false;
    for _ in 0..1000 {
        sim.tick(&mut NullObserver);
        let vehicle = find(&sim, turner).expect("turner stays on the map");
        if vehicle.last_hold == Some(HoldReason::Yielding) {
            yielded = true;
            assert!(!vehicle.turning);
        }
        if vehicle.turning {
            turned = true;
            if let Some(other) = find(&sim, oncoming) {
                assert!(
                    other.remaining_to_center() < -9.9,
                    "turned while oncoming vehicle was near the centre"
                );
            }
            assert!(vehicle.heading > PI);
            assert!(vehicle.heading <= PI + FRAC_PI_2 + 1e-4);
        }
    }
    assert!(yielded, "left turner should have waited");
    assert!(turned, "left turner should turn once the road is clear");
    assert!(sim.stats().yield_hold_ticks > 0);
}

#[test]
fn test_opposing_left_turners_do_not_deadlock() {
    let (mut sim, _clock) = frozen_sim();
    let north = sim.spawn_vehicle(Direction::North, VehicleClass::Car, TurnIntent::Left);
    let south = sim.spawn_vehicle(Direction::South, VehicleClass::Car, TurnIntent::Left);

    let mut closest = f32::MAX;
    let mut both_turned = false;
    for _ in 0..2000 {
        sim.tick(&mut NullObserver);
        match (find(&sim, north), find(&sim, south)) {
            (Some(a), Some(b)) => {
                both_turned |= a.turning && b.turning;
                let dx = a.position.x - b.position.x;
                let dz = a.position.z - b.position.z;
                closest = closest.min(dx.hypot(dz));
            }
            (None, None) => break,
            _ => {}
        }
    }

    // A near miss: the turning paths pass within about 1.7 units
    assert!(both_turned, "both turners should be turning at once");
    assert!(closest > 1.0 && closest < CAR_LENGTH + FOLLOWING_GAP);
    assert_eq!(sim.vehicles_passed(), 2);
    assert!(sim.vehicles().is_empty());
}

#[test]
fn test_turn_heading_caps_at_quarter_turn() {
    let (mut sim, clock) = frozen_sim();
    clock.set(5000);
    sim.tick(&mut NullObserver);
    clock.set(7000);
    sim.tick(&mut NullObserver);
    assert_eq!(sim.signal_for(Direction::East), SignalState::Green);

    let turner = sim.spawn_vehicle(Direction::East, VehicleClass::Car, TurnIntent::Left);
    let mut max_heading = f32::MIN;
    let mut exited = false;
    for _ in 0..2000 {
        sim.tick(&mut NullObserver);
        match find(&sim, turner) {
            Some(vehicle) => max_heading = max_heading.max(vehicle.heading),
            None => {
                exited = true;
                break;
            }
        }
    }

    assert!(exited, "turned vehicle should leave the map");
    let full = Direction::East.heading() + FRAC_PI_2;
    assert!((max_heading - full).abs() < 1e-4);
    assert_eq!(sim.vehicles_passed(), 1);
}

#[test]
fn test_vehicle_invariants_over_seeded_run() {
    let clock = Arc::new(ManualClock::new(0));
    let config = SimConfig {
        spawn_rate: 3.0,
        left_turn_probability: 0.4,
        ..SimConfig::default()
    };
    let mut sim = IntersectionSim::with_clock_and_seed(config, clock.clone(), 42);
    let mut crossed: HashSet<VehicleId> = HashSet::new();

    for _ in 0..15_000 {
        let before: Vec<SimVehicle> = sim.vehicles().to_vec();
        let view = TrafficView::capture(before.iter());

        clock.advance(16);
        sim.tick(&mut NullObserver);
        let signals = sim.signals();

        for vehicle in sim.vehicles() {
            assert!(
                !crossed.contains(&vehicle.id) || vehicle.crossed,
                "crossed flag was cleared"
            );
            if vehicle.crossed {
                crossed.insert(vehicle.id);
            }

            let Some(old) = before.iter().find(|v| v.id == vehicle.id) else {
                continue;
            };

            if vehicle.turning && !old.turning {
                assert!(
                    !view.has_oncoming_traffic(old),
                    "vehicle {:?} turned into oncoming traffic",
                    vehicle.id
                );
            }

            let stopped_by_light = !old.crossed
                && !old.turning
                && old.intent == TurnIntent::Straight
                && signals.get(vehicle.direction) != SignalState::Green
                && old.remaining_to_center() >= STOP_LINE_DISTANCE;
            if stopped_by_light {
                assert!(
                    vehicle.remaining_to_center() >= STOP_LINE_DISTANCE - 1e-3,
                    "vehicle {:?} ran the light",
                    vehicle.id
                );
            }
        }
    }

    let stats = sim.stats();
    assert!(stats.vehicles_passed > 0);
    assert_eq!(
        stats.vehicles_spawned,
        stats.vehicles_passed + stats.vehicles_exited_uncrossed + sim.vehicles().len() as u64
    );
}
