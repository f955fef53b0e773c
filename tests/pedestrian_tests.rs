//! Pedestrian batches spawned by the walk phase

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crossroads_sim::simulation::{
    spawn_batch, Direction, IntersectionSim, ManualClock, NullObserver, PedestrianId, Phase,
    SimConfig, SimId, SimPedestrian, CROSSWALK_HALF_LENGTH, MAX_BATCH, MIN_BATCH,
};

/// Drive a fresh simulation into the walk phase with the given requests
fn walking_sim(requests: &[Direction]) -> (IntersectionSim, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let mut sim = IntersectionSim::with_clock_and_seed(SimConfig::default(), clock.clone(), 5);
    sim.set_spawning(false);
    for direction in requests {
        sim.request_crossing(*direction, &mut NullObserver);
    }
    clock.set(5000);
    sim.tick(&mut NullObserver);
    clock.set(7000);
    sim.tick(&mut NullObserver);
    (sim, clock)
}

#[test]
fn test_batch_size_and_spacing() {
    let mut rng = StdRng::seed_from_u64(3);
    for round in 0..50 {
        let mut next = round * 10;
        let batch = spawn_batch(Direction::East, &mut rng, || {
            next += 1;
            PedestrianId(SimId(next))
        });
        assert!((MIN_BATCH..=MAX_BATCH).contains(&batch.len()));

        let ids: HashSet<PedestrianId> = batch.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), batch.len());
        for pedestrian in &batch {
            assert_eq!(pedestrian.direction, Direction::East);
            assert_eq!(pedestrian.progress, 0.0);
            assert!(pedestrian.speed >= 0.01 && pedestrian.speed < 0.02);
            assert_eq!(pedestrian.start.x, -CROSSWALK_HALF_LENGTH);
            assert_eq!(pedestrian.end.x, CROSSWALK_HALF_LENGTH);
            assert_eq!(pedestrian.start.z, pedestrian.end.z);
        }
    }
}

#[test]
fn test_pedestrian_reaches_far_side() {
    let mut pedestrian = SimPedestrian::new(PedestrianId(SimId(0)), Direction::North, 0.0, 0.25);
    assert!(!pedestrian.update());
    assert!(!pedestrian.update());
    assert!(!pedestrian.update());
    assert!(pedestrian.update());
    assert_eq!(pedestrian.progress, 1.0);
    assert_eq!(pedestrian.position, pedestrian.end);
    assert_eq!(pedestrian.end.z, -CROSSWALK_HALF_LENGTH);
}

#[test]
fn test_walk_phase_spawns_for_each_request() {
    let (sim, _clock) = walking_sim(&[Direction::North, Direction::West]);
    assert_eq!(sim.phase(), Phase::PedestrianWalk);

    let pedestrians = sim.pedestrians();
    let north = pedestrians.iter().filter(|p| p.direction == Direction::North).count();
    let west = pedestrians.iter().filter(|p| p.direction == Direction::West).count();
    assert!((MIN_BATCH..=MAX_BATCH).contains(&north));
    assert!((MIN_BATCH..=MAX_BATCH).contains(&west));
    assert_eq!(north + west, pedestrians.len());
    assert_eq!(sim.stats().pedestrian_walks, 1);
}

#[test]
fn test_pedestrians_removed_when_done() {
    let (mut sim, _clock) = walking_sim(&[Direction::South]);
    let spawned = sim.pedestrians().len() as u64;
    assert!(spawned > 0);

    for _ in 0..110 {
        sim.tick(&mut NullObserver);
        for pedestrian in sim.pedestrians() {
            assert!(pedestrian.progress < 1.0);
        }
    }
    assert!(sim.pedestrians().is_empty());
    assert_eq!(sim.stats().pedestrians_spawned, spawned);
    assert_eq!(sim.stats().pedestrians_finished, spawned);
}

#[test]
fn test_no_pedestrians_without_requests() {
    let (sim, _clock) = walking_sim(&[]);
    assert_eq!(sim.phase(), Phase::EastWestGreen);
    assert!(sim.pedestrians().is_empty());
}
