//! Pedestrians crossing during the walk phase

use rand::Rng;

use super::types::{Direction, PedestrianId, Position, CROSSWALK_HALF_LENGTH, PEDESTRIAN_SPACING};

pub const MIN_BATCH: usize = 3;
pub const MAX_BATCH: usize = 5;

/// Progress per tick is drawn from this range
pub const PEDESTRIAN_SPEED_RANGE: std::ops::Range<f32> = 0.01..0.02;

/// A pedestrian walking a straight crosswalk
#[derive(Debug, Clone)]
pub struct SimPedestrian {
    pub id: PedestrianId,
    /// Walking direction
    pub direction: Direction,
    /// Fraction of the crossing completed, 0.0 to 1.0
    pub progress: f32,
    /// Progress per tick
    pub speed: f32,
    pub start: Position,
    pub end: Position,
    pub position: Position,
}

impl SimPedestrian {
    pub fn new(id: PedestrianId, direction: Direction, lateral_offset: f32, speed: f32) -> Self {
        let travel = direction.vector();
        let side = direction.right_vector().scaled(lateral_offset);
        let start = travel.scaled(-CROSSWALK_HALF_LENGTH).offset(&side);
        let end = travel.scaled(CROSSWALK_HALF_LENGTH).offset(&side);

        Self {
            id,
            direction,
            progress: 0.0,
            speed,
            start,
            end,
            position: start,
        }
    }

    /// Advance one tick. Returns true once the far kerb is reached.
    pub fn update(&mut self) -> bool {
        self.progress = (self.progress + self.speed).min(1.0);
        self.position = self.start.lerp(&self.end, self.progress);
        self.progress >= 1.0
    }
}

/// Create a batch of 3 to 5 pedestrians for one requested crossing.
///
/// `next_id` is called once per pedestrian.
pub fn spawn_batch<R: Rng + ?Sized>(
    direction: Direction,
    rng: &mut R,
    mut next_id: impl FnMut() -> PedestrianId,
) -> Vec<SimPedestrian> {
    let count = rng.random_range(MIN_BATCH..=MAX_BATCH);
    (0..count)
        .map(|i| {
            let offset = (i as f32 - count as f32 / 2.0) * PEDESTRIAN_SPACING;
            let speed = rng.random_range(PEDESTRIAN_SPEED_RANGE);
            SimPedestrian::new(next_id(), direction, offset, speed)
        })
        .collect()
}
