#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects tower targets and computes predictive aim points.

use forest_protector_core::EnemyId;
use glam::Vec2;

/// Enemy that may be targeted this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier of the enemy.
    pub enemy: EnemyId,
    /// Current enemy position in world units.
    pub position: Vec2,
}

impl TargetCandidate {
    /// Creates a new candidate descriptor.
    #[must_use]
    pub const fn new(enemy: EnemyId, position: Vec2) -> Self {
        Self { enemy, position }
    }
}

/// Tower targeting system that reuses a scratch buffer of candidates across towers.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<TargetCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the candidate set. Iteration order is preserved and breaks distance ties.
    pub fn prepare<I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = TargetCandidate>,
    {
        self.candidates.clear();
        self.candidates.extend(candidates);
    }

    /// Number of prepared candidates.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Selects the nearest candidate strictly inside `range` of `origin`.
    ///
    /// When several candidates share the smallest distance the one prepared
    /// first wins.
    #[must_use]
    pub fn acquire(&self, origin: Vec2, range: f32) -> Option<TargetCandidate> {
        let range_squared = range * range;
        let mut best: Option<BestCandidate> = None;

        for candidate in &self.candidates {
            let distance_squared = origin.distance_squared(candidate.position);
            if distance_squared >= range_squared {
                continue;
            }

            let current = BestCandidate {
                distance_squared,
                candidate: *candidate,
            };

            match &mut best {
                Some(existing) => {
                    if current.precedes(existing) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }

        best.map(|best| best.candidate)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_squared: f32,
    candidate: TargetCandidate,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        self.distance_squared < other.distance_squared
    }
}

/// Motion of a target as seen by a tower at the moment it fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingTarget {
    /// Current target position.
    pub position: Vec2,
    /// Unit direction of travel, or zero when the target is not moving.
    pub direction: Vec2,
    /// Travel speed in world units per second at normal game speed.
    pub speed: f32,
}

/// Point where a projectile should be aimed to meet `target`.
///
/// The flight time is estimated from the current distance, and the target is
/// extrapolated along its direction of travel for that long. Game speed scales
/// both the projectile and the target.
#[must_use]
pub fn lead_point(origin: Vec2, target: MovingTarget, projectile_speed: f32, game_speed: f32) -> Vec2 {
    let effective_speed = projectile_speed * game_speed;
    if effective_speed <= 0.0 {
        return target.position;
    }

    let time_to_impact = origin.distance(target.position) / effective_speed;
    target.position + target.direction * target.speed * game_speed * time_to_impact
}
