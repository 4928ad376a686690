//! Enemies walking the path.

use forest_protector_core::{DifficultyProfile, EnemyId, EnemyKind, Path};
use glam::Vec2;

/// Lifecycle of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyStatus {
    /// Waiting at the path start for its spawn delay to elapse.
    Spawning,
    /// Walking along its path.
    Walking,
    /// Health dropped to zero.
    Killed,
    /// Reached the end of its path.
    Escaped,
}

impl EnemyStatus {
    /// Returns `true` while the enemy is still on the field.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, EnemyStatus::Spawning | EnemyStatus::Walking)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    path: Path,
    pub(crate) position: Vec2,
    pub(crate) path_index: usize,
    progress: f32,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) reward: u32,
    spawn_delay: f32,
    pub(crate) status: EnemyStatus,
}

impl Enemy {
    /// Creates an enemy at the start of `path` with difficulty-scaled stats.
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        path: Path,
        profile: &DifficultyProfile,
        spawn_delay: f32,
    ) -> Self {
        let stats = kind.stats();
        let health = stats.health * profile.health_multiplier;
        let reward = (stats.reward as f32 * profile.reward_multiplier).floor() as u32;
        let spawn_delay = spawn_delay.max(0.0);
        Self {
            id,
            kind,
            position: path.start(),
            path,
            path_index: 0,
            progress: 0.0,
            health,
            max_health: health,
            speed: stats.speed * profile.speed_multiplier,
            reward,
            spawn_delay,
            status: if spawn_delay > 0.0 {
                EnemyStatus::Spawning
            } else {
                EnemyStatus::Walking
            },
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.status.is_alive()
    }

    /// Advances the enemy by `dt` seconds of game-speed-scaled time.
    pub(crate) fn update(&mut self, dt: f32) {
        match self.status {
            EnemyStatus::Spawning => {
                self.spawn_delay -= dt;
                if self.spawn_delay <= 0.0 {
                    self.spawn_delay = 0.0;
                    self.status = EnemyStatus::Walking;
                }
            }
            EnemyStatus::Walking => self.walk(dt),
            EnemyStatus::Killed | EnemyStatus::Escaped => {}
        }
    }

    fn walk(&mut self, dt: f32) {
        let (Some(current), Some(next)) = (
            self.path.point(self.path_index),
            self.path.point(self.path_index + 1),
        ) else {
            self.status = EnemyStatus::Escaped;
            return;
        };

        let segment_length = current.distance(next);
        self.progress += self.speed * dt;

        if self.progress >= segment_length {
            self.path_index += 1;
            self.position = next;
            self.progress = 0.0;
            if self.path_index >= self.path.len() - 1 {
                self.status = EnemyStatus::Escaped;
            }
        } else {
            self.position = current.lerp(next, self.progress / segment_length);
        }
    }

    pub(crate) fn take_damage(&mut self, amount: f32) {
        if !self.is_alive() {
            return;
        }

        self.health -= amount;
        if self.health <= 0.0 {
            self.status = EnemyStatus::Killed;
        }
    }

    /// Unit vector of the segment currently being walked, zero past the last waypoint.
    pub(crate) fn segment_direction(&self) -> Vec2 {
        match (
            self.path.point(self.path_index),
            self.path.point(self.path_index + 1),
        ) {
            (Some(current), Some(next)) => (next - current).normalize_or_zero(),
            _ => Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forest_protector_core::Difficulty;

    fn straight_path() -> Path {
        Path::through(
            Vec2::new(0.0, 0.0),
            [Vec2::new(100.0, 0.0)],
            Vec2::new(100.0, 100.0),
        )
    }

    fn goblin(spawn_delay: f32) -> Enemy {
        Enemy::spawn(
            EnemyId::new(1),
            EnemyKind::Goblin,
            straight_path(),
            &Difficulty::NORMAL.profile(),
            spawn_delay,
        )
    }

    #[test]
    fn spawn_delay_holds_enemy_at_path_start() {
        let mut enemy = goblin(0.5);

        enemy.update(0.25);
        assert_eq!(enemy.status, EnemyStatus::Spawning);
        assert_eq!(enemy.position, Vec2::ZERO);

        enemy.update(0.25);
        assert_eq!(enemy.status, EnemyStatus::Walking);
        assert_eq!(enemy.position, Vec2::ZERO);
    }

    #[test]
    fn walking_interpolates_along_segment() {
        let mut enemy = goblin(0.0);

        enemy.update(0.25);

        assert!(enemy.position.distance(Vec2::new(45.0, 0.0)) < 1e-3);
        assert_eq!(enemy.path_index, 0);
        assert_eq!(enemy.segment_direction(), Vec2::X);
    }

    #[test]
    fn reaching_a_waypoint_snaps_and_resets_progress() {
        let mut enemy = goblin(0.0);

        enemy.update(1.0);

        assert_eq!(enemy.position, Vec2::new(100.0, 0.0));
        assert_eq!(enemy.path_index, 1);
        assert_eq!(enemy.segment_direction(), Vec2::Y);
        assert_eq!(enemy.status, EnemyStatus::Walking);
    }

    #[test]
    fn reaching_the_last_waypoint_escapes() {
        let mut enemy = goblin(0.0);

        enemy.update(1.0);
        enemy.update(1.0);

        assert_eq!(enemy.status, EnemyStatus::Escaped);
        assert_eq!(enemy.position, Vec2::new(100.0, 100.0));
        assert!(!enemy.is_alive());
        assert_eq!(enemy.segment_direction(), Vec2::ZERO);
    }

    #[test]
    fn lethal_damage_kills_and_further_damage_is_ignored() {
        let mut enemy = goblin(0.0);

        enemy.take_damage(20.0);
        assert_eq!(enemy.status, EnemyStatus::Walking);
        enemy.take_damage(30.0);
        assert_eq!(enemy.status, EnemyStatus::Killed);
        enemy.take_damage(30.0);
        assert_eq!(enemy.health, 0.0);
    }

    #[test]
    fn difficulty_scales_stats_and_floors_reward() {
        let enemy = Enemy::spawn(
            EnemyId::new(3),
            EnemyKind::Troll,
            straight_path(),
            &Difficulty::HARD.profile(),
            0.0,
        );

        assert!((enemy.health - 130.0).abs() < 1e-3);
        assert_eq!(enemy.max_health, enemy.health);
        assert_eq!(enemy.reward, 45);
        assert!((enemy.speed - 132.0).abs() < 1e-3);
    }
}
