//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use forest_protector_core::{
    AimStrategy, EnemyId, Event, GameSpeed, GridCell, TowerId, TowerKind, TowerStats,
};
use forest_protector_system_tower_targeting::{
    lead_point, MovingTarget, TargetCandidate, TowerTargeting,
};
use glam::Vec2;
use rand::Rng;

use crate::{
    enemy::Enemy,
    projectile::{Aim, Flight, Projectile},
};

const DAMAGE_GAIN: f32 = 0.15;
const RANGE_GAIN: f32 = 0.10;
const FIRE_RATE_GAIN: f32 = 0.05;
const ACCURACY_GAIN: f32 = 0.02;

/// Timing information shared by every tower during a tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TickContext {
    /// Play clock after the tick advanced.
    pub(crate) now: Duration,
    /// Tick length in seconds after game speed scaling.
    pub(crate) scaled_dt: f32,
    /// Game speed in effect for the tick.
    pub(crate) game_speed: GameSpeed,
}

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: GridCell,
    pub(crate) position: Vec2,
    pub(crate) damage: f32,
    pub(crate) range: f32,
    pub(crate) fire_rate: f32,
    pub(crate) accuracy: f32,
    pub(crate) level: u32,
    pub(crate) total_cost: u32,
    upgrade_effectiveness: f32,
    last_shot: Duration,
    pub(crate) projectiles: Vec<Projectile>,
}

impl Tower {
    pub(crate) fn new(
        id: TowerId,
        kind: TowerKind,
        cell: GridCell,
        position: Vec2,
        upgrade_effectiveness: f32,
        placed_at: Duration,
    ) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            cell,
            position,
            damage: stats.damage,
            range: stats.range,
            fire_rate: stats.fire_rate,
            accuracy: stats.accuracy,
            level: 1,
            total_cost: stats.cost,
            upgrade_effectiveness,
            last_shot: placed_at,
            projectiles: Vec::new(),
        }
    }

    fn stats(&self) -> TowerStats {
        self.kind.stats()
    }

    pub(crate) fn max_level(&self) -> u32 {
        self.stats().max_level
    }

    pub(crate) fn is_max_level(&self) -> bool {
        self.level >= self.max_level()
    }

    pub(crate) fn set_upgrade_effectiveness(&mut self, effectiveness: f32) {
        self.upgrade_effectiveness = effectiveness;
    }

    /// Raises the tower one level, returning `false` when already at the maximum.
    pub(crate) fn upgrade(&mut self) -> bool {
        if self.is_max_level() {
            return false;
        }

        let base = self.stats();
        let effectiveness = self.upgrade_effectiveness;
        self.level += 1;
        self.total_cost += self.kind.invested_upgrade_cost();
        self.damage += base.damage * DAMAGE_GAIN * effectiveness;
        self.range += base.range * RANGE_GAIN * effectiveness;
        self.fire_rate += base.fire_rate * FIRE_RATE_GAIN * effectiveness;
        self.accuracy = (self.accuracy + ACCURACY_GAIN * effectiveness).min(1.0);
        true
    }

    /// Minimum time between shots at the provided game speed.
    pub(crate) fn fire_interval(&self, game_speed: GameSpeed) -> Option<Duration> {
        let shots_per_second = f64::from(self.fire_rate) * f64::from(game_speed.tenths()) / 10.0;
        if !(shots_per_second.is_finite() && shots_per_second > 0.0) {
            return None;
        }
        Some(Duration::from_secs_f64(1.0 / shots_per_second))
    }

    /// Advances projectiles, then acquires a target and fires if the cooldown allows.
    pub(crate) fn update<R>(
        &mut self,
        enemies: &mut [Enemy],
        targeting: &mut TowerTargeting,
        ctx: TickContext,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
    {
        let tower = self.id;
        self.projectiles
            .retain_mut(|projectile| match projectile.update(ctx.scaled_dt, enemies) {
                Flight::InFlight => true,
                Flight::Hit => {
                    out_events.push(Event::ProjectileHit {
                        tower,
                        target: projectile.target,
                        damage: projectile.damage(),
                    });
                    false
                }
                Flight::Expired => false,
            });

        targeting.prepare(
            enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| TargetCandidate::new(enemy.id, enemy.position)),
        );
        let Some(target) = targeting.acquire(self.position, self.range) else {
            return;
        };

        let Some(interval) = self.fire_interval(ctx.game_speed) else {
            return;
        };
        let since_last_shot = ctx.now.saturating_sub(self.last_shot);
        if since_last_shot < interval {
            return;
        }
        self.last_shot = if since_last_shot < interval * 2 {
            self.last_shot + interval
        } else {
            ctx.now
        };

        if rng.gen::<f32>() >= self.accuracy {
            out_events.push(Event::ShotMissed {
                tower: self.id,
                target: target.enemy,
            });
            return;
        }

        let aim = match self.stats().aim {
            AimStrategy::Direct => Aim::Homing,
            AimStrategy::Predictive => Aim::Lead {
                point: self.lead_point(target.enemy, enemies, ctx.game_speed),
            },
        };
        self.projectiles.push(Projectile::new(
            self.position,
            target.enemy,
            self.damage,
            self.stats().projectile_speed,
            aim,
        ));
        out_events.push(Event::ProjectileFired {
            tower: self.id,
            target: target.enemy,
        });
    }

    fn lead_point(&self, target: EnemyId, enemies: &[Enemy], game_speed: GameSpeed) -> Vec2 {
        let Some(enemy) = enemies.iter().find(|enemy| enemy.id == target) else {
            return self.position;
        };

        lead_point(
            self.position,
            MovingTarget {
                position: enemy.position,
                direction: enemy.segment_direction(),
                speed: enemy.speed,
            },
            self.stats().projectile_speed,
            game_speed.multiplier(),
        )
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: GridCell,
        position: Vec2,
        upgrade_effectiveness: f32,
        placed_at: Duration,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let tower = Tower::new(id, kind, cell, position, upgrade_effectiveness, placed_at);
        let _ = self.entries.insert(id, tower);
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn is_occupied(&self, cell: GridCell) -> bool {
        self.entries.values().any(|tower| tower.cell == cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    /// Removes every tower, returning them in identifier order.
    pub(crate) fn drain(&mut self) -> Vec<Tower> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forest_protector_core::{Difficulty, EnemyKind, Path};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tower(kind: TowerKind) -> Tower {
        Tower::new(
            TowerId::new(0),
            kind,
            GridCell::new(0, 0),
            Vec2::ZERO,
            1.0,
            Duration::ZERO,
        )
    }

    fn enemy_at(id: u32, position: Vec2, health: f32) -> Enemy {
        let path = Path::through(position, Vec::new(), position + Vec2::new(0.0, 400.0));
        let mut enemy = Enemy::spawn(
            EnemyId::new(id),
            EnemyKind::Goblin,
            path,
            &Difficulty::NORMAL.profile(),
            0.0,
        );
        enemy.health = health;
        enemy.max_health = health;
        enemy
    }

    fn count_shots(tower: &mut Tower, enemies: &mut [Enemy], elapsed: Duration) -> usize {
        count_shots_at(tower, enemies, elapsed, GameSpeed::NORMAL)
    }

    fn count_shots_at(
        tower: &mut Tower,
        enemies: &mut [Enemy],
        elapsed: Duration,
        game_speed: GameSpeed,
    ) -> usize {
        let mut targeting = TowerTargeting::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut events = Vec::new();
        let dt = Duration::from_millis(10);
        let mut now = Duration::ZERO;
        while now < elapsed {
            now += dt;
            tower.update(
                enemies,
                &mut targeting,
                TickContext {
                    now,
                    scaled_dt: 0.0,
                    game_speed,
                },
                &mut rng,
                &mut events,
            );
        }
        events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFired { .. }))
            .count()
    }

    #[test]
    fn upgrade_succeeds_one_fewer_times_than_max_level() {
        for kind in TowerKind::ALL {
            let mut tower = tower(kind);
            let max_level = kind.stats().max_level;

            let successes = (0..max_level).filter(|_| tower.upgrade()).count();

            assert_eq!(successes as u32, max_level - 1);
            assert_eq!(tower.level, max_level);
            assert_eq!(
                tower.total_cost,
                kind.stats().cost + (max_level - 1) * kind.invested_upgrade_cost()
            );
        }
    }

    #[test]
    fn upgrade_gains_scale_with_effectiveness() {
        let mut tower = tower(TowerKind::Cannon);
        tower.set_upgrade_effectiveness(0.8);

        assert!(tower.upgrade());

        assert!((tower.damage - (40.0 + 40.0 * 0.15 * 0.8)).abs() < 1e-4);
        assert!((tower.range - (100.0 + 100.0 * 0.1 * 0.8)).abs() < 1e-4);
        assert!((tower.fire_rate - (1.25 + 1.25 * 0.05 * 0.8)).abs() < 1e-4);
        assert!((tower.accuracy - (0.65 + 0.02 * 0.8)).abs() < 1e-4);
    }

    #[test]
    fn accuracy_never_exceeds_one() {
        let mut tower = tower(TowerKind::Archer);
        while tower.upgrade() {}

        assert_eq!(tower.accuracy, 1.0);
    }

    #[test]
    fn perfect_accuracy_fires_once_per_interval() {
        for (kind, elapsed_secs) in [(TowerKind::Archer, 10), (TowerKind::Magic, 10)] {
            let mut tower = tower(kind);
            let mut enemies = vec![enemy_at(1, Vec2::new(50.0, 0.0), f32::MAX)];
            tower.accuracy = 1.0;

            let shots = count_shots(&mut tower, &mut enemies, Duration::from_secs(elapsed_secs));

            let expected = (elapsed_secs as f32 * kind.stats().fire_rate).floor() as usize;
            assert_eq!(shots, expected, "{kind:?}");
        }
    }

    #[test]
    fn game_speed_scales_the_fire_interval() {
        let elapsed = Duration::from_millis(10_050);
        for (game_speed, expected) in [
            (GameSpeed::MAX, 60),
            (GameSpeed::NORMAL, 30),
            (GameSpeed::from_tenths(5), 15),
        ] {
            let mut tower = tower(TowerKind::Archer);
            let mut enemies = vec![enemy_at(1, Vec2::new(50.0, 0.0), f32::MAX)];

            let shots = count_shots_at(&mut tower, &mut enemies, elapsed, game_speed);

            let rate = 3.0 * f64::from(game_speed.multiplier());
            assert_eq!(
                (elapsed.as_secs_f64() * rate).floor() as usize,
                expected,
                "{game_speed:?}"
            );
            assert_eq!(shots, expected, "{game_speed:?}");
        }
    }

    #[test]
    fn towers_hold_fire_without_a_target_in_range() {
        let mut tower = tower(TowerKind::Archer);
        let mut enemies = vec![enemy_at(1, Vec2::new(151.0, 0.0), f32::MAX)];

        assert_eq!(count_shots(&mut tower, &mut enemies, Duration::from_secs(2)), 0);
    }

    #[test]
    fn missed_shots_consume_the_cooldown() {
        let mut tower = tower(TowerKind::Archer);
        tower.accuracy = 0.0;
        let mut enemies = vec![enemy_at(1, Vec2::new(50.0, 0.0), f32::MAX)];
        let mut targeting = TowerTargeting::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut events = Vec::new();

        let mut now = Duration::ZERO;
        for _ in 0..100 {
            now += Duration::from_millis(10);
            tower.update(
                &mut enemies,
                &mut targeting,
                TickContext {
                    now,
                    scaled_dt: 0.01,
                    game_speed: GameSpeed::NORMAL,
                },
                &mut rng,
                &mut events,
            );
        }

        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::ShotMissed { .. })));
        assert!(tower.projectiles.is_empty());
    }

    #[test]
    fn impacts_are_reported_and_spent_projectiles_dropped() {
        let mut tower = tower(TowerKind::Archer);
        let mut enemies = vec![enemy_at(1, Vec2::new(50.0, 0.0), 100.0)];
        let mut targeting = TowerTargeting::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut events = Vec::new();
        let now = Duration::from_secs(1);

        for scaled_dt in [0.0, 1.0] {
            tower.update(
                &mut enemies,
                &mut targeting,
                TickContext {
                    now,
                    scaled_dt,
                    game_speed: GameSpeed::NORMAL,
                },
                &mut rng,
                &mut events,
            );
        }

        assert_eq!(
            events,
            vec![
                Event::ProjectileFired {
                    tower: TowerId::new(0),
                    target: EnemyId::new(1),
                },
                Event::ProjectileHit {
                    tower: TowerId::new(0),
                    target: EnemyId::new(1),
                    damage: 20.0,
                },
            ]
        );
        assert!(tower.projectiles.is_empty());
        assert_eq!(enemies[0].health, 80.0);
    }

    #[test]
    fn predictive_aim_never_moves_the_target() {
        let mut tower = tower(TowerKind::Magic);
        tower.accuracy = 1.0;
        let start = Vec2::new(60.0, 0.0);
        let mut enemies = vec![enemy_at(1, start, f32::MAX)];
        enemies[0].speed = 0.0;
        let mut targeting = TowerTargeting::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut events = Vec::new();

        tower.update(
            &mut enemies,
            &mut targeting,
            TickContext {
                now: Duration::from_secs(1),
                scaled_dt: 0.0,
                game_speed: GameSpeed::NORMAL,
            },
            &mut rng,
            &mut events,
        );

        assert_eq!(tower.projectiles.len(), 1);
        assert_eq!(enemies[0].position, start);
        assert!(matches!(tower.projectiles[0].aim, Aim::Lead { .. }));
    }

    #[test]
    fn lead_point_follows_segment_direction() {
        let tower = tower(TowerKind::Magic);
        let enemies = vec![enemy_at(1, Vec2::new(120.0, 0.0), 50.0)];

        let lead = tower.lead_point(EnemyId::new(1), &enemies, GameSpeed::NORMAL);

        // 120 units at 600/s is 0.2s of flight; a goblin covers 36 units in that time.
        assert!(lead.distance(Vec2::new(120.0, 36.0)) < 1e-3);
        assert_eq!(enemies[0].position, Vec2::new(120.0, 0.0));
    }

    #[test]
    fn lead_point_is_independent_of_game_speed() {
        let tower = tower(TowerKind::Magic);
        let enemies = vec![enemy_at(1, Vec2::new(120.0, 0.0), 50.0)];

        // At 2x the flight takes 0.1s while the goblin moves at 360/s.
        for game_speed in [GameSpeed::MAX, GameSpeed::from_tenths(5)] {
            let lead = tower.lead_point(EnemyId::new(1), &enemies, game_speed);

            assert!(lead.distance(Vec2::new(120.0, 36.0)) < 1e-3, "{game_speed:?}");
        }
    }

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(
            TowerKind::Archer,
            GridCell::new(1, 1),
            Vec2::new(30.0, 30.0),
            1.0,
            Duration::ZERO,
        );
        let second = registry.insert(
            TowerKind::Magic,
            GridCell::new(4, 1),
            Vec2::new(90.0, 30.0),
            1.0,
            Duration::ZERO,
        );

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert!(registry.is_occupied(GridCell::new(4, 1)));
        assert!(!registry.is_occupied(GridCell::new(2, 1)));
        assert_eq!(registry.drain().len(), 2);
        assert_eq!(registry.iter().count(), 0);
    }
}
