#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Forest Protector.
//!
//! The [`World`] owns every piece of mutable session state. Adapters and
//! systems never touch it directly: they submit [`Command`] values through
//! [`apply`] and observe the resulting [`Event`] values, or read immutable
//! snapshots through the [`query`] module.

mod enemy;
mod projectile;
mod towers;

use std::time::Duration;

use forest_protector_core::{
    Command, Difficulty, EnemyId, EnemyKind, Event, GameConfig, GameSpeed, GameState, GridCell,
    Path, PlacementError, TowerId, TowerKind, UpgradeError, WELCOME_BANNER,
};
use forest_protector_system_path_generation::PathGenerator;
use forest_protector_system_tower_targeting::TowerTargeting;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use enemy::EnemyStatus;

use enemy::Enemy;
use towers::{TickContext, TowerRegistry};

/// Represents the authoritative Forest Protector world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    generator: PathGenerator,
    rng: ChaCha8Rng,
    state: GameState,
    money: u32,
    lives: u32,
    score: u32,
    wave: u32,
    clock: Duration,
    last_wave_time: Duration,
    difficulty: Difficulty,
    game_speed: GameSpeed,
    paths: Vec<Path>,
    path_index: usize,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    next_enemy_id: u32,
    targeting: TowerTargeting,
}

impl World {
    /// Creates a world ready to play a session described by `config`.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let generator = PathGenerator::new(&config.field, config.path_pool_size);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let paths = generator.generate_all_paths(&mut rng);
        let difficulty = config.difficulty;
        let profile = difficulty.profile();
        Self {
            banner: WELCOME_BANNER,
            generator,
            rng,
            state: GameState::Playing,
            money: profile.starting_money,
            lives: profile.starting_lives,
            score: 0,
            wave: 0,
            clock: Duration::ZERO,
            last_wave_time: Duration::ZERO,
            difficulty,
            game_speed: GameSpeed::NORMAL,
            paths,
            path_index: 0,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            next_enemy_id: 0,
            targeting: TowerTargeting::new(),
            config,
        }
    }

    fn reset_session(&mut self) {
        self.paths = self.generator.generate_all_paths(&mut self.rng);
        self.difficulty = self.config.difficulty;
        let profile = self.difficulty.profile();
        self.state = GameState::Playing;
        self.money = profile.starting_money;
        self.lives = profile.starting_lives;
        self.score = 0;
        self.wave = 0;
        self.clock = Duration::ZERO;
        self.last_wave_time = Duration::ZERO;
        self.game_speed = GameSpeed::NORMAL;
        self.path_index = 0;
        self.enemies.clear();
        self.towers = TowerRegistry::new();
        self.next_enemy_id = 0;
    }

    fn active_path(&self) -> &Path {
        // The generator always yields at least the fixed shapes, so the index is valid.
        &self.paths[self.path_index % self.paths.len()]
    }

    fn transition(&mut self, to: GameState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }

        self.state = to;
        info!(?from, ?to, score = self.score, wave = self.wave, "game state changed");
        out_events.push(Event::GameStateChanged { from, to });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.state != GameState::Playing {
            return;
        }

        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        if self.clock > self.config.time_limit() {
            self.transition(GameState::GameOver, out_events);
            return;
        }

        let scaled_dt = self.game_speed.scale(dt).as_secs_f32();
        for enemy in &mut self.enemies {
            enemy.update(scaled_dt);
        }
        self.remove_departed_enemies(out_events);
        if self.lives == 0 {
            self.transition(GameState::GameOver, out_events);
            return;
        }

        let ctx = TickContext {
            now: self.clock,
            scaled_dt,
            game_speed: self.game_speed,
        };
        for tower in self.towers.iter_mut() {
            tower.update(
                &mut self.enemies,
                &mut self.targeting,
                ctx,
                &mut self.rng,
                out_events,
            );
        }

        if self.wave >= self.config.final_wave && self.enemies.is_empty() {
            self.score = self.score.saturating_add(self.config.victory_bonus);
            self.transition(GameState::Victory, out_events);
        }
    }

    fn remove_departed_enemies(&mut self, out_events: &mut Vec<Event>) {
        let (alive, departed): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut self.enemies)
            .into_iter()
            .partition(Enemy::is_alive);
        self.enemies = alive;

        for enemy in departed {
            match enemy.status {
                EnemyStatus::Escaped => {
                    self.lives = self.lives.saturating_sub(1);
                    out_events.push(Event::EnemyEscaped {
                        enemy: enemy.id,
                        lives_remaining: self.lives,
                    });
                }
                EnemyStatus::Killed => {
                    self.score = self.score.saturating_add(enemy.reward);
                    self.money = self.money.saturating_add(enemy.reward / 2);
                    out_events.push(Event::EnemyKilled {
                        enemy: enemy.id,
                        kind: enemy.kind,
                        reward: enemy.reward,
                    });
                }
                EnemyStatus::Spawning | EnemyStatus::Walking => {}
            }
        }
    }

    fn start_wave(&mut self, wave: u32, roster: Vec<EnemyKind>, out_events: &mut Vec<Event>) {
        if self.state != GameState::Playing || wave <= self.wave {
            debug!(wave, current = self.wave, state = ?self.state, "ignoring wave start");
            return;
        }

        self.wave = wave;
        self.last_wave_time = self.clock;
        if self.config.auto_change_path && wave > 1 {
            self.rotate_path(out_events);
        }

        debug!(wave, enemies = roster.len(), path = self.path_index, "wave started");
        out_events.push(Event::WaveStarted {
            wave,
            enemies: u32::try_from(roster.len()).unwrap_or(u32::MAX),
        });

        let profile = self.difficulty.profile();
        for kind in roster {
            let id = EnemyId::new(self.next_enemy_id);
            self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
            let spawn_delay = self.rng.gen::<f32>();
            let enemy = Enemy::spawn(id, kind, self.active_path().clone(), &profile, spawn_delay);
            self.enemies.push(enemy);
            out_events.push(Event::EnemySpawned { enemy: id, kind });
        }
    }

    fn rotate_path(&mut self, out_events: &mut Vec<Event>) {
        self.path_index = (self.path_index + 1) % self.paths.len();

        let mut refund = 0_u32;
        let mut towers_removed = 0_u32;
        if self.config.refund_enabled {
            for tower in self.towers.drain() {
                let returned = (tower.total_cost as f32 * self.config.refund_percentage).floor();
                refund = refund.saturating_add(returned as u32);
                towers_removed += 1;
            }
            self.money = self.money.saturating_add(refund);
        }

        debug!(index = self.path_index, refund, towers_removed, "path changed");
        out_events.push(Event::PathChanged {
            index: self.path_index,
            refund,
            towers_removed,
        });
    }

    fn placement_check(&self, kind: TowerKind, cell: GridCell) -> Result<Vec2, PlacementError> {
        if self.state.is_terminal() {
            return Err(PlacementError::SessionEnded);
        }

        let layout = &self.config.field;
        let position = layout.cell_center(cell);
        if !layout.contains(position) {
            return Err(PlacementError::OutsideField);
        }
        if !layout.is_clear_of_path(self.active_path(), position) {
            return Err(PlacementError::TooCloseToPath);
        }
        if self.towers.is_occupied(cell) {
            return Err(PlacementError::Occupied);
        }

        let required = kind.stats().cost;
        if self.money < required {
            return Err(PlacementError::InsufficientFunds {
                required,
                available: self.money,
            });
        }

        Ok(position)
    }

    fn place_tower(&mut self, kind: TowerKind, cell: GridCell, out_events: &mut Vec<Event>) {
        let position = match self.placement_check(kind, cell) {
            Ok(position) => position,
            Err(reason) => {
                debug!(?kind, ?cell, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
                return;
            }
        };

        self.money -= kind.stats().cost;
        let effectiveness = self.difficulty.profile().upgrade_effectiveness;
        let tower = self
            .towers
            .insert(kind, cell, position, effectiveness, self.clock);
        out_events.push(Event::TowerPlaced { tower, kind, cell });
    }

    fn upgrade_check(&self, tower: TowerId) -> Result<u32, UpgradeError> {
        if self.state.is_terminal() {
            return Err(UpgradeError::SessionEnded);
        }

        let Some(existing) = self.towers.get(tower) else {
            return Err(UpgradeError::UnknownTower);
        };
        if existing.is_max_level() {
            return Err(UpgradeError::MaxLevel);
        }

        let required = existing.kind.upgrade_cost();
        if self.money < required {
            return Err(UpgradeError::InsufficientFunds {
                required,
                available: self.money,
            });
        }

        Ok(required)
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let cost = match self.upgrade_check(tower) {
            Ok(cost) => cost,
            Err(reason) => {
                debug!(tower = tower.get(), %reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
                return;
            }
        };

        if let Some(existing) = self.towers.get_mut(tower) {
            if existing.upgrade() {
                self.money -= cost;
                out_events.push(Event::TowerUpgraded {
                    tower,
                    level: existing.level,
                    cost,
                });
            }
        }
    }

    fn adjust_difficulty(&mut self, delta: i32, out_events: &mut Vec<Event>) {
        let difficulty = self.difficulty.adjusted(delta);
        if difficulty == self.difficulty {
            return;
        }

        self.difficulty = difficulty;
        let effectiveness = difficulty.profile().upgrade_effectiveness;
        for tower in self.towers.iter_mut() {
            tower.set_upgrade_effectiveness(effectiveness);
        }
        debug!(difficulty = difficulty.name(), "difficulty changed");
        out_events.push(Event::DifficultyChanged { difficulty });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::StartWave { wave, roster } => world.start_wave(wave, roster, out_events),
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::ChangePath => {
            if !world.state.is_terminal() {
                world.rotate_path(out_events);
            }
        }
        Command::TogglePause => match world.state {
            GameState::Playing => world.transition(GameState::Paused, out_events),
            GameState::Paused => world.transition(GameState::Playing, out_events),
            GameState::GameOver | GameState::Victory => {}
        },
        Command::AdjustGameSpeed { steps } => {
            if world.state.is_terminal() {
                return;
            }
            let speed = world.game_speed.adjusted(steps);
            if speed != world.game_speed {
                world.game_speed = speed;
                out_events.push(Event::GameSpeedChanged { speed });
            }
        }
        Command::AdjustDifficulty { delta } => {
            if !world.state.is_terminal() {
                world.adjust_difficulty(delta, out_events);
            }
        }
        Command::Restart => {
            if !world.state.is_terminal() {
                return;
            }
            let from = world.state;
            world.reset_session();
            info!(seed = world.config.seed, "session restarted");
            out_events.push(Event::GameStateChanged {
                from,
                to: GameState::Playing,
            });
            out_events.push(Event::SessionRestarted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use forest_protector_core::{
        Difficulty, EnemyId, EnemyKind, FieldLayout, GameConfig, GameSpeed, GameState, GridCell,
        Path, PlacementError, TowerId, TowerKind, WaveStatus, TOWER_PICK_RADIUS,
    };
    use glam::Vec2;

    use super::{EnemyStatus, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the session was created from.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Playable field dimensions.
    #[must_use]
    pub fn layout(world: &World) -> &FieldLayout {
        &world.config.field
    }

    /// Current top-level game state.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.state
    }

    /// Money available to the player.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Lives left before the session is lost.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Score accumulated in the session.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of the most recently started wave, zero before the first.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Wave whose clearance wins the session.
    #[must_use]
    pub fn final_wave(world: &World) -> u32 {
        world.config.final_wave
    }

    /// Play time left before the time limit is reached.
    #[must_use]
    pub fn remaining_time(world: &World) -> Duration {
        world.config.time_limit().saturating_sub(world.clock)
    }

    /// Play time elapsed in the session.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Current game speed.
    #[must_use]
    pub fn game_speed(world: &World) -> GameSpeed {
        world.game_speed
    }

    /// Current difficulty.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Path new enemies spawn on.
    #[must_use]
    pub fn active_path(world: &World) -> &Path {
        world.active_path()
    }

    /// Index of the active path within the pool.
    #[must_use]
    pub fn path_index(world: &World) -> usize {
        world.path_index
    }

    /// Number of paths in the rotation pool.
    #[must_use]
    pub fn path_count(world: &World) -> usize {
        world.paths.len()
    }

    /// Number of enemies the next wave will contain.
    #[must_use]
    pub fn next_wave_size(world: &World) -> u32 {
        world.config.wave_size(world.wave.saturating_add(1))
    }

    /// Summary consumed by the wave scheduler.
    #[must_use]
    pub fn wave_status(world: &World) -> WaveStatus {
        WaveStatus {
            state: world.state,
            wave: world.wave,
            final_wave: world.config.final_wave,
            active_enemies: world.enemies.len(),
            now: world.clock,
            last_wave_time: world.last_wave_time,
            game_speed: world.game_speed,
        }
    }

    /// Captures the enemies currently on the field, ordered by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                path_index: enemy.path_index,
                health: enemy.health.max(0.0),
                max_health: enemy.max_health,
                status: enemy.status,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures the towers on the field, ordered by identifier.
    #[must_use]
    pub fn towers(world: &World) -> Vec<TowerSnapshot> {
        world
            .towers
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                kind: tower.kind,
                cell: tower.cell,
                position: tower.position,
                level: tower.level,
                max_level: tower.max_level(),
                damage: tower.damage,
                range: tower.range,
                fire_rate: tower.fire_rate,
                accuracy: tower.accuracy,
                total_cost: tower.total_cost,
            })
            .collect()
    }

    /// Captures every projectile in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .towers
            .iter()
            .flat_map(|tower| {
                tower.projectiles.iter().map(move |projectile| ProjectileSnapshot {
                    tower: tower.id,
                    target: projectile.target,
                    position: projectile.position,
                })
            })
            .collect()
    }

    /// Tower whose centre lies within the pick radius of `point`, if any.
    #[must_use]
    pub fn tower_at_point(world: &World, point: Vec2) -> Option<TowerId> {
        world
            .towers
            .iter()
            .find(|tower| tower.position.distance(point) < TOWER_PICK_RADIUS)
            .map(|tower| tower.id)
    }

    /// Validates a prospective placement without mutating the world.
    ///
    /// Returns the centre the tower would occupy on success.
    pub fn placement_check(
        world: &World,
        kind: TowerKind,
        cell: GridCell,
    ) -> Result<Vec2, PlacementError> {
        world.placement_check(kind, cell)
    }

    /// Read-only snapshot describing an enemy.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier assigned to the enemy.
        pub id: EnemyId,
        /// Kind of the enemy.
        pub kind: EnemyKind,
        /// Position in world units.
        pub position: Vec2,
        /// Index of the waypoint the enemy last reached.
        pub path_index: usize,
        /// Remaining health, never negative.
        pub health: f32,
        /// Health at spawn.
        pub max_health: f32,
        /// Lifecycle status.
        pub status: EnemyStatus,
    }

    impl EnemySnapshot {
        /// Remaining health as a fraction of the spawn health.
        #[must_use]
        pub fn health_fraction(&self) -> f32 {
            if self.max_health > 0.0 {
                (self.health / self.max_health).clamp(0.0, 1.0)
            } else {
                0.0
            }
        }
    }

    /// Read-only snapshot describing a tower.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct TowerSnapshot {
        /// Identifier assigned to the tower.
        pub id: TowerId,
        /// Kind of the tower.
        pub kind: TowerKind,
        /// Grid cell the tower occupies.
        pub cell: GridCell,
        /// Centre of the tower in world units.
        pub position: Vec2,
        /// Current level.
        pub level: u32,
        /// Highest level the tower can reach.
        pub max_level: u32,
        /// Damage dealt per projectile.
        pub damage: f32,
        /// Targeting range in world units.
        pub range: f32,
        /// Shots per second at normal speed.
        pub fire_rate: f32,
        /// Probability that an attempted shot launches a projectile.
        pub accuracy: f32,
        /// Money invested in the tower.
        pub total_cost: u32,
    }

    /// Read-only snapshot describing a projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Tower that launched the projectile.
        pub tower: TowerId,
        /// Enemy the projectile is tracking.
        pub target: EnemyId,
        /// Position in world units.
        pub position: Vec2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(config: GameConfig) -> World {
        World::new(config)
    }

    fn open_cell(world: &World) -> GridCell {
        let layout = query::layout(world);
        let columns = (layout.width / layout.cell_size) as u32;
        let rows = (layout.height / layout.cell_size) as u32;
        (0..rows)
            .flat_map(|row| (0..columns).map(move |column| GridCell::new(column, row)))
            .find(|cell| query::placement_check(world, TowerKind::Archer, *cell).is_ok())
            .expect("field has room for a tower")
    }

    #[test]
    fn new_world_starts_playing_with_profile_resources() {
        let world = world_with(GameConfig {
            difficulty: Difficulty::EASY,
            ..GameConfig::default()
        });

        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::game_state(&world), GameState::Playing);
        assert_eq!(query::money(&world), 200);
        assert_eq!(query::lives(&world), 4);
        assert_eq!(query::wave(&world), 0);
        assert_eq!(query::path_count(&world), 50);
        assert_eq!(query::next_wave_size(&world), 5);
    }

    #[test]
    fn tick_advances_clock_only_while_playing() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: Duration::from_secs(1) }, &mut events);
        apply(&mut world, Command::TogglePause, &mut events);
        apply(&mut world, Command::Tick { dt: Duration::from_secs(5) }, &mut events);

        assert_eq!(query::elapsed(&world), Duration::from_secs(1));
        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { dt: Duration::from_secs(1) },
                Event::GameStateChanged {
                    from: GameState::Playing,
                    to: GameState::Paused,
                },
            ]
        );
    }

    #[test]
    fn exceeding_the_time_limit_ends_the_session() {
        let mut world = world_with(GameConfig {
            time_limit_secs: 2.0,
            ..GameConfig::default()
        });
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: Duration::from_secs(2) }, &mut events);
        assert_eq!(query::game_state(&world), GameState::Playing);

        apply(&mut world, Command::Tick { dt: Duration::from_millis(10) }, &mut events);
        assert_eq!(query::game_state(&world), GameState::GameOver);
        assert_eq!(query::remaining_time(&world), Duration::ZERO);
    }

    #[test]
    fn stale_wave_numbers_are_ignored() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StartWave {
                wave: 1,
                roster: vec![EnemyKind::Goblin; 2],
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::StartWave {
                wave: 1,
                roster: vec![EnemyKind::Goblin; 2],
            },
            &mut events,
        );

        assert_eq!(query::enemies(&world).len(), 2);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::WaveStarted { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn automatic_rotation_happens_from_the_second_wave() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StartWave {
                wave: 1,
                roster: vec![EnemyKind::Goblin],
            },
            &mut events,
        );
        assert_eq!(query::path_index(&world), 0);

        apply(
            &mut world,
            Command::StartWave {
                wave: 2,
                roster: vec![EnemyKind::Goblin],
            },
            &mut events,
        );
        assert_eq!(query::path_index(&world), 1);

        let path_changed = events
            .iter()
            .position(|event| matches!(event, Event::PathChanged { .. }))
            .expect("path changed");
        let second_wave = events
            .iter()
            .position(|event| matches!(event, Event::WaveStarted { wave: 2, .. }))
            .expect("second wave started");
        assert!(path_changed < second_wave);
    }

    #[test]
    fn placing_a_tower_debits_its_cost() {
        let mut world = World::default();
        let mut events = Vec::new();
        let cell = open_cell(&world);

        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Archer,
                cell,
            },
            &mut events,
        );

        assert_eq!(query::money(&world), 150 - 35);
        let towers = query::towers(&world);
        assert_eq!(towers.len(), 1);
        assert_eq!(towers[0].position, query::layout(&world).cell_center(cell));
        assert_eq!(
            query::tower_at_point(&world, towers[0].position + Vec2::new(5.0, 5.0)),
            Some(towers[0].id)
        );
        assert_eq!(
            events,
            vec![Event::TowerPlaced {
                tower: towers[0].id,
                kind: TowerKind::Archer,
                cell,
            }]
        );
    }

    #[test]
    fn upgrades_charge_half_the_base_cost() {
        let mut world = World::default();
        let mut events = Vec::new();
        let cell = open_cell(&world);
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Magic,
                cell,
            },
            &mut events,
        );
        let tower = query::towers(&world)[0].id;

        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);

        assert_eq!(query::money(&world), 150 - 90 - 45);
        let snapshot = query::towers(&world)[0];
        assert_eq!(snapshot.level, 2);
        assert_eq!(snapshot.total_cost, 90 + 67);
        assert_eq!(
            events.last(),
            Some(&Event::TowerUpgradeRejected {
                tower,
                reason: UpgradeError::MaxLevel,
            })
        );
    }

    #[test]
    fn unknown_towers_cannot_be_upgraded() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::UpgradeTower {
                tower: TowerId::new(7),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TowerUpgradeRejected {
                tower: TowerId::new(7),
                reason: UpgradeError::UnknownTower,
            }]
        );
        assert_eq!(query::money(&world), 150);
    }

    #[test]
    fn game_speed_changes_are_clamped_and_reported_once() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(&mut world, Command::AdjustGameSpeed { steps: 15 }, &mut events);
        apply(&mut world, Command::AdjustGameSpeed { steps: 1 }, &mut events);

        assert_eq!(query::game_speed(&world), GameSpeed::MAX);
        assert_eq!(
            events,
            vec![Event::GameSpeedChanged {
                speed: GameSpeed::MAX,
            }]
        );
    }

    #[test]
    fn difficulty_changes_update_existing_towers() {
        let mut world = World::default();
        let mut events = Vec::new();
        let cell = open_cell(&world);
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Cannon,
                cell,
            },
            &mut events,
        );
        apply(&mut world, Command::AdjustDifficulty { delta: 1 }, &mut events);
        let tower = query::towers(&world)[0].id;

        apply(&mut world, Command::UpgradeTower { tower }, &mut events);

        assert_eq!(query::difficulty(&world), Difficulty::HARD);
        let snapshot = query::towers(&world)[0];
        assert!((snapshot.damage - (40.0 + 40.0 * 0.15 * 0.8)).abs() < 1e-4);
    }

    #[test]
    fn restart_is_only_accepted_after_the_session_ends() {
        let mut world = world_with(GameConfig {
            time_limit_secs: 1.0,
            ..GameConfig::default()
        });
        let mut events = Vec::new();

        apply(&mut world, Command::Restart, &mut events);
        assert!(events.is_empty());

        apply(&mut world, Command::AdjustDifficulty { delta: 2 }, &mut events);
        apply(&mut world, Command::Tick { dt: Duration::from_secs(2) }, &mut events);
        assert_eq!(query::game_state(&world), GameState::GameOver);

        events.clear();
        apply(&mut world, Command::Restart, &mut events);

        assert_eq!(query::game_state(&world), GameState::Playing);
        assert_eq!(query::difficulty(&world), Difficulty::NORMAL);
        assert_eq!(query::elapsed(&world), Duration::ZERO);
        assert_eq!(query::money(&world), 150);
        assert_eq!(events.last(), Some(&Event::SessionRestarted));
    }
}
