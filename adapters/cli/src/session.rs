//! Frame driver that composes the world with the builder and spawning systems.

use std::{collections::BTreeMap, mem, time::Duration};

use forest_protector_core::{Command, Event, GameConfig, GameState, TowerId, TowerKind};
use forest_protector_rendering::{
    EnemyPresentation, FrameInput, Hud, PreviewPresentation, ProjectilePresentation, Scene,
    TowerPresentation,
};
use forest_protector_system_builder::{Builder, BuilderInput, PlacementPreview};
use forest_protector_system_spawning::{Config as SpawningConfig, Spawning};
use forest_protector_world::{self as world, query, World};

/// Longest simulated step taken for a single frame.
pub(crate) const MAX_FRAME_STEP: Duration = Duration::from_millis(250);

/// Running totals reported when a session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) waves_started: u32,
    pub(crate) enemies_spawned: u32,
    pub(crate) enemies_killed: u32,
    pub(crate) enemies_escaped: u32,
    pub(crate) towers_placed: u32,
    pub(crate) upgrades: u32,
    pub(crate) shots_fired: u32,
    pub(crate) shots_missed: u32,
    pub(crate) hits: u32,
}

impl SessionSummary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::WaveStarted { .. } => self.waves_started += 1,
            Event::EnemySpawned { .. } => self.enemies_spawned += 1,
            Event::EnemyKilled { .. } => self.enemies_killed += 1,
            Event::EnemyEscaped { .. } => self.enemies_escaped += 1,
            Event::TowerPlaced { .. } => self.towers_placed += 1,
            Event::TowerUpgraded { .. } => self.upgrades += 1,
            Event::ProjectileFired { .. } => self.shots_fired += 1,
            Event::ShotMissed { .. } => self.shots_missed += 1,
            Event::ProjectileHit { .. } => self.hits += 1,
            Event::SessionRestarted => *self = Self::default(),
            _ => {}
        }
    }
}

/// One game session driven frame by frame.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    builder: Builder,
    spawning: Spawning,
    events: Vec<Event>,
    cursor: Option<glam::Vec2>,
    preview: Option<PlacementPreview>,
    summary: SessionSummary,
}

impl Session {
    /// Starts a session from a validated configuration.
    pub(crate) fn new(config: GameConfig) -> Self {
        let builder = Builder::new(config.field);
        let spawning = Spawning::new(SpawningConfig::from_game_config(&config));
        Self {
            world: World::new(config),
            builder,
            spawning,
            events: Vec::new(),
            cursor: None,
            preview: None,
            summary: SessionSummary::default(),
        }
    }

    /// World driven by the session.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Totals gathered since the session started or was last restarted.
    pub(crate) fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Advances the session by one frame.
    ///
    /// Player input is turned into commands first, then the clock ticks and
    /// finally the wave scheduler reacts to the updated world.
    pub(crate) fn advance(&mut self, dt: Duration, input: &FrameInput) {
        let previous = mem::take(&mut self.events);
        let builder_input = BuilderInput {
            cursor: input.cursor,
            click: input.click,
            actions: input.actions.clone(),
        };

        let mut commands = Vec::new();
        let world = &self.world;
        self.builder.handle(
            &previous,
            &builder_input,
            |point| query::tower_at_point(world, point),
            &mut commands,
        );
        commands.push(Command::Tick {
            dt: dt.min(MAX_FRAME_STEP),
        });
        self.execute(commands);

        let mut commands = Vec::new();
        self.spawning
            .handle(&query::wave_status(&self.world), &mut commands);
        self.execute(commands);

        self.cursor = input.cursor;
        let world = &self.world;
        self.preview = match input.cursor {
            Some(point) if query::tower_at_point(world, point).is_none() => {
                self.builder.preview(Some(point), |kind, cell| {
                    query::placement_check(world, kind, cell)
                })
            }
            _ => None,
        };
    }

    fn execute(&mut self, commands: Vec<Command>) {
        let start = self.events.len();
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }

        for event in &self.events[start..] {
            self.summary.record(event);
            if let Event::GameStateChanged { to, .. } = event {
                if to.is_terminal() {
                    self.log_summary(*to);
                }
            }
        }
    }

    fn log_summary(&self, outcome: GameState) {
        let summary = self.summary;
        tracing::info!(
            ?outcome,
            score = query::score(&self.world),
            wave = query::wave(&self.world),
            waves_started = summary.waves_started,
            spawned = summary.enemies_spawned,
            killed = summary.enemies_killed,
            escaped = summary.enemies_escaped,
            towers = summary.towers_placed,
            upgrades = summary.upgrades,
            shots = summary.shots_fired,
            misses = summary.shots_missed,
            hits = summary.hits,
            "session finished"
        );
    }

    /// Refreshes `scene` from the current world state.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let world = &self.world;
        let hovered = self
            .cursor
            .and_then(|point| query::tower_at_point(world, point));

        scene.layout = *query::layout(world);
        scene.game_state = query::game_state(world);

        scene.path.clear();
        scene
            .path
            .extend_from_slice(query::active_path(world).points());

        let towers = query::towers(world);
        let kinds: BTreeMap<TowerId, TowerKind> =
            towers.iter().map(|tower| (tower.id, tower.kind)).collect();

        scene.towers.clear();
        scene
            .towers
            .extend(towers.iter().map(|tower| TowerPresentation {
                id: tower.id,
                kind: tower.kind,
                position: tower.position,
                level: tower.level,
                max_level: tower.max_level,
                range: tower.range,
                highlighted: hovered == Some(tower.id),
            }));

        scene.enemies.clear();
        scene.enemies.extend(
            query::enemies(world)
                .into_iter()
                .filter(|enemy| enemy.status.is_alive())
                .map(|enemy| EnemyPresentation {
                    kind: enemy.kind,
                    position: enemy.position,
                    health_fraction: enemy.health_fraction(),
                }),
        );

        scene.projectiles.clear();
        scene
            .projectiles
            .extend(query::projectiles(world).into_iter().filter_map(|projectile| {
                kinds
                    .get(&projectile.tower)
                    .map(|kind| ProjectilePresentation {
                        kind: *kind,
                        position: projectile.position,
                    })
            }));

        scene.preview = self.preview.map(|preview| PreviewPresentation {
            kind: preview.kind,
            position: preview.position,
            rejection: preview.rejection,
        });

        let wave = query::wave(world);
        let final_wave = query::final_wave(world);
        scene.hud = Hud {
            score: query::score(world),
            money: query::money(world),
            lives: query::lives(world),
            wave,
            final_wave,
            remaining: query::remaining_time(world),
            path_index: query::path_index(world),
            path_count: query::path_count(world),
            next_wave_size: (wave < final_wave).then(|| query::next_wave_size(world)),
            game_speed: query::game_speed(world),
            difficulty: query::difficulty(world),
            selected_tower: self.builder.selected(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forest_protector_core::{GridCell, PlayerAction};
    use glam::Vec2;

    const FRAME: Duration = Duration::from_millis(16);

    fn open_cell(session: &Session) -> GridCell {
        let world = session.world();
        let layout = query::layout(world);
        let columns = (layout.width / layout.cell_size) as u32;
        let rows = (layout.height / layout.cell_size) as u32;
        (0..rows)
            .flat_map(|row| (0..columns).map(move |column| GridCell::new(column, row)))
            .find(|cell| query::placement_check(world, TowerKind::Magic, *cell).is_ok())
            .expect("field has room for a tower")
    }

    fn click(point: Vec2) -> FrameInput {
        FrameInput {
            cursor: Some(point),
            click: true,
            ..FrameInput::default()
        }
    }

    fn scene_for(session: &Session) -> Scene {
        let mut scene = Scene::new(*query::layout(session.world())).expect("valid layout");
        session.populate_scene(&mut scene);
        scene
    }

    #[test]
    fn clicking_an_open_cell_builds_the_selected_tower() {
        let mut session = Session::new(GameConfig::default());
        let cell = open_cell(&session);
        let point = query::layout(session.world()).cell_center(cell);

        session.advance(
            FRAME,
            &FrameInput {
                actions: vec![PlayerAction::SelectTower(TowerKind::Magic)],
                ..click(point)
            },
        );

        let towers = query::towers(session.world());
        assert_eq!(towers.len(), 1);
        assert_eq!(towers[0].kind, TowerKind::Magic);
        assert_eq!(query::money(session.world()), 150 - 90);
        assert_eq!(session.summary().towers_placed, 1);

        let scene = scene_for(&session);
        assert_eq!(scene.towers.len(), 1);
        assert!(scene.towers[0].highlighted);
        assert!(scene.preview.is_none());
        assert_eq!(scene.hud.selected_tower, TowerKind::Magic);
    }

    #[test]
    fn clicking_a_tower_upgrades_it() {
        let mut session = Session::new(GameConfig::default());
        let cell = open_cell(&session);
        let point = query::layout(session.world()).cell_center(cell);

        session.advance(FRAME, &click(point));
        session.advance(FRAME, &click(point + Vec2::new(3.0, -4.0)));

        let towers = query::towers(session.world());
        assert_eq!(towers.len(), 1);
        assert_eq!(towers[0].level, 2);
        assert_eq!(session.summary().upgrades, 1);
    }

    #[test]
    fn hovering_an_open_cell_previews_the_placement() {
        let mut session = Session::new(GameConfig::default());
        let cell = open_cell(&session);
        let point = query::layout(session.world()).cell_center(cell);

        session.advance(
            FRAME,
            &FrameInput {
                cursor: Some(point),
                ..FrameInput::default()
            },
        );

        let preview = scene_for(&session).preview.expect("cursor is on the field");
        assert_eq!(preview.position, point);
        assert_eq!(preview.rejection, None);
        assert_eq!(preview.kind, TowerKind::Archer);
    }

    #[test]
    fn waves_populate_the_scene() {
        let mut session = Session::new(GameConfig::default());
        let idle = FrameInput::default();

        for _ in 0..(3_200 / 16) {
            session.advance(FRAME, &idle);
        }

        let scene = scene_for(&session);
        assert_eq!(scene.hud.wave, 1);
        assert_eq!(scene.hud.next_wave_size, Some(7));
        assert_eq!(scene.enemies.len(), 5);
        assert_eq!(session.summary().waves_started, 1);
        assert_eq!(session.summary().enemies_spawned, 5);
        assert_eq!(scene.path, query::active_path(session.world()).points());
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut session = Session::new(GameConfig::default());

        session.advance(Duration::from_secs(10), &FrameInput::default());

        assert_eq!(query::elapsed(session.world()), MAX_FRAME_STEP);
    }

    #[test]
    fn panel_actions_reach_the_world() {
        let mut session = Session::new(GameConfig::default());

        session.advance(
            FRAME,
            &FrameInput {
                actions: vec![PlayerAction::ChangePath, PlayerAction::SpeedUp],
                ..FrameInput::default()
            },
        );

        let scene = scene_for(&session);
        assert_eq!(scene.hud.path_index, 1);
        assert!(scene.hud.game_speed.multiplier() > 1.0);
    }

    #[test]
    fn summary_tallies_shot_outcomes() {
        let mut summary = SessionSummary::default();
        let tower = TowerId::new(0);
        let target = forest_protector_core::EnemyId::new(3);

        for event in [
            Event::ProjectileFired { tower, target },
            Event::ProjectileFired { tower, target },
            Event::ShotMissed { tower, target },
            Event::ProjectileHit {
                tower,
                target,
                damage: 20.0,
            },
        ] {
            summary.record(&event);
        }

        assert_eq!(summary.shots_fired, 2);
        assert_eq!(summary.shots_missed, 1);
        assert_eq!(summary.hits, 1);

        summary.record(&Event::SessionRestarted);
        assert_eq!(summary, SessionSummary::default());
    }

    #[test]
    fn restart_after_game_over_resets_the_session() {
        let mut session = Session::new(GameConfig {
            difficulty: forest_protector_core::Difficulty::INSANE,
            wave_delay_secs: 0.1,
            ..GameConfig::default()
        });
        let idle = FrameInput::default();
        for _ in 0..5_000 {
            session.advance(FRAME, &idle);
            if query::game_state(session.world()).is_terminal() {
                break;
            }
        }
        assert_eq!(query::game_state(session.world()), GameState::GameOver);
        assert!(session.summary().enemies_escaped >= 1);

        session.advance(
            FRAME,
            &FrameInput {
                actions: vec![PlayerAction::Restart],
                ..FrameInput::default()
            },
        );

        assert_eq!(query::game_state(session.world()), GameState::Playing);
        assert_eq!(query::wave(session.world()), 0);
        assert_eq!(session.summary(), SessionSummary::default());
    }
}
