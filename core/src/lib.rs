#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Forest Protector engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values
//! describing what happened. Tower, enemy and difficulty tuning lives here as
//! immutable lookup tables on closed enums.

mod config;
mod geometry;
mod stats;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ConfigError, GameConfig, WaveSizing, FIXED_PATH_COUNT};
pub use geometry::{distance_point_to_segment, FieldLayout, GridCell, Path, PathError};
pub use stats::{
    AimStrategy, Difficulty, DifficultyProfile, EnemyKind, EnemyStats, TowerKind, TowerStats,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Forest Protector.";

/// Radius around a tower centre that selects the tower when clicked.
pub const TOWER_PICK_RADIUS: f32 = 20.0;

/// Top-level state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Simulation advances every tick.
    Playing,
    /// Simulation is frozen until play resumes.
    Paused,
    /// Lives or time ran out.
    GameOver,
    /// The final wave was cleared.
    Victory,
}

impl GameState {
    /// Returns `true` once the session has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, GameState::GameOver | GameState::Victory)
    }
}

/// Multiplier applied to simulated time, stored in tenths to avoid drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameSpeed(u8);

impl GameSpeed {
    /// Slowest supported speed (0.1x).
    pub const MIN: Self = Self(1);
    /// Normal speed (1.0x).
    pub const NORMAL: Self = Self(10);
    /// Fastest supported speed (2.0x).
    pub const MAX: Self = Self(20);

    /// Creates a speed from tenths of the normal rate, clamped to the supported range.
    #[must_use]
    pub const fn from_tenths(tenths: u8) -> Self {
        if tenths < Self::MIN.0 {
            Self::MIN
        } else if tenths > Self::MAX.0 {
            Self::MAX
        } else {
            Self(tenths)
        }
    }

    /// Speed expressed in tenths of the normal rate.
    #[must_use]
    pub const fn tenths(self) -> u8 {
        self.0
    }

    /// Speed expressed as a floating point multiplier.
    #[must_use]
    pub fn multiplier(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Returns the speed shifted by `steps` tenths, clamped to the supported range.
    #[must_use]
    pub fn adjusted(self, steps: i32) -> Self {
        let tenths = (i32::from(self.0) + steps).clamp(i32::from(Self::MIN.0), i32::from(Self::MAX.0));
        Self::from_tenths(u8::try_from(tenths).unwrap_or(Self::NORMAL.0))
    }

    /// Scales a wall-clock duration into simulated time.
    #[must_use]
    pub fn scale(self, dt: Duration) -> Duration {
        dt * u32::from(self.0) / 10
    }
}

impl Default for GameSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the play clock by the provided delta; ignored unless playing.
    Tick {
        /// Duration that elapsed since the previous tick, before game speed scaling.
        dt: Duration,
    },
    /// Starts the provided wave, spawning its roster on the active path.
    StartWave {
        /// One-based number of the wave.
        wave: u32,
        /// Enemy kinds in spawn order.
        roster: Vec<EnemyKind>,
    },
    /// Requests placement of a tower centred on the provided grid cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: GridCell,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Rotates to the next path in the pool.
    ChangePath,
    /// Toggles between playing and paused.
    TogglePause,
    /// Shifts the game speed by whole tenths.
    AdjustGameSpeed {
        /// Signed number of 0.1x steps.
        steps: i32,
    },
    /// Shifts the difficulty by whole levels.
    AdjustDifficulty {
        /// Signed number of levels.
        delta: i32,
    },
    /// Starts a fresh session; only honoured once the current session has ended.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the play clock advanced.
    TimeAdvanced {
        /// Play time that elapsed in the tick; game speed is applied by the simulation.
        dt: Duration,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
        /// Number of enemies spawned for the wave.
        enemies: u32,
    },
    /// Announces that the active path changed.
    PathChanged {
        /// Index of the new path in the pool.
        index: usize,
        /// Money returned for the removed towers.
        refund: u32,
        /// Number of towers removed from the field.
        towers_removed: u32,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy spawned.
        kind: EnemyKind,
    },
    /// Reports that an enemy was killed by a tower.
    EnemyKilled {
        /// Identifier of the killed enemy.
        enemy: EnemyId,
        /// Kind of the killed enemy.
        kind: EnemyKind,
        /// Score awarded; half of it is paid out as money.
        reward: u32,
    },
    /// Reports that an enemy reached the end of its path.
    EnemyEscaped {
        /// Identifier of the escaped enemy.
        enemy: EnemyId,
        /// Lives left after the escape.
        lives_remaining: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: GridCell,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower that was requested.
        kind: TowerKind,
        /// Cell that was requested.
        cell: GridCell,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the tower.
        level: u32,
        /// Money charged for the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier supplied with the request.
        tower: TowerId,
        /// Reason for the rejection.
        reason: UpgradeError,
    },
    /// Reports that a tower launched a projectile.
    ProjectileFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile is tracking.
        target: EnemyId,
    },
    /// Reports that a projectile reached its target and dealt damage.
    ProjectileHit {
        /// Tower that launched the projectile.
        tower: TowerId,
        /// Enemy that was struck.
        target: EnemyId,
        /// Damage dealt by the impact.
        damage: f32,
    },
    /// Reports that a tower's accuracy roll failed.
    ShotMissed {
        /// Tower that attempted the shot.
        tower: TowerId,
        /// Enemy that was aimed at.
        target: EnemyId,
    },
    /// Announces a transition between game states.
    GameStateChanged {
        /// State before the transition.
        from: GameState,
        /// State after the transition.
        to: GameState,
    },
    /// Announces a new game speed.
    GameSpeedChanged {
        /// Speed now in effect.
        speed: GameSpeed,
    },
    /// Announces a new difficulty.
    DifficultyChanged {
        /// Difficulty now in effect.
        difficulty: Difficulty,
    },
    /// Announces that a fresh session replaced the previous one.
    SessionRestarted,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a tower placement can be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The requested cell lies outside the playable field.
    #[error("cell lies outside the playable field")]
    OutsideField,
    /// The requested cell is too close to the path.
    #[error("cell is too close to the path")]
    TooCloseToPath,
    /// Another tower already occupies the cell.
    #[error("cell is already occupied by a tower")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("tower costs {required} but only {available} is available")]
    InsufficientFunds {
        /// Price of the tower.
        required: u32,
        /// Money held by the player.
        available: u32,
    },
    /// The session is not accepting build actions.
    #[error("session has ended")]
    SessionEnded,
}

/// Reasons a tower upgrade can be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum UpgradeError {
    /// No tower exists with the supplied identifier.
    #[error("tower does not exist")]
    UnknownTower,
    /// The tower already reached its highest level.
    #[error("tower is already at its maximum level")]
    MaxLevel,
    /// The player cannot afford the upgrade.
    #[error("upgrade costs {required} but only {available} is available")]
    InsufficientFunds {
        /// Price of the upgrade.
        required: u32,
        /// Money held by the player.
        available: u32,
    },
    /// The session is not accepting build actions.
    #[error("session has ended")]
    SessionEnded,
}

/// Read-only summary of wave progress consumed by the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveStatus {
    /// Current game state.
    pub state: GameState,
    /// Number of the most recently started wave, zero before the first.
    pub wave: u32,
    /// Wave whose clearance wins the session.
    pub final_wave: u32,
    /// Enemies still on the field.
    pub active_enemies: usize,
    /// Play time elapsed in the session.
    pub now: Duration,
    /// Play time at which the most recent wave started.
    pub last_wave_time: Duration,
    /// Current game speed.
    pub game_speed: GameSpeed,
}

/// Discrete player intents decoded from keyboard shortcuts or panel buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// Selects the tower kind placed by the next click.
    SelectTower(TowerKind),
    /// Toggles pause.
    TogglePause,
    /// Rotates to the next path.
    ChangePath,
    /// Raises the game speed by one step.
    SpeedUp,
    /// Lowers the game speed by one step.
    SlowDown,
    /// Raises the difficulty by one level.
    DifficultyUp,
    /// Lowers the difficulty by one level.
    DifficultyDown,
    /// Starts a new session after the current one ended.
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tower_id_round_trips_through_bincode() {
        let id = TowerId::new(42);
        let bytes = bincode::serialize(&id).expect("serialize tower id");
        let decoded: TowerId = bincode::deserialize(&bytes).expect("deserialize tower id");
        assert_eq!(decoded, id);
    }

    #[test]
    fn game_config_round_trips_through_bincode() {
        let config = GameConfig {
            difficulty: Difficulty::INSANE,
            seed: 7,
            ..GameConfig::default()
        };
        let bytes = bincode::serialize(&config).expect("serialize config");
        let decoded: GameConfig = bincode::deserialize(&bytes).expect("deserialize config");
        assert_eq!(decoded, config);
    }

    #[test]
    fn game_speed_is_clamped_to_supported_range() {
        assert_eq!(GameSpeed::NORMAL.adjusted(15), GameSpeed::MAX);
        assert_eq!(GameSpeed::NORMAL.adjusted(-15), GameSpeed::MIN);
        assert_eq!(GameSpeed::NORMAL.adjusted(3).tenths(), 13);
        assert_eq!(GameSpeed::from_tenths(0), GameSpeed::MIN);
    }

    #[test]
    fn game_speed_scales_durations_exactly() {
        let dt = Duration::from_millis(100);

        assert_eq!(GameSpeed::from_tenths(5).scale(dt), Duration::from_millis(50));
        assert_eq!(GameSpeed::MAX.scale(dt), Duration::from_millis(200));
        assert_eq!(GameSpeed::NORMAL.scale(dt), dt);
    }

    #[test]
    fn terminal_states_are_reported() {
        assert!(!GameState::Playing.is_terminal());
        assert!(!GameState::Paused.is_terminal());
        assert!(GameState::GameOver.is_terminal());
        assert!(GameState::Victory.is_terminal());
    }
}
