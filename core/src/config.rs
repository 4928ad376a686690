use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Difficulty, FieldLayout};

/// Number of hand-shaped paths at the front of every path pool.
pub const FIXED_PATH_COUNT: usize = 5;

/// Tunable parameters of a Forest Protector session.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playable field and side panel dimensions.
    pub field: FieldLayout,
    /// Seconds that must pass after a wave starts before the next may begin.
    pub wave_delay_secs: f32,
    /// Wave whose clearance wins the session.
    pub final_wave: u32,
    /// Score awarded on victory.
    pub victory_bonus: u32,
    /// Simulated seconds available before the session is lost.
    pub time_limit_secs: f32,
    /// Enemies in the first wave.
    pub base_enemies: u32,
    /// Additional enemies per subsequent wave.
    pub enemy_increment: u32,
    /// Upper bound on enemies in a single wave.
    pub max_enemies_per_wave: u32,
    /// Number of paths generated for the rotation pool.
    pub path_pool_size: usize,
    /// Whether towers are refunded when the path changes.
    pub refund_enabled: bool,
    /// Fraction of a tower's invested money returned on refund.
    pub refund_percentage: f32,
    /// Whether the path rotates at the start of every wave after the first.
    pub auto_change_path: bool,
    /// Difficulty a new session starts with.
    pub difficulty: Difficulty,
    /// Seed for every random decision taken by the simulation.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field: FieldLayout::default(),
            wave_delay_secs: 3.0,
            final_wave: 10,
            victory_bonus: 500,
            time_limit_secs: 300.0,
            base_enemies: 5,
            enemy_increment: 2,
            max_enemies_per_wave: 25,
            path_pool_size: 50,
            refund_enabled: true,
            refund_percentage: 0.75,
            auto_change_path: true,
            difficulty: Difficulty::NORMAL,
            seed: 0x5eed_f0e5_7000_0001,
        }
    }
}

impl GameConfig {
    /// Delay between waves at normal game speed.
    #[must_use]
    pub fn wave_delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.wave_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Session time limit.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f32(self.time_limit_secs).unwrap_or(Duration::ZERO)
    }

    /// Wave sizing parameters of the session.
    #[must_use]
    pub fn wave_sizing(&self) -> WaveSizing {
        WaveSizing {
            base_enemies: self.base_enemies,
            enemy_increment: self.enemy_increment,
            max_enemies_per_wave: self.max_enemies_per_wave,
        }
    }

    /// Number of enemies in the one-based `wave`, capped at the configured maximum.
    #[must_use]
    pub fn wave_size(&self, wave: u32) -> u32 {
        self.wave_sizing().wave_size(wave)
    }

    /// Checks that every value describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.field;
        if !(field.width > 0.0 && field.height > 0.0) {
            return Err(ConfigError::InvalidField {
                width: field.width,
                height: field.height,
            });
        }
        if !(field.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize {
                cell_size: field.cell_size,
            });
        }
        if !(field.path_width >= 0.0 && field.panel_width >= 0.0) {
            return Err(ConfigError::NegativeLength {
                name: "path_width/panel_width",
            });
        }
        if Duration::try_from_secs_f32(self.wave_delay_secs).is_err() {
            return Err(ConfigError::InvalidDuration {
                name: "wave_delay_secs",
                seconds: self.wave_delay_secs,
            });
        }
        if !(Duration::try_from_secs_f32(self.time_limit_secs).is_ok() && self.time_limit_secs > 0.0)
        {
            return Err(ConfigError::InvalidDuration {
                name: "time_limit_secs",
                seconds: self.time_limit_secs,
            });
        }
        if self.final_wave == 0 {
            return Err(ConfigError::ZeroFinalWave);
        }
        if self.base_enemies == 0 || self.max_enemies_per_wave == 0 {
            return Err(ConfigError::EmptyWaves);
        }
        if self.path_pool_size < FIXED_PATH_COUNT {
            return Err(ConfigError::PathPoolTooSmall {
                size: self.path_pool_size,
                minimum: FIXED_PATH_COUNT,
            });
        }
        if !(0.0..=1.0).contains(&self.refund_percentage) {
            return Err(ConfigError::RefundOutOfRange {
                percentage: self.refund_percentage,
            });
        }
        Ok(())
    }
}

/// Linear wave growth shared by the world and the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveSizing {
    /// Enemies in the first wave.
    pub base_enemies: u32,
    /// Additional enemies per subsequent wave.
    pub enemy_increment: u32,
    /// Upper bound on the size of any wave.
    pub max_enemies_per_wave: u32,
}

impl WaveSizing {
    /// Number of enemies in the one-based `wave`.
    #[must_use]
    pub fn wave_size(self, wave: u32) -> u32 {
        let growth = wave.saturating_sub(1).saturating_mul(self.enemy_increment);
        self.base_enemies
            .saturating_add(growth)
            .min(self.max_enemies_per_wave)
    }
}

/// Reasons a [`GameConfig`] cannot be used.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Field dimensions must be positive.
    #[error("field dimensions must be positive (received {width}x{height})")]
    InvalidField {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// Grid cells must have a positive size.
    #[error("cell_size must be positive (received {cell_size})")]
    InvalidCellSize {
        /// Configured cell size.
        cell_size: f32,
    },
    /// A length that cannot be negative was negative.
    #[error("{name} must not be negative")]
    NegativeLength {
        /// Name of the offending setting.
        name: &'static str,
    },
    /// A duration was negative, not finite or too large to represent.
    #[error("{name} must be a representable non-negative number of seconds (received {seconds})")]
    InvalidDuration {
        /// Name of the offending setting.
        name: &'static str,
        /// Configured value.
        seconds: f32,
    },
    /// The session needs at least one wave.
    #[error("final_wave must be at least 1")]
    ZeroFinalWave,
    /// Waves need at least one enemy.
    #[error("base_enemies and max_enemies_per_wave must be at least 1")]
    EmptyWaves,
    /// The pool must hold every hand-shaped path.
    #[error("path_pool_size must be at least {minimum} (received {size})")]
    PathPoolTooSmall {
        /// Configured pool size.
        size: usize,
        /// Smallest accepted pool size.
        minimum: usize,
    },
    /// Refund fraction must lie in `0.0..=1.0`.
    #[error("refund_percentage must be between 0 and 1 (received {percentage})")]
    RefundOutOfRange {
        /// Configured fraction.
        percentage: f32,
    },
    /// Difficulty levels run from 1 to 5.
    #[error("difficulty must be between 1 and 5 (received {level})")]
    DifficultyOutOfRange {
        /// Configured level.
        level: u8,
    },
}
