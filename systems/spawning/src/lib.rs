#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system responsible for emitting wave start commands.
//!
//! The scheduler owns the wave sizing and composition policy. It observes the
//! world through a [`WaveStatus`] summary and requests the next wave once the
//! field is clear and the inter-wave delay has elapsed.

use std::time::Duration;

use forest_protector_core::{Command, EnemyKind, GameConfig, GameState, WaveSizing, WaveStatus};

const FIRST_MIXED_WAVE: u32 = 3;
const FIRST_TROLL_WAVE: u32 = 6;
const BASE_TROLL_SHARE: f64 = 0.2;
const TROLL_SHARE_STEP: f64 = 0.1;
const MAX_TROLL_SHARE: f64 = 0.6;
const ORC_SHARE: f64 = 0.3;

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    wave_delay: Duration,
    sizing: WaveSizing,
}

impl Config {
    /// Creates a configuration from explicit wave sizing parameters.
    #[must_use]
    pub fn new(wave_delay: Duration, base_enemies: u32, enemy_increment: u32, cap: u32) -> Self {
        Self {
            wave_delay,
            sizing: WaveSizing {
                base_enemies,
                enemy_increment,
                max_enemies_per_wave: cap,
            },
        }
    }

    /// Extracts the wave parameters of a session configuration.
    #[must_use]
    pub fn from_game_config(config: &GameConfig) -> Self {
        Self {
            wave_delay: config.wave_delay(),
            sizing: config.wave_sizing(),
        }
    }
}

/// Pure system that requests new waves once the field is clear.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
}

impl Spawning {
    /// Creates a new wave scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Number of enemies in the one-based `wave`.
    #[must_use]
    pub fn enemies_in_wave(&self, wave: u32) -> u32 {
        self.config.sizing.wave_size(wave)
    }

    /// Enemy kinds of the one-based `wave` in spawn order.
    #[must_use]
    pub fn wave_roster(&self, wave: u32) -> Vec<EnemyKind> {
        let count = self.enemies_in_wave(wave);
        (0..count)
            .map(|index| enemy_kind_for_wave(wave, index, count))
            .collect()
    }

    /// Inter-wave delay at the game speed of `status`, `None` if it overflows.
    fn wave_delay_at(&self, status: &WaveStatus) -> Option<Duration> {
        let tenths = u32::from(status.game_speed.tenths().max(1));
        self.config
            .wave_delay
            .checked_mul(10)
            .map(|delay| delay / tenths)
    }

    /// Emits a [`Command::StartWave`] when the next wave is due.
    pub fn handle(&self, status: &WaveStatus, out: &mut Vec<Command>) {
        if status.state != GameState::Playing
            || status.active_enemies > 0
            || status.wave >= status.final_wave
        {
            return;
        }

        let Some(delay) = self.wave_delay_at(status) else {
            return;
        };
        if status.now.saturating_sub(status.last_wave_time) <= delay {
            return;
        }

        let wave = status.wave + 1;
        out.push(Command::StartWave {
            wave,
            roster: self.wave_roster(wave),
        });
    }
}

/// Kind of the enemy at spawn position `index` within a wave of `count` enemies.
///
/// Early waves are all goblins, the middle waves alternate orcs and goblins,
/// and later waves front-load a growing share of trolls followed by orcs.
#[must_use]
pub fn enemy_kind_for_wave(wave: u32, index: u32, count: u32) -> EnemyKind {
    if wave < FIRST_MIXED_WAVE {
        return EnemyKind::Goblin;
    }

    if wave < FIRST_TROLL_WAVE {
        return if index % 2 == 0 {
            EnemyKind::Orc
        } else {
            EnemyKind::Goblin
        };
    }

    let troll_share =
        (BASE_TROLL_SHARE + f64::from(wave - (FIRST_TROLL_WAVE - 1)) * TROLL_SHARE_STEP)
            .min(MAX_TROLL_SHARE);
    let troll_threshold = (f64::from(count) * troll_share).floor() as u32;
    let orc_threshold = troll_threshold + (f64::from(count) * ORC_SHARE).floor() as u32;

    if index < troll_threshold {
        EnemyKind::Troll
    } else if index < orc_threshold {
        EnemyKind::Orc
    } else {
        EnemyKind::Goblin
    }
}
