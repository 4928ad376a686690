use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Enumerates the tower archetypes the player can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Fast, perfectly accurate long-range tower.
    Archer,
    /// Slow, heavy-hitting tower with a short reach and poor accuracy.
    Cannon,
    /// Expensive tower that leads moving targets.
    Magic,
}

impl TowerKind {
    /// Every tower kind in selection order.
    pub const ALL: [TowerKind; 3] = [TowerKind::Archer, TowerKind::Cannon, TowerKind::Magic];

    /// Immutable base statistics for the tower kind.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        match self {
            TowerKind::Archer => TowerStats {
                cost: 35,
                damage: 20.0,
                range: 150.0,
                fire_rate: 3.0,
                accuracy: 1.0,
                projectile_speed: 480.0,
                max_level: 5,
                aim: AimStrategy::Direct,
            },
            TowerKind::Cannon => TowerStats {
                cost: 60,
                damage: 40.0,
                range: 100.0,
                fire_rate: 1.25,
                accuracy: 0.65,
                projectile_speed: 300.0,
                max_level: 3,
                aim: AimStrategy::Direct,
            },
            TowerKind::Magic => TowerStats {
                cost: 90,
                damage: 30.0,
                range: 120.0,
                fire_rate: 2.25,
                accuracy: 0.95,
                projectile_speed: 600.0,
                max_level: 2,
                aim: AimStrategy::Predictive,
            },
        }
    }

    /// Price charged for a single upgrade of this tower kind.
    #[must_use]
    pub const fn upgrade_cost(self) -> u32 {
        self.stats().cost / 2
    }

    /// Amount an upgrade adds to the tower's invested cost for refunds.
    #[must_use]
    pub const fn invested_upgrade_cost(self) -> u32 {
        self.stats().cost * 3 / 4
    }

    /// Lowercase identifier used for logging and asset lookup.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TowerKind::Archer => "archer",
            TowerKind::Cannon => "cannon",
            TowerKind::Magic => "magic",
        }
    }

    /// Human readable label used by the side panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TowerKind::Archer => "Archer",
            TowerKind::Cannon => "Cannon",
            TowerKind::Magic => "Magic",
        }
    }
}

/// How a tower chooses the point its projectiles fly towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AimStrategy {
    /// Projectiles chase the live target position.
    Direct,
    /// Projectiles fly to where the target will be on impact.
    Predictive,
}

/// Base statistics describing a tower kind at level one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Money required to build the tower.
    pub cost: u32,
    /// Damage dealt by each projectile.
    pub damage: f32,
    /// Targeting radius measured in world units.
    pub range: f32,
    /// Shots attempted per second at normal game speed.
    pub fire_rate: f32,
    /// Probability in `0.0..=1.0` that an attempted shot is fired.
    pub accuracy: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Highest level reachable through upgrades.
    pub max_level: u32,
    /// Aiming behaviour used when firing.
    pub aim: AimStrategy,
}

/// Enumerates the enemy archetypes that walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Quick and fragile.
    Goblin,
    /// Balanced health and speed.
    Orc,
    /// Slow and sturdy.
    Troll,
}

impl EnemyKind {
    /// Every enemy kind from weakest to strongest.
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Goblin, EnemyKind::Orc, EnemyKind::Troll];

    /// Immutable base statistics for the enemy kind.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Goblin => EnemyStats {
                health: 50.0,
                speed: 180.0,
                reward: 25,
                size: 20.0,
            },
            EnemyKind::Orc => EnemyStats {
                health: 75.0,
                speed: 150.0,
                reward: 35,
                size: 30.0,
            },
            EnemyKind::Troll => EnemyStats {
                health: 100.0,
                speed: 120.0,
                reward: 50,
                size: 25.0,
            },
        }
    }

    /// Lowercase identifier used for logging and asset lookup.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            EnemyKind::Goblin => "goblin",
            EnemyKind::Orc => "orc",
            EnemyKind::Troll => "troll",
        }
    }
}

/// Base statistics describing an enemy kind before difficulty scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting health.
    pub health: f32,
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Score awarded when the enemy is killed.
    pub reward: u32,
    /// Diameter used when drawing the enemy.
    pub size: f32,
}

/// Difficulty level in the inclusive range `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Easiest difficulty.
    pub const EASY: Self = Self(1);
    /// Default difficulty.
    pub const NORMAL: Self = Self(2);
    /// Third difficulty level.
    pub const HARD: Self = Self(3);
    /// Fourth difficulty level.
    pub const EXPERT: Self = Self(4);
    /// Hardest difficulty.
    pub const INSANE: Self = Self(5);

    /// Creates a difficulty from its level, returning `None` outside `1..=5`.
    #[must_use]
    pub const fn new(level: u8) -> Option<Self> {
        if level >= Self::EASY.0 && level <= Self::INSANE.0 {
            Some(Self(level))
        } else {
            None
        }
    }

    /// Numeric level of the difficulty.
    #[must_use]
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Returns the difficulty shifted by `delta` levels, clamped to the valid range.
    #[must_use]
    pub fn adjusted(self, delta: i32) -> Self {
        let level = (i32::from(self.0) + delta).clamp(
            i32::from(Self::EASY.0),
            i32::from(Self::INSANE.0),
        );
        Self(u8::try_from(level).unwrap_or(Self::NORMAL.0))
    }

    /// Tuning parameters associated with the difficulty.
    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self.0 {
            1 => DifficultyProfile {
                name: "Easy",
                health_multiplier: 0.8,
                speed_multiplier: 0.9,
                reward_multiplier: 1.2,
                upgrade_effectiveness: 1.2,
                starting_money: 200,
                starting_lives: 4,
            },
            3 => DifficultyProfile {
                name: "Hard",
                health_multiplier: 1.3,
                speed_multiplier: 1.1,
                reward_multiplier: 0.9,
                upgrade_effectiveness: 0.8,
                starting_money: 120,
                starting_lives: 2,
            },
            4 => DifficultyProfile {
                name: "Expert",
                health_multiplier: 1.6,
                speed_multiplier: 1.2,
                reward_multiplier: 0.8,
                upgrade_effectiveness: 0.7,
                starting_money: 100,
                starting_lives: 2,
            },
            5 => DifficultyProfile {
                name: "Insane",
                health_multiplier: 2.0,
                speed_multiplier: 1.4,
                reward_multiplier: 0.7,
                upgrade_effectiveness: 0.6,
                starting_money: 80,
                starting_lives: 1,
            },
            _ => DifficultyProfile {
                name: "Normal",
                health_multiplier: 1.0,
                speed_multiplier: 1.0,
                reward_multiplier: 1.0,
                upgrade_effectiveness: 1.0,
                starting_money: 150,
                starting_lives: 3,
            },
        }
    }

    /// Display name of the difficulty.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.profile().name
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or(ConfigError::DifficultyOutOfRange { level })
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

/// Multipliers and starting resources attached to a difficulty level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    /// Display name.
    pub name: &'static str,
    /// Factor applied to enemy health at spawn.
    pub health_multiplier: f32,
    /// Factor applied to enemy speed at spawn.
    pub speed_multiplier: f32,
    /// Factor applied to enemy rewards at spawn.
    pub reward_multiplier: f32,
    /// Factor applied to every stat gain from tower upgrades.
    pub upgrade_effectiveness: f32,
    /// Money available when a session starts.
    pub starting_money: u32,
    /// Lives available when a session starts.
    pub starting_lives: u32,
}
