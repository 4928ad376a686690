//! Projectiles launched by towers.

use forest_protector_core::EnemyId;
use glam::Vec2;

use crate::enemy::Enemy;

/// Distance below which a projectile strikes its target.
pub(crate) const HIT_RADIUS: f32 = 5.0;

/// Point a projectile is flying towards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Aim {
    /// Follow the live target position.
    Homing,
    /// Fly to a predicted point, then follow the target.
    Lead { point: Vec2 },
}

/// Outcome of advancing a projectile by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    InFlight,
    Hit,
    Expired,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) position: Vec2,
    pub(crate) target: EnemyId,
    damage: f32,
    speed: f32,
    pub(crate) aim: Aim,
}

impl Projectile {
    pub(crate) fn new(position: Vec2, target: EnemyId, damage: f32, speed: f32, aim: Aim) -> Self {
        Self {
            position,
            target,
            damage,
            speed,
            aim,
        }
    }

    pub(crate) fn damage(&self) -> f32 {
        self.damage
    }

    /// Moves the projectile by `dt` seconds of game-speed-scaled time.
    ///
    /// A projectile whose target is gone or no longer alive expires without
    /// dealing damage. Steps never overshoot the aim point. Only
    /// [`Flight::InFlight`] projectiles should be stepped again.
    pub(crate) fn update(&mut self, dt: f32, enemies: &mut [Enemy]) -> Flight {
        let Some(target) = enemies
            .iter_mut()
            .find(|enemy| enemy.id == self.target && enemy.is_alive())
        else {
            return Flight::Expired;
        };

        if self.position.distance(target.position) < HIT_RADIUS {
            return self.strike(target);
        }

        let aim_point = match self.aim {
            Aim::Homing => target.position,
            Aim::Lead { point } => point,
        };
        let offset = aim_point - self.position;
        let distance = offset.length();
        let step = self.speed * dt;

        if step < distance {
            self.position += offset / distance * step;
            return Flight::InFlight;
        }

        self.position = aim_point;
        match self.aim {
            Aim::Homing => self.strike(target),
            Aim::Lead { .. } => {
                self.aim = Aim::Homing;
                Flight::InFlight
            }
        }
    }

    fn strike(&self, target: &mut Enemy) -> Flight {
        target.take_damage(self.damage);
        Flight::Hit
    }
}
