//! Combat system - projectiles, fire-rate limiting, hit detection

use crate::config::GameConfig;

use super::physics::PhysicsSystem;
use super::world::Player;
use super::{PlayerId, ProjectileId};

/// Collision radius of every projectile
pub const BULLET_RADIUS: f32 = 4.0;

/// Gap between a player's edge and the muzzle point
pub const MUZZLE_GAP: f32 = 6.0;

/// Active projectile in the game
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    /// Heading in radians, fixed at creation
    pub angle: f32,
    /// Units per tick
    pub speed: f32,
    /// Ticks left before expiry
    pub life: f32,
    pub radius: f32,
}

impl Projectile {
    /// Fire from `shooter` towards the world point `(target_x, target_y)`
    pub fn fire(
        id: ProjectileId,
        shooter: &Player,
        target_x: f32,
        target_y: f32,
        config: &GameConfig,
    ) -> Self {
        // atan2(0, 0) == 0 when aiming at the shooter's own center
        let angle = (target_y - shooter.y).atan2(target_x - shooter.x);
        let (ox, oy) = PhysicsSystem::heading(angle, shooter.radius + MUZZLE_GAP);

        Self {
            id,
            owner_id: shooter.id,
            x: shooter.x + ox,
            y: shooter.y + oy,
            angle,
            speed: config.bullet_step(),
            life: config.bullet_life_ticks(),
            radius: BULLET_RADIUS,
        }
    }

    /// Move one tick along the heading, wrapping at the world edge
    pub fn advance(&mut self, half: f32) {
        let (dx, dy) = PhysicsSystem::heading(self.angle, self.speed);
        let (x, y) = PhysicsSystem::step(self.x, self.y, dx, dy, half);
        self.x = x;
        self.y = y;
    }

    /// Burn one tick of life, returns false once expired
    pub fn age(&mut self) -> bool {
        self.life -= 1.0;
        self.life > 0.0
    }

    /// Check collision with a player
    pub fn hits(&self, player: &Player) -> bool {
        PhysicsSystem::circles_overlap(self.x, self.y, self.radius, player.x, player.y, player.radius)
    }
}

/// Combat system for fire-rate limiting and target selection
pub struct CombatSystem;

impl CombatSystem {
    /// Check if a player can fire (cooldown check)
    pub fn can_fire(shoot_cooldown: f32) -> bool {
        shoot_cooldown <= 0.0
    }

    /// Count the cooldown down by one tick, never below zero
    pub fn update_cooldown(shoot_cooldown: f32) -> f32 {
        if shoot_cooldown > 0.0 {
            (shoot_cooldown - 1.0).max(0.0)
        } else {
            shoot_cooldown
        }
    }

    /// First player (in iteration order) struck by `projectile`, skipping its owner
    pub fn first_hit<'a, I>(projectile: &Projectile, players: I) -> Option<PlayerId>
    where
        I: IntoIterator<Item = &'a Player>,
    {
        players
            .into_iter()
            .filter(|p| p.id != projectile.owner_id)
            .find(|p| projectile.hits(p))
            .map(|p| p.id)
    }
}

/// Hit registered during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub projectile_id: ProjectileId,
    pub shooter_id: PlayerId,
    pub target_id: PlayerId,
    /// Whether the shooter was still connected and got the point
    pub scored: bool,
}
