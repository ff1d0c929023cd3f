//! Fixed-step simulation of one world tick

use std::collections::HashSet;

use super::combat::{CombatSystem, HitResult};
use super::physics::PhysicsSystem;
use super::world::{random_point, World};

/// What happened during one tick
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub hits: Vec<HitResult>,
    /// Projectiles that ran out of life
    pub expired: usize,
}

/// Advance the world by exactly one tick.
///
/// Players move first, then projectiles in creation order. Spent projectiles
/// are collected and filtered out after the pass.
pub fn tick(world: &mut World) -> TickReport {
    let config = *world.config();
    let half = config.half_world();
    let mut report = TickReport::default();

    let World {
        players,
        projectiles,
        rng,
        ..
    } = world;

    for player in players.values_mut() {
        let (x, y) = PhysicsSystem::step(player.x, player.y, player.vx, player.vy, half);
        player.x = x;
        player.y = y;
        player.shoot_cooldown = CombatSystem::update_cooldown(player.shoot_cooldown);
    }

    let mut spent = HashSet::new();

    for projectile in projectiles.iter_mut() {
        projectile.advance(half);

        if let Some(target_id) = CombatSystem::first_hit(projectile, players.values()) {
            // Owner may have disconnected; the hit still lands
            let scored = match players.get_mut(&projectile.owner_id) {
                Some(shooter) => {
                    shooter.score += 1;
                    true
                }
                None => false,
            };

            if let Some(target) = players.get_mut(&target_id) {
                // No safe-radius check on respawn
                let (x, y) = random_point(rng, half);
                target.x = x;
                target.y = y;
                target.vx = 0.0;
                target.vy = 0.0;
            }

            report.hits.push(HitResult {
                projectile_id: projectile.id,
                shooter_id: projectile.owner_id,
                target_id,
                scored,
            });
            spent.insert(projectile.id);
            continue;
        }

        if !projectile.age() {
            report.expired += 1;
            spent.insert(projectile.id);
        }
    }

    if !spent.is_empty() {
        projectiles.retain(|p| !spent.contains(&p.id));
    }

    report
}
