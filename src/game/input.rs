//! Input processing - turns client input into velocity, shots and names

use tracing::debug;

use crate::ws::protocol::{KeyState, PlayerInput};

use super::combat::{CombatSystem, Projectile};
use super::world::World;
use super::{PlayerId, ProjectileId};

/// Longest display name kept, in characters
pub const MAX_NAME_CHARS: usize = 15;

/// Input system applying client intent to the world
pub struct InputSystem;

impl InputSystem {
    /// Unit movement direction from the held keys (zero when idle or cancelled).
    /// Screen convention: up is -y.
    pub fn direction(keys: &KeyState) -> (f32, f32) {
        let mut move_x = 0.0f32;
        let mut move_y = 0.0f32;

        if keys.up() {
            move_y -= 1.0;
        }
        if keys.down() {
            move_y += 1.0;
        }
        if keys.left() {
            move_x -= 1.0;
        }
        if keys.right() {
            move_x += 1.0;
        }

        let len = move_x.hypot(move_y);
        if len > 0.0 {
            (move_x / len, move_y / len)
        } else {
            (0.0, 0.0)
        }
    }

    /// Apply one input message to `player_id`.
    ///
    /// Velocity is replaced, never accumulated. Returns the id of the
    /// projectile fired, if the shot was allowed.
    pub fn apply_input(
        world: &mut World,
        player_id: PlayerId,
        input: &PlayerInput,
    ) -> Option<ProjectileId> {
        let config = *world.config();
        let player = world.player_mut(player_id)?;

        let (dir_x, dir_y) = Self::direction(&input.keys);
        player.vx = dir_x * config.player_step();
        player.vy = dir_y * config.player_step();

        if !input.mouse.down || !CombatSystem::can_fire(player.shoot_cooldown) {
            return None;
        }

        let target_x = input.mouse.world_x.unwrap_or(player.x);
        let target_y = input.mouse.world_y.unwrap_or(player.y);
        player.shoot_cooldown = config.fire_cooldown_ticks();
        let shooter = player.clone();

        let id = world.allocate_projectile_id();
        world.push_projectile(Projectile::fire(id, &shooter, target_x, target_y, &config));
        debug!(player_id, projectile_id = id, "Projectile fired");
        Some(id)
    }

    /// Rename a player, keeping at most `MAX_NAME_CHARS` characters
    pub fn set_name(world: &mut World, player_id: PlayerId, text: &str) -> Option<String> {
        let player = world.player_mut(player_id)?;
        player.name = truncate_name(text);
        Some(player.name.clone())
    }
}

/// Character-based truncation, any character set allowed
pub fn truncate_name(text: &str) -> String {
    text.chars().take(MAX_NAME_CHARS).collect()
}
