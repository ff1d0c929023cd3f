//! World and gameplay constants shared with clients on join

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Seconds between two shots of the same player
pub const FIRE_COOLDOWN_SECS: f32 = 0.28;

/// Immutable world/gameplay configuration.
///
/// Serialized as the `CONFIG` object of the `init` event, so field names
/// follow the client's camelCase convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Side length of the square world, centered on the origin
    pub world_size: f32,
    /// Player movement speed (units per second)
    pub player_speed: f32,
    /// Projectile speed (units per second)
    pub bullet_speed: f32,
    /// Projectile lifetime (seconds)
    pub bullet_life: f32,
    /// Initial spawns closer than this to the origin get pushed out
    pub spawn_safe_radius: f32,
    /// Simulation ticks per second
    pub update_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_size: 2000.0,
            player_speed: 300.0,
            bullet_speed: 700.0,
            bullet_life: 1.6,
            spawn_safe_radius: 120.0,
            update_rate: 60,
        }
    }
}

impl GameConfig {
    pub fn half_world(&self) -> f32 {
        self.world_size / 2.0
    }

    /// Wall-clock period of one tick
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.update_rate.max(1) as f64)
    }

    /// Player displacement per tick at full input
    pub fn player_step(&self) -> f32 {
        self.player_speed / self.update_rate as f32
    }

    /// Projectile displacement per tick
    pub fn bullet_step(&self) -> f32 {
        self.bullet_speed / self.update_rate as f32
    }

    /// Projectile lifetime in ticks
    pub fn bullet_life_ticks(&self) -> f32 {
        self.bullet_life * self.update_rate as f32
    }

    /// Ticks a player must wait between shots
    pub fn fire_cooldown_ticks(&self) -> f32 {
        FIRE_COOLDOWN_SECS * self.update_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_values_are_per_tick() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.half_world(), 1000.0);
        assert_eq!(cfg.player_step(), 5.0);
        assert!((cfg.bullet_step() - 700.0 / 60.0).abs() < 1e-5);
        assert!((cfg.bullet_life_ticks() - 96.0).abs() < 1e-3);
        assert!((cfg.fire_cooldown_ticks() - 16.8).abs() < 1e-3);
        assert_eq!(cfg.tick_period(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn serializes_with_client_field_names() {
        let json = serde_json::to_value(GameConfig::default()).unwrap();
        assert_eq!(json["worldSize"], 2000.0);
        assert_eq!(json["playerSpeed"], 300.0);
        assert_eq!(json["bulletSpeed"], 700.0);
        assert_eq!(json["spawnSafeRadius"], 120.0);
        assert_eq!(json["updateRate"], 60);
        assert!(json.get("bulletLife").is_some());
    }
}
