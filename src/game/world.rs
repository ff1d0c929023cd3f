//! Entity store - the single authoritative registry of players and projectiles

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};

use crate::config::GameConfig;

use super::combat::Projectile;
use super::{ConnectionId, PlayerId, ProjectileId};

/// Collision radius of every player
pub const PLAYER_RADIUS: f32 = 16.0;

/// Player state (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    /// Owning connection, only used to route inbound events
    pub connection: ConnectionId,
    pub name: String,
    pub color: String,

    // Position and movement
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Per-tick velocity, rewritten by every input
    pub vx: f32,
    pub vy: f32,

    // Combat
    pub score: u32,
    /// Ticks left before the next shot is allowed
    pub shoot_cooldown: f32,
}

/// Complete mutable game state.
///
/// Players are kept in a `BTreeMap` so every pass over them runs in
/// ascending id order; projectiles stay in creation order.
#[derive(Debug, Clone)]
pub struct World {
    config: GameConfig,
    pub(crate) players: BTreeMap<PlayerId, Player>,
    pub(crate) projectiles: Vec<Projectile>,
    connections: HashMap<ConnectionId, PlayerId>,
    next_player_id: PlayerId,
    next_projectile_id: ProjectileId,
    pub(crate) rng: ChaCha8Rng,
}

impl World {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            players: BTreeMap::new(),
            projectiles: Vec::new(),
            connections: HashMap::new(),
            next_player_id: 1,
            next_projectile_id: 1,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Create the player owned by `connection`.
    ///
    /// A connection that already owns a player gets that player back.
    pub fn create_player(&mut self, connection: ConnectionId) -> &Player {
        if let Some(&existing) = self.connections.get(&connection) {
            return &self.players[&existing];
        }

        let id = self.next_player_id;
        self.next_player_id += 1;

        let (x, y) = random_point(&mut self.rng, self.config.half_world());
        let (x, y) = safe_spawn(x, y, self.config.spawn_safe_radius);
        let hue = self.rng.gen_range(0..=360);

        let player = Player {
            id,
            connection,
            name: format!("Player{}", id),
            color: format!("hsl({}, 70%, 60%)", hue),
            x,
            y,
            radius: PLAYER_RADIUS,
            vx: 0.0,
            vy: 0.0,
            score: 0,
            shoot_cooldown: 0.0,
        };

        self.connections.insert(connection, id);
        self.players.entry(id).or_insert(player)
    }

    /// Remove a player by id; no-op when absent
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.connections.remove(&player.connection);
        Some(player)
    }

    /// Remove whichever player `connection` owns
    pub fn remove_connection(&mut self, connection: ConnectionId) -> Option<Player> {
        let id = self.find_player_by_connection(connection)?;
        self.remove_player(id)
    }

    pub fn find_player_by_connection(&self, connection: ConnectionId) -> Option<PlayerId> {
        self.connections.get(&connection).copied()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Players in ascending id order
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Live projectiles in creation order
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub(crate) fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        id
    }

    pub(crate) fn push_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }
}

/// Uniform point in `[-half, half]` on both axes
pub(crate) fn random_point(rng: &mut ChaCha8Rng, half: f32) -> (f32, f32) {
    (rng.gen_range(-half..=half), rng.gen_range(-half..=half))
}

/// Push a spawn point that landed near the origin out by `safe_radius` on
/// both axes. Applied once, without re-checking the result.
pub(crate) fn safe_spawn(x: f32, y: f32, safe_radius: f32) -> (f32, f32) {
    if x.hypot(y) < safe_radius {
        (x + safe_radius, y + safe_radius)
    } else {
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(GameConfig::default(), 7)
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let mut world = world();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let c = ConnectionId::new();

        assert_eq!(world.create_player(a).id, 1);
        assert_eq!(world.create_player(b).id, 2);
        world.remove_player(2);
        assert_eq!(world.create_player(c).id, 3);
        assert_eq!(world.player_count(), 2);
    }

    #[test]
    fn new_player_defaults() {
        let mut world = world();
        let conn = ConnectionId::new();
        let player = world.create_player(conn).clone();

        assert_eq!(player.name, "Player1");
        assert_eq!(player.radius, PLAYER_RADIUS);
        assert_eq!(player.score, 0);
        assert_eq!((player.vx, player.vy), (0.0, 0.0));
        assert!(player.color.starts_with("hsl("));
        assert!(player.color.ends_with(", 70%, 60%)"));
        assert_eq!(player.connection, conn);
    }

    #[test]
    fn same_connection_keeps_one_player() {
        let mut world = world();
        let conn = ConnectionId::new();
        let first = world.create_player(conn).id;
        let second = world.create_player(conn).id;
        assert_eq!(first, second);
        assert_eq!(world.player_count(), 1);
    }

    #[test]
    fn lookup_and_removal_by_connection() {
        let mut world = world();
        let conn = ConnectionId::new();
        let id = world.create_player(conn).id;

        assert_eq!(world.find_player_by_connection(conn), Some(id));
        assert!(world.find_player_by_connection(ConnectionId::new()).is_none());

        let removed = world.remove_connection(conn).unwrap();
        assert_eq!(removed.id, id);
        assert!(world.find_player_by_connection(conn).is_none());
        assert!(world.remove_connection(conn).is_none());
        assert!(world.remove_player(id).is_none());
    }

    #[test]
    fn safe_spawn_displaces_once() {
        assert_eq!(safe_spawn(10.0, -20.0, 120.0), (130.0, 100.0));
        // Still inside the radius after the push, left as is
        assert_eq!(safe_spawn(-100.0, -100.0, 160.0), (60.0, 60.0));
        assert_eq!(safe_spawn(500.0, 0.0, 120.0), (500.0, 0.0));
    }

    #[test]
    fn spawns_land_in_bounds_or_displaced() {
        let mut world = world();
        let half = world.config().half_world();
        let safe = world.config().spawn_safe_radius;
        for _ in 0..200 {
            let player = world.create_player(ConnectionId::new());
            assert!(player.x.abs() <= half + safe);
            assert!(player.y.abs() <= half + safe);
            assert!(player.x.hypot(player.y) >= safe || player.x > 0.0);
        }
    }

    #[test]
    fn same_seed_same_spawns() {
        let mut a = World::new(GameConfig::default(), 99);
        let mut b = World::new(GameConfig::default(), 99);
        let pa = a.create_player(ConnectionId::new()).clone();
        let pb = b.create_player(ConnectionId::new()).clone();
        assert_eq!((pa.x, pa.y, pa.color), (pb.x, pb.y, pb.color));
    }
}
