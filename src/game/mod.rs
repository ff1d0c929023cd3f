//! Game simulation modules

pub mod arena;
pub mod combat;
pub mod input;
pub mod physics;
pub mod simulation;
pub mod snapshot;
pub mod world;

pub use arena::{Arena, ArenaError, ArenaHandle};

use std::fmt;
use uuid::Uuid;

/// Player identity, assigned from a monotonically increasing counter
pub type PlayerId = u64;

/// Projectile identity, assigned from a monotonically increasing counter
pub type ProjectileId = u64;

/// Opaque handle of a client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
