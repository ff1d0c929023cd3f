//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{Arena, ArenaHandle};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub arena: ArenaHandle,
}

impl AppState {
    /// Build the state and the arena that still has to be spawned
    pub fn new(config: Config) -> (Self, Arena) {
        let config = Arc::new(config);

        // Seed the world RNG: fixed when configured, random otherwise
        let seed = config.arena_seed.unwrap_or_else(rand::random);
        let (arena, handle) = Arena::new(config.game, seed);

        let state = Self {
            config,
            arena: handle,
        };

        (state, arena)
    }
}
