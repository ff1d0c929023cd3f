//! Snapshot building and encoding

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ws::protocol::{BulletView, GameStateView, PlayerView, ServerMsg};

use super::world::World;

/// Builds the client-facing view of the world
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Build a snapshot message
    pub fn build(world: &World) -> ServerMsg {
        let players: BTreeMap<_, _> = world
            .players()
            .map(|p| {
                (
                    p.id,
                    PlayerView {
                        id: p.id,
                        name: p.name.clone(),
                        x: p.x,
                        y: p.y,
                        r: p.radius,
                        color: p.color.clone(),
                        score: p.score,
                    },
                )
            })
            .collect();

        let bullets = world
            .projectiles()
            .iter()
            .map(|b| BulletView {
                id: b.id,
                owner_id: b.owner_id,
                x: b.x,
                y: b.y,
                angle: b.angle,
                r: b.radius,
                life: b.life,
            })
            .collect();

        ServerMsg::GameState(GameStateView { players, bullets })
    }

    /// Encode once so every connection shares the same frame
    pub fn encode(msg: &ServerMsg) -> Result<Arc<str>, serde_json::Error> {
        serde_json::to_string(msg).map(Arc::from)
    }
}

/// Snapshot size stats for debugging
#[derive(Debug, Default)]
pub struct SnapshotStats {
    pub total_snapshots: u64,
    pub total_bytes: u64,
    pub avg_players_per_snapshot: f32,
}

impl SnapshotStats {
    pub fn record(&mut self, player_count: usize, bytes: usize) {
        self.total_snapshots += 1;
        self.total_bytes += bytes as u64;

        // Running average
        let n = self.total_snapshots as f32;
        self.avg_players_per_snapshot =
            self.avg_players_per_snapshot * ((n - 1.0) / n) + (player_count as f32 / n);
    }

    pub fn avg_bytes(&self) -> u64 {
        self.total_bytes.checked_div(self.total_snapshots).unwrap_or(0)
    }
}
