//! Arena actor: owns the world and runs the authoritative tick loop

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::config::GameConfig;
use crate::util::time::Timer;
use crate::ws::protocol::{InitPayload, PlayerInput, ServerMsg};

use super::input::InputSystem;
use super::simulation::{self, TickReport};
use super::snapshot::{SnapshotBuilder, SnapshotStats};
use super::world::World;
use super::{ConnectionId, PlayerId};

/// Pending connection events buffered between two ticks
const COMMAND_BUFFER: usize = 1024;

/// Encoded frames a slow client may fall behind before skipping
const FRAME_BUFFER: usize = 64;

/// Seconds between snapshot statistics log lines
const STATS_LOG_SECS: u64 = 30;

/// Event submitted by a connection handler
#[derive(Debug)]
pub enum ArenaCommand {
    Connect {
        connection: ConnectionId,
        reply: oneshot::Sender<Welcome>,
    },
    Input {
        connection: ConnectionId,
        input: PlayerInput,
    },
    ChangeName {
        connection: ConnectionId,
        name: String,
    },
    Disconnect {
        connection: ConnectionId,
    },
}

/// Reply to a connect: the new player's id and the world configuration
#[derive(Debug, Clone)]
pub struct Welcome {
    pub player_id: PlayerId,
    pub config: GameConfig,
}

impl From<Welcome> for ServerMsg {
    fn from(welcome: Welcome) -> Self {
        ServerMsg::Init(InitPayload {
            player_id: welcome.player_id,
            config: welcome.config,
        })
    }
}

/// Arena errors
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Arena task is not running")]
    Closed,

    #[error("Arena dropped the connect request")]
    ConnectDropped,
}

/// Handle to the running arena
#[derive(Clone)]
pub struct ArenaHandle {
    command_tx: mpsc::Sender<ArenaCommand>,
    frame_tx: broadcast::Sender<Arc<str>>,
    player_count: Arc<AtomicUsize>,
    tick_count: Arc<AtomicU64>,
}

impl ArenaHandle {
    /// Create the player for `connection` and wait for its welcome
    pub async fn connect(&self, connection: ConnectionId) -> Result<Welcome, ArenaError> {
        let (reply, welcome) = oneshot::channel();
        self.send(ArenaCommand::Connect { connection, reply }).await?;
        welcome.await.map_err(|_| ArenaError::ConnectDropped)
    }

    pub async fn input(&self, connection: ConnectionId, input: PlayerInput) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Input { connection, input }).await
    }

    pub async fn change_name(&self, connection: ConnectionId, name: String) -> Result<(), ArenaError> {
        self.send(ArenaCommand::ChangeName { connection, name }).await
    }

    pub async fn disconnect(&self, connection: ConnectionId) -> Result<(), ArenaError> {
        self.send(ArenaCommand::Disconnect { connection }).await
    }

    /// Receive every encoded `gameState` frame from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.frame_tx.subscribe()
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn ticks(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    async fn send(&self, command: ArenaCommand) -> Result<(), ArenaError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| ArenaError::Closed)
    }
}

/// The authoritative arena
pub struct Arena {
    world: World,
    command_rx: mpsc::Receiver<ArenaCommand>,
    frame_tx: broadcast::Sender<Arc<str>>,
    stats: SnapshotStats,
    player_count: Arc<AtomicUsize>,
    tick_count: Arc<AtomicU64>,
}

impl Arena {
    /// Create a new arena
    pub fn new(config: GameConfig, seed: u64) -> (Self, ArenaHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (frame_tx, _) = broadcast::channel(FRAME_BUFFER);
        let player_count = Arc::new(AtomicUsize::new(0));
        let tick_count = Arc::new(AtomicU64::new(0));

        let handle = ArenaHandle {
            command_tx,
            frame_tx: frame_tx.clone(),
            player_count: player_count.clone(),
            tick_count: tick_count.clone(),
        };

        let arena = Self {
            world: World::new(config, seed),
            command_rx,
            frame_tx,
            stats: SnapshotStats::default(),
            player_count,
            tick_count,
        };

        (arena, handle)
    }

    /// Run the authoritative tick loop
    pub async fn run(mut self) {
        let config = *self.world.config();
        info!(update_rate = config.update_rate, world_size = config.world_size, "Arena started");

        let tick_period = config.tick_period();
        let stats_every = STATS_LOG_SECS * u64::from(config.update_rate.max(1));
        let mut tick_interval = interval(tick_period);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;
            let timer = Timer::new();

            // Drain connection events
            if !self.process_commands() {
                info!("All arena handles dropped, stopping tick loop");
                break;
            }

            // Run simulation tick
            self.step();

            // Broadcast to all connected clients
            self.broadcast();

            let ticks = self.tick_count.load(Ordering::Relaxed);
            if ticks % stats_every == 0 {
                debug!(
                    ticks,
                    snapshots = self.stats.total_snapshots,
                    avg_bytes = self.stats.avg_bytes(),
                    avg_players = self.stats.avg_players_per_snapshot,
                    "Snapshot stats"
                );
            }

            let elapsed = timer.elapsed();
            if elapsed > tick_period {
                warn!(elapsed_micros = elapsed.as_micros() as u64, "Slow tick");
            }
        }
    }

    /// Apply every queued command; false once no handle is left
    fn process_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => self.handle_command(command),
                Err(mpsc::error::TryRecvError::Empty) => return true,
                Err(mpsc::error::TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_command(&mut self, command: ArenaCommand) {
        match command {
            ArenaCommand::Connect { connection, reply } => {
                self.handle_connect(connection, reply);
            }
            ArenaCommand::Input { connection, input } => {
                match self.world.find_player_by_connection(connection) {
                    Some(player_id) => {
                        InputSystem::apply_input(&mut self.world, player_id, &input);
                    }
                    None => debug!(conn_id = %connection, "Input from unknown connection ignored"),
                }
            }
            ArenaCommand::ChangeName { connection, name } => {
                let Some(player_id) = self.world.find_player_by_connection(connection) else {
                    debug!(conn_id = %connection, "Rename from unknown connection ignored");
                    return;
                };
                if let Some(name) = InputSystem::set_name(&mut self.world, player_id, &name) {
                    info!(player_id, name = %name, "Player changed name");
                }
            }
            ArenaCommand::Disconnect { connection } => {
                if let Some(player) = self.world.remove_connection(connection) {
                    info!(player_id = player.id, score = player.score, "Player disconnected");
                }
            }
        }

        self.player_count
            .store(self.world.player_count(), Ordering::Relaxed);
    }

    /// Handle player join request
    fn handle_connect(&mut self, connection: ConnectionId, reply: oneshot::Sender<Welcome>) {
        let player_id = self.world.create_player(connection).id;
        let welcome = Welcome {
            player_id,
            config: *self.world.config(),
        };

        // The handler went away before the welcome arrived
        if reply.send(welcome).is_err() {
            warn!(player_id, conn_id = %connection, "Connection closed during join");
            self.world.remove_player(player_id);
            return;
        }

        info!(player_id, conn_id = %connection, "Player joined the arena");
    }

    fn step(&mut self) {
        self.step_with(simulation::tick);
    }

    /// Run one tick on a copy and commit it only if it completes.
    /// The copy clones every name and colour string each tick, which stays
    /// cheap at arena sizes of a few dozen players.
    fn step_with<F>(&mut self, tick: F)
    where
        F: FnOnce(&mut World) -> TickReport,
    {
        let mut next = self.world.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
            let report = tick(&mut next);
            (next, report)
        }));

        match outcome {
            Ok((next, report)) => {
                self.world = next;
                if report.expired > 0 {
                    trace!(expired = report.expired, "Projectiles expired");
                }
                for hit in &report.hits {
                    debug!(
                        shooter_id = hit.shooter_id,
                        target_id = hit.target_id,
                        projectile_id = hit.projectile_id,
                        scored = hit.scored,
                        "Player hit"
                    );
                }
            }
            Err(_) => {
                error!("Simulation tick panicked, keeping last committed world");
            }
        }

        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }

    fn broadcast(&mut self) {
        let snapshot = SnapshotBuilder::build(&self.world);
        match SnapshotBuilder::encode(&snapshot) {
            Ok(frame) => {
                self.stats.record(self.world.player_count(), frame.len());
                // Err only means nobody is subscribed right now
                let _ = self.frame_tx.send(frame);
            }
            Err(e) => error!(error = %e, "Failed to encode snapshot"),
        }
    }
}
