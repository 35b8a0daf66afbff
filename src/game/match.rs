//! Match task and authoritative tick loop

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::util::time::{frames_to_ms, tick_delta, unix_millis, SIMULATION_TPS, SNAPSHOT_TPS};
use crate::ws::protocol::{ClientMsg, PlayerInfo, ScoreLine, ServerMsg};

use super::entities::PlayerId;
use super::input::InputSnapshot;
use super::lifecycle::GameConfig;
use super::map::MapData;
use super::snapshot::SnapshotBuilder;
use super::world::World;
use super::PlayerInput;

/// Delay between the first participant joining and the simulation starting (ms)
const COUNTDOWN_MS: f32 = 3000.0;
/// Longest accepted display name
const MAX_NAME_LEN: usize = 16;
/// Queue wait worth a debug line (three ticks)
const SLOW_INPUT_MS: u64 = 50;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Waiting for players
    Waiting,
    /// Countdown before start
    Countdown,
    /// Match in progress
    InProgress,
    /// Match ended
    Ended,
}

/// Everything needed to start a match
#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub map: MapData,
    pub game: GameConfig,
    /// Human participants per match
    pub max_players: usize,
}

/// A server message, addressed to one participant or to everyone
#[derive(Debug, Clone)]
pub struct Outbound {
    pub recipient: Option<PlayerId>,
    pub msg: ServerMsg,
}

impl Outbound {
    pub fn broadcast(msg: ServerMsg) -> Self {
        Self { recipient: None, msg }
    }

    pub fn to(player_id: PlayerId, msg: ServerMsg) -> Self {
        Self {
            recipient: Some(player_id),
            msg,
        }
    }

    /// Should the session of `player_id` forward this message?
    pub fn is_for(&self, player_id: PlayerId) -> bool {
        self.recipient.map_or(true, |r| r == player_id)
    }
}

/// Handle to a running match
#[derive(Clone)]
pub struct MatchHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub events_tx: broadcast::Sender<Outbound>,
    pub player_count: Arc<AtomicUsize>,
    pub max_players: usize,
}

impl MatchHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn has_room(&self) -> bool {
        self.player_count() < self.max_players
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.events_tx.subscribe()
    }
}

/// Registry of all active matches
pub struct MatchRegistry {
    matches: DashMap<Uuid, MatchHandle>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            matches: DashMap::new(),
        }
    }

    pub fn insert(&self, handle: MatchHandle) {
        self.matches.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<MatchHandle> {
        self.matches.remove(id).map(|(_, h)| h)
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn total_players(&self) -> usize {
        self.matches
            .iter()
            .map(|m| m.value().player_count())
            .sum()
    }

    /// Find a match with available slots
    pub fn find_available_match(&self) -> Option<MatchHandle> {
        self.matches
            .iter()
            .find(|entry| entry.value().has_room())
            .map(|entry| entry.value().clone())
    }

    /// Join an open match or start a new one. The spawned task removes its
    /// own entry when the match ends.
    pub fn find_or_spawn(self: &Arc<Self>, settings: &MatchSettings) -> MatchHandle {
        if let Some(handle) = self.find_available_match() {
            return handle;
        }

        let id = Uuid::new_v4();
        let seed = rand::random::<u64>();
        let (game_match, handle) = GameMatch::new(id, seed, settings.clone());
        self.insert(handle.clone());

        let registry = Arc::clone(self);
        tokio::spawn(async move {
            game_match.run().await;
            registry.remove(&id);
            info!(match_id = %id, "Match removed from registry");
        });

        handle
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The authoritative game match
pub struct GameMatch {
    id: Uuid,
    phase: MatchPhase,
    world: World,
    max_players: usize,
    countdown_remaining: f32,
    input_rx: mpsc::Receiver<PlayerInput>,
    events_tx: broadcast::Sender<Outbound>,
    snapshot_builder: SnapshotBuilder,
    player_count: Arc<AtomicUsize>,
}

impl GameMatch {
    /// Create a new match
    pub fn new(id: Uuid, seed: u64, settings: MatchSettings) -> (Self, MatchHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (events_tx, _) = broadcast::channel(64);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = MatchHandle {
            id,
            input_tx,
            events_tx: events_tx.clone(),
            player_count: player_count.clone(),
            max_players: settings.max_players,
        };

        let snapshot_interval = SIMULATION_TPS / SNAPSHOT_TPS;
        let game_match = Self {
            id,
            phase: MatchPhase::Waiting,
            world: World::new(settings.map, settings.game, seed),
            max_players: settings.max_players,
            countdown_remaining: COUNTDOWN_MS,
            input_rx,
            events_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            player_count,
        };

        (game_match, handle)
    }

    /// Run the authoritative tick loop
    pub async fn run(mut self) {
        info!(match_id = %self.id, "Match task started");

        let tick_duration = Duration::from_micros(1_000_000 / SIMULATION_TPS as u64);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            // Drain input queue
            self.process_inputs();

            // Run simulation tick
            self.run_tick();

            if self.snapshot_builder.should_send() && self.phase != MatchPhase::Waiting {
                let snapshot = self.snapshot_builder.build(&self.world);
                self.send(Outbound::broadcast(snapshot));
            }

            if self.phase == MatchPhase::Ended {
                info!(match_id = %self.id, tick = self.world.tick(), "Match ended");
                break;
            }

            if self.world.human_count() == 0 && self.phase != MatchPhase::Waiting {
                info!(match_id = %self.id, "All players left, ending match");
                break;
            }
        }
    }

    /// Receivers come and go with connections; a send with none is fine.
    fn send(&self, outbound: Outbound) {
        let _ = self.events_tx.send(outbound);
    }

    /// Process all pending inputs from players
    fn process_inputs(&mut self) {
        let now = unix_millis();
        while let Ok(input) = self.input_rx.try_recv() {
            let queued_ms = input.queued_ms(now);
            if queued_ms > SLOW_INPUT_MS {
                debug!(match_id = %self.id, player_id = %input.player_id, queued_ms, "Input waited in queue");
            }
            match input.msg {
                ClientMsg::Join { name } => self.handle_join(input.player_id, name),
                ClientMsg::Input { input: snapshot } => self.handle_input(input.player_id, snapshot),
                ClientMsg::Ping { t } => self.send(Outbound::to(input.player_id, ServerMsg::Pong { t })),
                ClientMsg::LeaveMatch => self.handle_leave(input.player_id),
            }
        }
    }

    /// Handle player join request
    fn handle_join(&mut self, player_id: PlayerId, name: String) {
        if self.world.player(player_id).is_some() {
            warn!(player_id = %player_id, "Player already in match");
            return;
        }

        if self.world.human_count() >= self.max_players {
            self.send(Outbound::to(
                player_id,
                ServerMsg::Error {
                    code: "match_full".to_string(),
                    message: "Match is full".to_string(),
                },
            ));
            return;
        }

        let name = display_name(&name, player_id);
        let player = self.world.add_remote_player(player_id, name);
        let info = PlayerInfo {
            player_id,
            name: player.name.clone(),
            team: player.team,
            is_bot: false,
        };
        self.player_count.store(self.world.human_count(), Ordering::Relaxed);

        self.send(Outbound::broadcast(ServerMsg::PlayerJoined { player: info.clone() }));

        let map = self.world.map();
        self.send(Outbound::to(
            player_id,
            ServerMsg::MatchJoined {
                match_id: self.id,
                player_id,
                team: info.team,
                map: map.grid().to_vec(),
                tile_size: map.tile_size,
            },
        ));

        info!(
            match_id = %self.id,
            player_id = %player_id,
            name = %info.name,
            player_count = self.world.human_count(),
            "Player joined match"
        );

        if self.phase == MatchPhase::Waiting {
            self.phase = MatchPhase::Countdown;
            self.countdown_remaining = COUNTDOWN_MS;
            self.send(Outbound::broadcast(ServerMsg::MatchCountdown {
                seconds_remaining: (COUNTDOWN_MS / 1000.0).ceil() as u32,
            }));
        }
        self.snapshot_builder.force_next();
    }

    fn handle_input(&mut self, player_id: PlayerId, snapshot: InputSnapshot) {
        if !self.world.set_input(player_id, snapshot) {
            debug!(match_id = %self.id, player_id = %player_id, "Input for unknown player dropped");
        }
    }

    /// Handle player leave
    fn handle_leave(&mut self, player_id: PlayerId) {
        if self.world.remove_player(player_id).is_none() {
            return;
        }
        self.player_count.store(self.world.human_count(), Ordering::Relaxed);

        self.send(Outbound::broadcast(ServerMsg::PlayerLeft {
            player_id,
            reason: "disconnected".to_string(),
        }));
        self.snapshot_builder.force_next();

        info!(
            match_id = %self.id,
            player_id = %player_id,
            player_count = self.world.human_count(),
            "Player left match"
        );
    }

    /// Run a single simulation tick
    fn run_tick(&mut self) {
        match self.phase {
            MatchPhase::Waiting | MatchPhase::Ended => {}
            MatchPhase::Countdown => {
                self.countdown_remaining -= frames_to_ms(tick_delta());
                if self.countdown_remaining <= 0.0 {
                    self.phase = MatchPhase::InProgress;
                    self.send(Outbound::broadcast(ServerMsg::MatchStarted {
                        tick: self.world.tick(),
                    }));
                    info!(match_id = %self.id, "Match started!");
                    self.simulate();
                }
            }
            MatchPhase::InProgress => self.simulate(),
        }
    }

    /// One world step, forwarding kills and game over
    fn simulate(&mut self) {
        let outcome = self.world.update(tick_delta());

        for kill in outcome.kills {
            self.send(Outbound::broadcast(ServerMsg::Kill(kill)));
        }

        if let Some(winner) = outcome.game_over {
            self.send(Outbound::broadcast(ServerMsg::GameOver {
                winner,
                scoreboard: self.scoreboard(),
            }));
            self.phase = MatchPhase::Ended;
            self.snapshot_builder.force_next();
        }
    }

    /// Final standings, best score first
    fn scoreboard(&self) -> Vec<ScoreLine> {
        let mut lines: Vec<ScoreLine> = self
            .world
            .players
            .iter()
            .map(|p| ScoreLine {
                player_id: p.id,
                name: p.name.clone(),
                team: p.team,
                score: p.score,
                is_bot: p.is_bot,
            })
            .collect();
        lines.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        lines
    }
}

/// Trimmed, length-capped display name with a generated fallback
fn display_name(requested: &str, player_id: PlayerId) -> String {
    let name: String = requested.trim().chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() {
        format!("Player_{}", &player_id.simple().to_string()[..8])
    } else {
        name
    }
}
