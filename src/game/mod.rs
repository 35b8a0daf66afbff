//! Game simulation modules

pub mod bot;
pub mod combat;
pub mod entities;
pub mod grenade;
pub mod input;
pub mod lifecycle;
pub mod map;
pub mod r#match;
pub mod physics;
pub mod raycast;
pub mod snapshot;
pub mod world;

pub use r#match::{GameMatch, MatchHandle, MatchRegistry, MatchSettings, Outbound};
pub use world::{TickOutcome, World};

use crate::ws::protocol::ClientMsg;
use entities::PlayerId;

/// Message received from a participant's WebSocket
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub player_id: PlayerId,
    pub msg: ClientMsg,
    /// Unix millis when the socket read it
    pub received_at: u64,
}

impl PlayerInput {
    /// Time spent between the socket and the match task
    pub fn queued_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.received_at)
    }
}
