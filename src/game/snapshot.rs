//! Full-state snapshots for network transmission

use serde::{Deserialize, Serialize};

use crate::ws::protocol::ServerMsg;

use super::combat::{KillEvent, Projectile};
use super::entities::{Particle, Player, TeamScores};
use super::grenade::{Explosion, FireZone, GrenadeProjectile};
use super::lifecycle::RoundState;
use super::world::World;

/// Everything a mirror needs to render and replace its world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub players: Vec<Player>,
    pub projectiles: Vec<Projectile>,
    pub grenades: Vec<GrenadeProjectile>,
    pub explosions: Vec<Explosion>,
    pub fire_zones: Vec<FireZone>,
    pub particles: Vec<Particle>,
    pub screenshake: f32,
    pub kill_feed: Vec<KillEvent>,
    pub team_scores: TeamScores,
    pub round: RoundState,
    /// Set once the match has been decided
    pub winner: Option<String>,
}

/// Decides when to send snapshots and wraps them for the wire
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (joins, leaves, game over)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot message
    pub fn build(&self, world: &World) -> ServerMsg {
        ServerMsg::Snapshot(world.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval() {
        let mut builder = SnapshotBuilder::new(3);
        let sent: Vec<bool> = (0..6).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![false, false, true, false, false, true]);

        builder.should_send();
        builder.force_next();
        assert!(builder.should_send());
    }

    #[test]
    fn test_every_tick_by_default() {
        let mut builder = SnapshotBuilder::new(0);
        assert!(builder.should_send());
        assert!(builder.should_send());
    }
}
