//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::combat::KillEvent;
use crate::game::entities::{PlayerId, Team};
use crate::game::input::InputSnapshot;
use crate::game::snapshot::WorldSnapshot;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Enter the match with a display name
    Join { name: String },

    /// Latest input state, sent once per rendered frame
    Input { input: InputSnapshot },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave current match
    LeaveMatch,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome { player_id: PlayerId, server_time: u64 },

    /// Confirmation of match join, with everything needed to build a mirror
    MatchJoined {
        match_id: Uuid,
        player_id: PlayerId,
        team: Team,
        map: Vec<Vec<u8>>,
        tile_size: f32,
    },

    /// Player joined the match
    PlayerJoined { player: PlayerInfo },

    /// Player left the match
    PlayerLeft { player_id: PlayerId, reason: String },

    /// Full world state
    Snapshot(WorldSnapshot),

    /// Kill feed entry as it happens
    Kill(KillEvent),

    /// Match decided
    GameOver {
        winner: String,
        scoreboard: Vec<ScoreLine>,
    },

    /// Match countdown starting
    MatchCountdown { seconds_remaining: u32 },

    /// Match has started
    MatchStarted { tick: u64 },

    /// Error message
    Error { code: String, message: String },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Player info for the join notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub name: String,
    pub team: Team,
    pub is_bot: bool,
}

/// Final score of one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub player_id: PlayerId,
    pub name: String,
    pub team: Team,
    pub score: u32,
    pub is_bot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_parse() {
        let msg: ClientMsg = serde_json::from_str(
            r#"{"type":"input","input":{"keys":["KeyA"],"mouse":[3.0,4.0],"cam_x":0,"cam_y":0,"width":800,"height":600}}"#,
        )
        .unwrap();
        match msg {
            ClientMsg::Input { input } => {
                assert!(input.pressed("KeyA"));
                assert_eq!(input.width, 800.0);
            }
            other => panic!("unexpected {other:?}"),
        }

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"leave_match"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::LeaveMatch));
    }

    #[test]
    fn test_server_message_tags() {
        let json = serde_json::to_value(ServerMsg::Pong { t: 5 }).unwrap();
        assert_eq!(json["type"], "pong");

        let json = serde_json::to_value(ServerMsg::GameOver {
            winner: "RED TEAM".into(),
            scoreboard: vec![],
        })
        .unwrap();
        assert_eq!(json["type"], "game_over");
        assert_eq!(json["winner"], "RED TEAM");
    }
}
