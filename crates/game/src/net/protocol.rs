use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, GridSize, Position};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("failed to encode frame: {0}")]
    Encode(serde_json::Error),
    #[error("failed to decode frame: {0}")]
    Decode(serde_json::Error),
}

/// Opponent behaviour the backend runs for this player's room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpponentMode {
    #[default]
    #[serde(rename = "DQN")]
    Dqn,
    #[serde(rename = "NEAT")]
    Neat,
    #[serde(rename = "bsf")]
    Bfs,
}

impl OpponentMode {
    /// Maps the menu selection (1, 2, 3) to a backend mode; anything else falls back to DQN.
    pub fn from_selection(selection: u8) -> Self {
        match selection {
            2 => OpponentMode::Neat,
            3 => OpponentMode::Bfs,
            _ => OpponentMode::Dqn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub room: u32,
    pub mode: OpponentMode,
}

impl Identity {
    pub fn room_id(&self) -> String {
        format!("room-{}", self.room)
    }

    pub fn join_message(&self) -> ClientMessage {
        ClientMessage::Join {
            username: self.name.clone(),
            room_id: self.room_id(),
            mode: self.mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t")]
pub enum ClientMessage {
    #[serde(rename = "join")]
    Join {
        username: String,
        room_id: String,
        mode: OpponentMode,
    },
    #[serde(rename = "in")]
    Input {
        #[serde(rename = "d")]
        direction: Direction,
    },
    #[serde(rename = "exit")]
    Leave,
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomStatus {
    #[default]
    Idle,
    Waiting,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Human,
    Bot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alive: Option<bool>,
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde(default)]
    pub kind: Option<ParticipantKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSnake {
    #[serde(default)]
    pub body: Vec<Position>,
    #[serde(default = "default_true")]
    pub alive: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub score: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub food: Option<Vec<Position>>,
    #[serde(default)]
    pub snakes: HashMap<String, SnapshotSnake>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartingPlayer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: Vec<Position>,
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde(default)]
    pub kind: Option<ParticipantKind>,
}

/// One participant's change within a tick.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub revived: bool,
    #[serde(default)]
    pub body: Option<Vec<Position>>,
    #[serde(default)]
    pub head_add: Option<Position>,
    #[serde(default)]
    pub tail_remove: bool,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub alive: Option<bool>,
    #[serde(default)]
    pub kind: Option<ParticipantKind>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RankEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "t")]
pub enum ServerMessage {
    #[serde(rename = "join_ok")]
    JoinAck {
        your_id: String,
        #[serde(default)]
        room_id: String,
        #[serde(default)]
        status: RoomStatus,
        #[serde(default)]
        map: Option<GridSize>,
        #[serde(default)]
        players: Vec<RosterEntry>,
        #[serde(default)]
        snapshot: Option<Snapshot>,
    },
    #[serde(rename = "game_start")]
    RoundStart {
        #[serde(default)]
        food: Vec<Position>,
        #[serde(default)]
        players: Vec<StartingPlayer>,
    },
    #[serde(rename = "d")]
    Tick {
        #[serde(default)]
        food: Option<Vec<Position>>,
        #[serde(default)]
        moves: Vec<MoveRecord>,
    },
    #[serde(rename = "game_over")]
    RoundOver {
        #[serde(default)]
        ranks: Option<Vec<RankEntry>>,
    },
    #[serde(rename = "err")]
    Error {
        #[serde(default)]
        code: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

fn default_true() -> bool {
    true
}
