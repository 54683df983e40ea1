use std::collections::{HashMap, VecDeque};

use super::color::SnakeColor;
use super::protocol::{ParticipantKind, RoomStatus};
use crate::grid::{GridSize, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    pub name: String,
    pub score: u32,
    pub alive: bool,
    pub connected: bool,
    /// Set only when the server tagged the participant explicitly.
    pub kind: Option<ParticipantKind>,
}

impl PlayerEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            alive: true,
            connected: true,
            kind: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnakeEntry {
    /// Head first.
    pub body: VecDeque<Position>,
    pub color: SnakeColor,
    pub alive: bool,
    pub name: String,
    pub score: u32,
}

impl SnakeEntry {
    pub fn head(&self) -> Option<Position> {
        self.body.front().copied()
    }
}

/// Client-side mirror of the server's room.
#[derive(Debug, Clone, Default)]
pub struct RemoteSession {
    pub my_id: Option<String>,
    pub room_id: Option<String>,
    pub status: RoomStatus,
    pub map_size: GridSize,
    pub players: HashMap<String, PlayerEntry>,
    pub snakes: HashMap<String, SnakeEntry>,
    pub food: Vec<Position>,
    /// Score of the local participant.
    pub score: u32,
}

impl RemoteSession {
    pub fn is_me(&self, id: &str) -> bool {
        self.my_id.as_deref() == Some(id)
    }

    /// Best-known display name: roster, then snake, then the id itself.
    pub fn display_name(&self, id: &str) -> String {
        self.players
            .get(id)
            .map(|p| p.name.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.snakes
                    .get(id)
                    .map(|s| s.name.as_str())
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or(id)
            .to_string()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn alive_snake_count(&self) -> usize {
        self.snakes.values().filter(|s| s.alive).count()
    }
}
