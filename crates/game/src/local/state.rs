use std::collections::VecDeque;

use crate::grid::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalStatus {
    /// Parked while an online session owns the screen.
    Idle,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Food,
    Bomb,
    Star,
}

#[derive(Debug, Clone)]
pub struct LocalState {
    pub status: LocalStatus,
    /// Head first.
    pub snake: VecDeque<Position>,
    pub direction: Direction,
    pub next_direction: Direction,
    pub health: i32,
    pub food: Position,
    pub bombs: Vec<Position>,
    pub stars: Vec<Position>,
    pub score: u32,
}

impl LocalState {
    pub fn head(&self) -> Option<Position> {
        self.snake.front().copied()
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.snake.contains(&pos)
            || self.bombs.contains(&pos)
            || self.stars.contains(&pos)
            || self.food == pos
    }
}
