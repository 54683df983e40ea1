use glam::IVec2;
use serde::{Deserialize, Serialize};

pub type Position = IVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub w: i32,
    pub h: i32,
}

impl GridSize {
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.w && pos.y >= 0 && pos.y < self.h
    }

    pub fn cell_count(&self) -> usize {
        (self.w.max(0) as usize) * (self.h.max(0) as usize)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_GRID_WIDTH,
            crate::config::DEFAULT_GRID_HEIGHT,
        )
    }
}
