use std::collections::VecDeque;

use glam::IVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::state::{ItemKind, LocalState, LocalStatus};
use crate::config::LocalConfig;
use crate::grid::{Direction, GridSize, Position};
use crate::session::SessionMode;

const SPAWN_ATTEMPTS: usize = 100;
const INITIAL_LENGTH: i32 = 6;
const MIN_STAR_LENGTH: usize = 3;
const FOOD_POINTS: u32 = 10;
const STAR_POINTS: u32 = 20;
const BOMB_SCORE_INTERVAL: u32 = 50;
const STAR_SCORE_INTERVAL: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Skipped,
    Moved,
    Grew,
    /// Lost a point of health and survived.
    Hit,
    /// Health ran out inside a network context; the board started over.
    Reset,
    GameOver,
}

pub struct LocalEngine {
    grid: GridSize,
    starting_health: i32,
    state: LocalState,
    rng: StdRng,
}

impl LocalEngine {
    pub fn new(config: &LocalConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: &LocalConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &LocalConfig, rng: StdRng) -> Self {
        let grid = GridSize::new(config.width, config.height);
        let state = LocalState {
            status: LocalStatus::Playing,
            snake: initial_snake(grid),
            direction: Direction::Up,
            next_direction: Direction::Up,
            health: config.starting_health,
            food: IVec2::new(grid.w / 2, grid.h / 2),
            bombs: Vec::new(),
            stars: Vec::new(),
            score: 0,
        };

        let mut engine = Self {
            grid,
            starting_health: config.starting_health,
            state,
            rng,
        };
        engine.reset();
        engine
    }

    pub fn state(&self) -> &LocalState {
        &self.state
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn reset(&mut self) {
        self.state.status = LocalStatus::Playing;
        self.state.health = self.starting_health;
        self.state.bombs.clear();
        self.state.stars.clear();
        self.state.score = 0;
        self.respawn_snake();
        self.spawn(ItemKind::Food);
    }

    /// Puts the engine back into play; a finished game starts over.
    pub fn resume(&mut self) {
        if self.state.status == LocalStatus::GameOver {
            self.reset();
        } else {
            self.state.status = LocalStatus::Playing;
        }
    }

    pub fn park(&mut self) {
        self.state.status = LocalStatus::Idle;
    }

    pub fn set_next_direction(&mut self, direction: Direction) {
        self.state.next_direction = direction;
    }

    pub fn step(&mut self, mode: SessionMode) -> StepOutcome {
        if self.state.status != LocalStatus::Playing {
            return StepOutcome::Skipped;
        }

        self.state.direction = self.state.next_direction;
        let Some(head) = self.state.head() else {
            return StepOutcome::Skipped;
        };
        let head = head + self.state.direction.offset();

        if !self.grid.contains(head) || self.state.snake.contains(&head) {
            return match self.lose_health(mode) {
                Some(outcome) => outcome,
                None => {
                    self.respawn_snake();
                    StepOutcome::Hit
                }
            };
        }

        let mut hit = false;
        if let Some(idx) = self.state.bombs.iter().position(|&b| b == head) {
            self.state.bombs.remove(idx);
            if let Some(outcome) = self.lose_health(mode) {
                return outcome;
            }
            hit = true;
        }

        self.state.snake.push_front(head);

        if let Some(idx) = self.state.stars.iter().position(|&s| s == head) {
            self.state.stars.remove(idx);
            self.state.score += STAR_POINTS;
            // The regular tail drop below removes one more segment.
            if self.state.snake.len() >= MIN_STAR_LENGTH + 2 {
                self.state.snake.pop_back();
            }
        }

        if head == self.state.food {
            self.state.score += FOOD_POINTS;
            self.spawn(ItemKind::Food);

            if self.state.score % BOMB_SCORE_INTERVAL == 0 {
                self.spawn(ItemKind::Bomb);
            }
            if self.state.score % STAR_SCORE_INTERVAL == 0 {
                self.spawn(ItemKind::Star);
            }
            return StepOutcome::Grew;
        }

        self.state.snake.pop_back();
        if hit { StepOutcome::Hit } else { StepOutcome::Moved }
    }

    pub fn spawn(&mut self, kind: ItemKind) -> Option<Position> {
        if self.grid.cell_count() == 0 {
            return None;
        }

        for _ in 0..SPAWN_ATTEMPTS {
            let pos = IVec2::new(
                self.rng.gen_range(0..self.grid.w),
                self.rng.gen_range(0..self.grid.h),
            );
            if self.state.is_occupied(pos) {
                continue;
            }

            match kind {
                ItemKind::Food => self.state.food = pos,
                ItemKind::Bomb => self.state.bombs.push(pos),
                ItemKind::Star => self.state.stars.push(pos),
            }
            return Some(pos);
        }

        log::debug!(
            "No free cell for {:?} after {} attempts",
            kind,
            SPAWN_ATTEMPTS
        );
        None
    }

    fn lose_health(&mut self, mode: SessionMode) -> Option<StepOutcome> {
        self.state.health -= 1;
        if self.state.health > 0 {
            return None;
        }

        if mode.is_networked() {
            log::debug!("Local health exhausted while {:?}, starting over", mode);
            self.reset();
            Some(StepOutcome::Reset)
        } else {
            log::info!("Local game over with score {}", self.state.score);
            self.state.status = LocalStatus::GameOver;
            Some(StepOutcome::GameOver)
        }
    }

    fn respawn_snake(&mut self) {
        self.state.snake = initial_snake(self.grid);
        self.state.direction = Direction::Up;
        self.state.next_direction = Direction::Up;
    }
}

/// Vertical snake heading up, five rows above the center. Short grids pull
/// the head down to row 1 and cut the tail at the bottom edge.
fn initial_snake(grid: GridSize) -> VecDeque<Position> {
    let top = (grid.h / 2 - 5).max(1).min(grid.h - 1).max(0);
    let head = IVec2::new(grid.w / 2, top);
    (0..INITIAL_LENGTH)
        .map(|i| head + IVec2::new(0, i))
        .filter(|&pos| grid.contains(pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LocalEngine {
        let mut engine = LocalEngine::with_seed(&LocalConfig::default(), 7);
        engine.state.food = IVec2::new(0, 49);
        engine
    }

    fn snake_of(cells: &[(i32, i32)]) -> VecDeque<Position> {
        cells.iter().map(|&(x, y)| IVec2::new(x, y)).collect()
    }

    fn eat_from_score(score: u32) -> (usize, usize) {
        let mut engine = engine();
        engine.state.score = score;
        engine.state.food = IVec2::new(25, 19);

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Grew);
        assert_eq!(engine.state.score, score + FOOD_POINTS);
        (engine.state.bombs.len(), engine.state.stars.len())
    }

    #[test]
    fn reset_builds_canonical_snake() {
        let engine = LocalEngine::with_seed(&LocalConfig::default(), 1);
        let state = engine.state();

        assert_eq!(state.snake.len(), 6);
        assert_eq!(state.head(), Some(IVec2::new(25, 20)));
        assert_eq!(state.snake.back().copied(), Some(IVec2::new(25, 25)));
        assert_eq!(state.health, 6);
        assert_eq!(state.score, 0);
        assert_eq!(state.status, LocalStatus::Playing);
        assert!(!state.snake.contains(&state.food));
        assert!(state.bombs.is_empty() && state.stars.is_empty());
    }

    #[test]
    fn step_moves_head_and_keeps_length() {
        let mut engine = engine();

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Moved);
        assert_eq!(engine.state.head(), Some(IVec2::new(25, 19)));
        assert_eq!(engine.state.snake.len(), 6);
        assert_eq!(engine.state.snake.back().copied(), Some(IVec2::new(25, 24)));
    }

    #[test]
    fn turning_into_neck_counts_as_collision() {
        let mut engine = engine();
        engine.set_next_direction(Direction::Down);

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Hit);
        assert_eq!(engine.state.health, 5);
        assert_eq!(engine.state.head(), Some(IVec2::new(25, 20)));
        assert_eq!(engine.state.direction, Direction::Up);
    }

    #[test]
    fn wall_hit_keeps_score() {
        let mut engine = engine();
        engine.state.score = 30;
        engine.state.snake = snake_of(&[(25, 0), (25, 1), (25, 2)]);

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Hit);
        assert_eq!(engine.state.score, 30);
        assert_eq!(engine.state.health, 5);
        assert_eq!(engine.state.snake.len(), 6);
    }

    #[test]
    fn last_health_ends_local_game() {
        let mut engine = engine();
        engine.state.health = 1;
        engine.state.snake = snake_of(&[(0, 10), (1, 10), (2, 10)]);
        engine.set_next_direction(Direction::Left);

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::GameOver);
        assert_eq!(engine.state.health, 0);
        assert_eq!(engine.state.status, LocalStatus::GameOver);
        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Skipped);
    }

    #[test]
    fn last_health_while_networked_starts_over() {
        for mode in [SessionMode::Connecting, SessionMode::Online] {
            let mut engine = engine();
            engine.state.health = 1;
            engine.state.score = 40;
            engine.state.bombs.push(IVec2::new(3, 3));
            engine.state.snake = snake_of(&[(25, 0), (25, 1), (25, 2)]);

            assert_eq!(engine.step(mode), StepOutcome::Reset);
            assert_eq!(engine.state.health, 6);
            assert_eq!(engine.state.score, 0);
            assert_eq!(engine.state.snake.len(), 6);
            assert_eq!(engine.state.status, LocalStatus::Playing);
            assert!(engine.state.bombs.is_empty());
        }
    }

    #[test]
    fn food_grows_snake() {
        let mut engine = engine();
        engine.state.food = IVec2::new(25, 19);

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Grew);
        assert_eq!(engine.state.snake.len(), 7);
        assert_eq!(engine.state.score, 10);
        assert_ne!(engine.state.food, IVec2::new(25, 19));
    }

    #[test]
    fn score_thresholds_spawn_hazards() {
        assert_eq!(eat_from_score(40), (1, 0));
        assert_eq!(eat_from_score(90), (1, 1));
        assert_eq!(eat_from_score(39), (0, 0));
        assert_eq!(eat_from_score(91), (0, 0));
    }

    #[test]
    fn star_shrinks_tail_but_not_below_three() {
        let mut engine = engine();
        engine.state.stars.push(IVec2::new(25, 19));

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Moved);
        assert_eq!(engine.state.snake.len(), 5);
        assert_eq!(engine.state.score, 20);
        assert!(engine.state.stars.is_empty());

        let mut engine = self::engine();
        engine.state.snake = snake_of(&[(10, 10), (10, 11), (10, 12)]);
        engine.state.stars.push(IVec2::new(10, 9));

        engine.step(SessionMode::Local);
        assert_eq!(engine.state.snake.len(), 3);
        assert_eq!(engine.state.score, 20);
    }

    #[test]
    fn bomb_costs_health_and_snake_moves_on() {
        let mut engine = engine();
        engine.state.bombs.push(IVec2::new(25, 19));

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Hit);
        assert_eq!(engine.state.health, 5);
        assert!(engine.state.bombs.is_empty());
        assert_eq!(engine.state.head(), Some(IVec2::new(25, 19)));
        assert_eq!(engine.state.snake.len(), 6);
    }

    #[test]
    fn bomb_on_last_health_ends_local_game() {
        let mut engine = engine();
        engine.state.health = 1;
        engine.state.bombs.push(IVec2::new(25, 19));

        assert_eq!(engine.step(SessionMode::Local), StepOutcome::GameOver);
        assert_eq!(engine.state.status, LocalStatus::GameOver);
    }

    #[test]
    fn parked_engine_does_not_move() {
        let mut engine = engine();
        let before = engine.state.snake.clone();
        engine.park();

        assert_eq!(engine.step(SessionMode::Online), StepOutcome::Skipped);
        assert_eq!(engine.state.snake, before);

        engine.resume();
        assert_eq!(engine.state.status, LocalStatus::Playing);
    }

    #[test]
    fn spawned_items_never_overlap() {
        let config = LocalConfig {
            width: 10,
            height: 10,
            ..Default::default()
        };
        let mut engine = LocalEngine::with_seed(&config, 42);

        for i in 0..40 {
            let kind = if i % 2 == 0 { ItemKind::Bomb } else { ItemKind::Star };
            engine.spawn(kind);
        }

        let state = engine.state();
        let mut cells: Vec<Position> = state.bombs.iter().chain(&state.stars).copied().collect();
        cells.push(state.food);
        cells.extend(state.snake.iter().copied());

        let total = cells.len();
        cells.sort_by_key(|p| (p.x, p.y));
        cells.dedup();
        assert_eq!(cells.len(), total);
    }

    #[test]
    fn short_grid_keeps_snake_on_the_board() {
        let config = LocalConfig {
            width: 20,
            height: 8,
            ..Default::default()
        };
        let mut engine = LocalEngine::with_seed(&config, 5);
        let grid = engine.grid();

        assert_eq!(engine.state.head(), Some(IVec2::new(10, 1)));
        assert_eq!(engine.state.snake.len(), 6);
        assert!(engine.state.snake.iter().all(|&pos| grid.contains(pos)));

        engine.state.food = IVec2::new(0, 7);
        assert_eq!(engine.step(SessionMode::Local), StepOutcome::Moved);
        assert_eq!(engine.state.head(), Some(IVec2::new(10, 0)));

        let tiny = LocalConfig {
            width: 4,
            height: 3,
            ..Default::default()
        };
        let engine = LocalEngine::with_seed(&tiny, 5);
        let grid = engine.grid();
        assert_eq!(engine.state.head(), Some(IVec2::new(2, 1)));
        assert_eq!(engine.state.snake.len(), 2);
        assert!(engine.state.snake.iter().all(|&pos| grid.contains(pos)));
    }

    #[test]
    fn spawn_gives_up_on_full_board() {
        let config = LocalConfig {
            width: 2,
            height: 2,
            ..Default::default()
        };
        let mut engine = LocalEngine::with_seed(&config, 3);
        engine.state.snake = snake_of(&[(0, 0), (1, 0), (1, 1)]);
        engine.state.food = IVec2::new(0, 1);

        assert_eq!(engine.spawn(ItemKind::Bomb), None);
        assert!(engine.state.bombs.is_empty());
    }
}
