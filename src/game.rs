use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};

use crate::board::Board;
use crate::config::{Difficulty, GameConfig};
use crate::error::GridError;
use crate::piece::{PieceProvider, RandomPieceProvider, Tetromino};
use crate::settle::settle;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    TilesMerged(u32),
    FloatingCollected(u32),
    RowsCleared(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub board: Board,
    pub current_piece: Tetromino,
    pub next_piece: Tetromino,
    pub state: GameState,
    config: GameConfig,
    piece_provider: Box<dyn PieceProvider>,
    rng: StdRng,
    last_fall: Option<Instant>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GridError> {
        Self::with_provider(config, Box::new(RandomPieceProvider::new()), StdRng::from_entropy())
    }

    /// Same pieces and tile values for the same seed.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, GridError> {
        Self::with_provider(
            config,
            Box::new(RandomPieceProvider::from_seed(seed)),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        )
    }

    pub fn with_provider(
        config: GameConfig,
        mut provider: Box<dyn PieceProvider>,
        mut rng: StdRng,
    ) -> Result<Self, GridError> {
        config.validate()?;
        let board = Board::new(config.width, config.height)?;
        let current_piece = Tetromino::new(
            provider.next_piece(),
            &board,
            &mut rng,
            config.four_probability,
        );
        let next_piece = Tetromino::new(
            provider.next_piece(),
            &board,
            &mut rng,
            config.four_probability,
        );

        Ok(Self {
            board,
            current_piece,
            next_piece,
            state: GameState::Playing,
            config,
            piece_provider: provider,
            rng,
            last_fall: None,
            events: Vec::new(),
        })
    }

    /// Starts from a prepared board and piece; the board's size wins over
    /// the config's.
    pub fn with_board(
        board: Board,
        current_piece: Tetromino,
        mut provider: Box<dyn PieceProvider>,
    ) -> Self {
        let config = GameConfig {
            width: board.width(),
            height: board.height(),
            ..GameConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let next_piece = Tetromino::new(
            provider.next_piece(),
            &board,
            &mut rng,
            config.four_probability,
        );

        Self {
            board,
            current_piece,
            next_piece,
            state: GameState::Playing,
            config,
            piece_provider: provider,
            rng,
            last_fall: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u64 {
        self.board.score()
    }

    fn draw_piece(&mut self) -> Tetromino {
        let kind = self.piece_provider.next_piece();
        Tetromino::new(kind, &self.board, &mut self.rng, self.config.four_probability)
    }

    fn lock_piece(&mut self) -> Result<(), GridError> {
        let Some((tiles, anchor)) = self.current_piece.min_bounded_tile_matrix() else {
            return Ok(());
        };
        let outcome = settle(&mut self.board, tiles, anchor)?;
        self.events.push(GameEvent::PieceLocked);
        if outcome.merges > 0 {
            self.events.push(GameEvent::TilesMerged(outcome.merges));
        }
        if outcome.floating_removed > 0 {
            self.events.push(GameEvent::FloatingCollected(outcome.floating_removed));
        }
        if outcome.rows_cleared > 0 {
            self.events.push(GameEvent::RowsCleared(outcome.rows_cleared));
        }

        if outcome.game_over {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
            log::info!("game over with score {}", self.board.score());
        } else {
            let next = self.draw_piece();
            self.current_piece = std::mem::replace(&mut self.next_piece, next);
        }
        Ok(())
    }

    pub fn move_piece(&mut self, drow: i32, dcol: i32) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        if self.current_piece.move_by(&self.board, drow, dcol) {
            self.events.push(GameEvent::PieceMoved);
            true
        } else {
            false
        }
    }

    pub fn rotate_piece(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        if self.current_piece.rotate(&self.board) {
            self.events.push(GameEvent::PieceRotated);
            true
        } else {
            false
        }
    }

    pub fn hard_drop(&mut self) -> Result<(), GridError> {
        if self.state != GameState::Playing {
            return Ok(());
        }
        while self.current_piece.move_by(&self.board, -1, 0) {}
        self.lock_piece()
    }

    pub fn soft_drop(&mut self) -> Result<(), GridError> {
        if self.state != GameState::Playing {
            return Ok(());
        }
        if !self.move_piece(-1, 0) {
            self.lock_piece()?;
        }
        Ok(())
    }

    /// One auto-fall step: move down, or lock when blocked.
    pub fn tick(&mut self) -> Result<(), GridError> {
        if self.state != GameState::Playing {
            return Ok(());
        }
        if !self.move_piece(-1, 0) {
            self.lock_piece()?;
        }
        Ok(())
    }

    /// Runs `tick` once the fall delay has passed since the previous fall.
    /// Returns whether a tick happened. Paused and finished games never fall.
    pub fn update(&mut self, now: Instant) -> Result<bool, GridError> {
        if self.state != GameState::Playing {
            return Ok(false);
        }
        let last = *self.last_fall.get_or_insert(now);
        if now.saturating_duration_since(last) < self.fall_delay() {
            return Ok(false);
        }
        self.last_fall = Some(now);
        self.tick()?;
        Ok(true)
    }

    /// How long the frame loop may wait for input before the next fall.
    pub fn time_until_fall(&self, now: Instant) -> Duration {
        match self.last_fall {
            Some(last) => self
                .fall_delay()
                .saturating_sub(now.saturating_duration_since(last)),
            None => self.fall_delay(),
        }
    }

    pub fn fall_delay(&self) -> Duration {
        self.config.difficulty.fall_delay()
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Playing => {
                self.state = GameState::Paused;
                self.events.push(GameEvent::Paused);
            }
            GameState::Paused => {
                self.state = GameState::Playing;
                // Time spent paused doesn't count toward the next fall.
                self.last_fall = None;
                self.events.push(GameEvent::Unpaused);
            }
            GameState::GameOver => {}
        }
    }

    pub fn restart(&mut self) {
        self.board.clear();
        self.state = GameState::Playing;
        self.last_fall = None;
        self.events.clear();

        self.current_piece = self.draw_piece();
        self.next_piece = self.draw_piece();

        self.events.push(GameEvent::GameRestarted);
    }

    /// Board values with the falling piece overlaid, indexed `[row][col]`
    /// with row 0 at the bottom.
    pub fn render_grid(&self) -> Vec<Vec<Option<u32>>> {
        let mut visual = vec![vec![None; self.board.width()]; self.board.height()];
        for (row, col, value) in self.board.tiles() {
            visual[row][col] = Some(value);
        }
        for (row, col, value) in self.current_piece.cells() {
            if self.board.is_inside(row, col) {
                visual[row as usize][col as usize] = Some(value);
            }
        }
        visual
    }

    /// Tile values of the upcoming piece, top row first.
    pub fn preview(&self) -> Vec<Vec<Option<u32>>> {
        self.next_piece.preview()
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }
}
