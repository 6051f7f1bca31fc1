use std::time::Duration;

use crate::board::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::GridError;
use crate::tile::DEFAULT_FOUR_PROBABILITY;

/// Every piece mask must fit between the walls; the I piece is four wide.
pub const MIN_WIDTH: usize = 4;
pub const MAX_WIDTH: usize = 256;
pub const MIN_HEIGHT: usize = 1;
pub const MAX_HEIGHT: usize = 256;

/// Auto-fall speed chosen before a game starts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn fall_delay(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(1000),
            Difficulty::Normal => Duration::from_millis(500),
            Difficulty::Hard => Duration::from_millis(50),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Chance that a freshly spawned tile shows 4 instead of 2.
    pub four_probability: f64,
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            four_probability: DEFAULT_FOUR_PROBABILITY,
            difficulty: Difficulty::default(),
        }
    }
}

impl GameConfig {
    /// Rejects boards too narrow for the pieces or too large to draw.
    pub fn validate(&self) -> Result<(), GridError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.width)
            || !(MIN_HEIGHT..=MAX_HEIGHT).contains(&self.height)
        {
            return Err(GridError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
