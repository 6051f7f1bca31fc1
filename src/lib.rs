pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod merge;
pub mod piece;
pub mod rows;
pub mod settle;
pub mod support;
pub mod tile;

pub use board::Board;
pub use config::{Difficulty, GameConfig};
pub use error::GridError;
pub use settle::{settle, Anchor, SettleOutcome, TileMatrix};
pub use tile::Tile;
