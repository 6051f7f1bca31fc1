use thiserror::Error;

/// Contract violations rejected by the grid engine before any board mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("tile value {0} is not a power of two >= 2")]
    InvalidTileValue(u32),
    #[error("board dimensions {width}x{height} are out of range")]
    InvalidDimensions { width: usize, height: usize },
    #[error("tile matrix has no rows or no columns")]
    EmptyMatrix,
    #[error("tile matrix row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("piece cell at row {row}, column {col} lies outside the board")]
    OutOfBounds { row: i32, col: i32 },
}
