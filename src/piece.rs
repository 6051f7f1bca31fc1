use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::board::Board;
use crate::settle::{Anchor, TileMatrix};
use crate::tile::Tile;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TetrominoKind {
    I,
    O,
    Z,
    S,
    T,
    J,
    L,
}

impl TetrominoKind {
    pub const ALL: [TetrominoKind; 7] = [
        TetrominoKind::I,
        TetrominoKind::O,
        TetrominoKind::Z,
        TetrominoKind::S,
        TetrominoKind::T,
        TetrominoKind::J,
        TetrominoKind::L,
    ];

    /// Square occupancy mask, top row first.
    pub fn shape(&self) -> &'static [&'static [u8]] {
        match self {
            TetrominoKind::I => &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            TetrominoKind::O => &[&[1, 1], &[1, 1]],
            TetrominoKind::Z => &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
            TetrominoKind::S => &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
            TetrominoKind::T => &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
            TetrominoKind::J => &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
            TetrominoKind::L => &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoKind;
}

pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoKind {
        TetrominoKind::random(&mut self.rng)
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoKind>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoKind {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Tetromino
// ============================================================================

/// The falling piece: a square tile matrix anchored by its bottom-left
/// corner in board coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Tetromino {
    pub kind: TetrominoKind,
    pub tiles: TileMatrix,
    pub anchor: Anchor,
}

impl Tetromino {
    /// Builds `kind` with fresh tiles, centered horizontally with its lowest
    /// tile one row above the board.
    pub fn new<R: Rng + ?Sized>(
        kind: TetrominoKind,
        board: &Board,
        rng: &mut R,
        four_probability: f64,
    ) -> Self {
        let shape = kind.shape();
        let rows: Vec<Vec<Option<Tile>>> = shape
            .iter()
            .map(|mask| {
                mask.iter()
                    .map(|&bit| (bit != 0).then(|| Tile::random(rng, four_probability)))
                    .collect()
            })
            .collect();
        let tiles = match TileMatrix::from_rows(rows) {
            Ok(tiles) => tiles,
            Err(err) => unreachable!("static shapes are square: {err}"),
        };
        let bottom_gap = tiles.trimmed().map_or(0, |(_, bottom, _)| bottom) as i32;
        let col = (board.width() as i32 - tiles.cols() as i32) / 2;
        Self {
            kind,
            tiles,
            anchor: Anchor::new(board.height() as i32 - bottom_gap, col.max(0)),
        }
    }

    pub fn new_at(kind: TetrominoKind, tiles: TileMatrix, anchor: Anchor) -> Self {
        Self {
            kind,
            tiles,
            anchor,
        }
    }

    /// Occupied cells as `(row, col, value)` in board coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, u32)> + '_ {
        self.tiles.occupied().map(move |(r, c, tile)| {
            let (row, col) = self.tiles.board_position(self.anchor, r, c);
            (row, col, tile.value())
        })
    }

    /// Every cell is inside the columns, not below ground, and not on a
    /// locked tile. Rows above the board are free.
    pub fn fits(&self, board: &Board) -> bool {
        self.cells().all(|(row, col, _)| {
            col >= 0 && (col as usize) < board.width() && row >= 0 && !board.is_occupied(row, col)
        })
    }

    fn moved(&self, drow: i32, dcol: i32) -> Self {
        Self {
            anchor: Anchor::new(self.anchor.row + drow, self.anchor.col + dcol),
            ..self.clone()
        }
    }

    pub fn move_by(&mut self, board: &Board, drow: i32, dcol: i32) -> bool {
        let moved = self.moved(drow, dcol);
        if moved.fits(board) {
            *self = moved;
            true
        } else {
            false
        }
    }

    /// Clockwise rotation with a few kick attempts when blocked.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let rotated = Self {
            tiles: self.tiles.rotated_clockwise(),
            ..self.clone()
        };
        let kicks = [(0, 0), (0, 1), (0, -1), (1, 0), (0, 2), (0, -2)];
        for (drow, dcol) in kicks {
            let kicked = rotated.moved(drow, dcol);
            if kicked.fits(board) {
                *self = kicked;
                return true;
            }
        }
        false
    }

    /// The smallest matrix holding every tile, with its bottom-left anchor.
    pub fn min_bounded_tile_matrix(&self) -> Option<(TileMatrix, Anchor)> {
        let (trimmed, bottom, left) = self.tiles.trimmed()?;
        let anchor = Anchor::new(self.anchor.row + bottom as i32, self.anchor.col + left as i32);
        Some((trimmed, anchor))
    }

    /// Tile values of the minimal bounding matrix, top row first.
    pub fn preview(&self) -> Vec<Vec<Option<u32>>> {
        self.tiles
            .trimmed()
            .map(|(trimmed, _, _)| trimmed.values())
            .unwrap_or_default()
    }
}
