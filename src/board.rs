use crate::error::GridError;
use crate::tile::Tile;

pub const DEFAULT_WIDTH: usize = 12;
pub const DEFAULT_HEIGHT: usize = 20;

// ============================================================================
// Board
// ============================================================================

/// The locked tiles of a game session.
///
/// Row 0 is the ground row and rows grow upward; columns grow to the right.
/// Cells live in one flat row-major arena (`row * width + col`), each cell
/// owning at most one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<Tile>>,
    score: u64,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width * height],
            score: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    pub fn is_inside(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// Collision query for the falling piece. Cells outside the board are
    /// reported as unoccupied.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.is_inside(row, col) && self.get(row as usize, col as usize).is_some()
    }

    /// Panics if `row` or `col` is out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&Tile> {
        self.cells[self.index(row, col)].as_ref()
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<u32> {
        self.get(row, col).map(Tile::value)
    }

    /// Every occupied cell as `(row, col, value)`, bottom row first.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref().map(|tile| (i / width, i % width, tile.value()))
        })
    }

    /// Values of one column from row 0 upward, `None` for empty cells.
    pub fn column_values(&self, col: usize) -> Vec<Option<u32>> {
        (0..self.height).map(|row| self.value_at(row, col)).collect()
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.row_cells(row).iter().all(Option::is_some)
    }

    pub fn filled_count_in_row(&self, row: usize) -> usize {
        self.row_cells(row).iter().filter(|cell| cell.is_some()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    fn row_cells(&self, row: usize) -> &[Option<Tile>] {
        let start = self.index(row, 0);
        &self.cells[start..start + self.width]
    }

    // ------------------------------------------------------------------------
    // Mutation, reserved for the settle pipeline
    // ------------------------------------------------------------------------

    pub(crate) fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Tile> {
        let i = self.index(row, col);
        self.cells[i].as_mut()
    }

    pub(crate) fn put(&mut self, row: usize, col: usize, tile: Tile) {
        let i = self.index(row, col);
        self.cells[i] = Some(tile);
    }

    pub(crate) fn take(&mut self, row: usize, col: usize) -> Option<Tile> {
        let i = self.index(row, col);
        self.cells[i].take()
    }

    pub(crate) fn add_score(&mut self, points: u64) {
        self.score += points;
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.cells.iter_mut().flatten()
    }

    /// Moves every cell of `col` above `row` down by one; the top cell
    /// becomes empty. Whatever sat at `row` is overwritten.
    pub(crate) fn collapse_column(&mut self, col: usize, row: usize) {
        for r in row..self.height - 1 {
            let above = self.index(r + 1, col);
            let here = self.index(r, col);
            self.cells[here] = self.cells[above].take();
        }
        let top = self.index(self.height - 1, col);
        self.cells[top] = None;
    }

    /// Empties `row` and returns the sum of the removed values.
    pub(crate) fn drain_row(&mut self, row: usize) -> u64 {
        let start = self.index(row, 0);
        self.cells[start..start + self.width]
            .iter_mut()
            .filter_map(Option::take)
            .map(|tile| u64::from(tile.value()))
            .sum()
    }

    /// Moves every row above `row` down by one; the top row becomes empty.
    pub(crate) fn collapse_rows(&mut self, row: usize) {
        let width = self.width;
        let start = self.index(row, 0);
        self.cells[start..].rotate_left(width);
        let top = self.index(self.height - 1, 0);
        for cell in &mut self.cells[top..] {
            *cell = None;
        }
    }

    pub(crate) fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
        self.score = 0;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cells: vec![None; DEFAULT_WIDTH * DEFAULT_HEIGHT],
            score: 0,
        }
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::settle::TileMatrix;

    pub fn empty_board() -> Board {
        Board::default()
    }

    pub fn tile(value: u32) -> Tile {
        match Tile::new(value) {
            Ok(tile) => tile,
            Err(err) => panic!("{err}"),
        }
    }

    /// Builds a tile matrix from value rows, top row first; 0 is empty.
    pub fn matrix(values: &[&[u32]]) -> TileMatrix {
        let rows: Vec<Vec<Option<Tile>>> = values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v == 0 { None } else { Some(tile(v)) })
                    .collect()
            })
            .collect();
        match TileMatrix::from_rows(rows) {
            Ok(m) => m,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn place(board: &mut Board, row: usize, col: usize, value: u32) {
        board.put(row, col, tile(value));
    }

    /// Stacks `values` in `col` starting at row 0.
    pub fn stack(board: &mut Board, col: usize, values: &[u32]) {
        for (row, &value) in values.iter().enumerate() {
            place(board, row, col, value);
        }
    }

    pub fn fill_row(board: &mut Board, row: usize, value: u32) {
        for col in 0..board.width() {
            place(board, row, col, value);
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, row: usize, value: u32, gap_col: usize) {
        for col in 0..board.width() {
            if col != gap_col {
                place(board, row, col, value);
            }
        }
    }
}
