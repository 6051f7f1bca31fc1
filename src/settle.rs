use crate::board::Board;
use crate::error::GridError;
use crate::merge::merge_all;
use crate::rows::clear_full_rows;
use crate::support::eliminate_floating;
use crate::tile::Tile;

// ============================================================================
// Piece Data Contract
// ============================================================================

/// Board position of a tile matrix's bottom-left corner. `row` may be at or
/// above the board height while a piece is still entering.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Anchor {
    pub row: i32,
    pub col: i32,
}

impl Anchor {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// A rectangular grid of optional tiles. Matrix row 0 is the piece's top row.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TileMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Tile>>,
}

impl TileMatrix {
    pub fn empty(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyMatrix);
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        })
    }

    pub fn from_rows(rows: Vec<Vec<Option<Tile>>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::EmptyMatrix);
        }
        let height = rows.len();
        let mut cells = Vec::with_capacity(height * expected);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != expected {
                return Err(GridError::RaggedMatrix {
                    row,
                    expected,
                    found: cols.len(),
                });
            }
            cells.extend(cols);
        }
        Ok(Self {
            rows: height,
            cols: expected,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Tile> {
        self.cells[row * self.cols + col].as_ref()
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, tile: Option<Tile>) {
        self.cells[row * self.cols + col] = tile;
    }

    /// Values laid out like the matrix, `None` for empty cells.
    pub fn values(&self) -> Vec<Vec<Option<u32>>> {
        (0..self.rows)
            .map(|r| (0..self.cols).map(|c| self.get(r, c).map(Tile::value)).collect())
            .collect()
    }

    /// Occupied cells as `(matrix_row, matrix_col, tile)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_ref().map(|tile| (i / cols, i % cols, tile)))
    }

    /// Board coordinate of matrix cell `(row, col)` when anchored at `anchor`.
    pub fn board_position(&self, anchor: Anchor, row: usize, col: usize) -> (i32, i32) {
        (
            anchor.row + (self.rows - 1 - row) as i32,
            anchor.col + col as i32,
        )
    }

    /// Like `board_position`, but `None` when the coordinate overflows `i32`.
    pub fn checked_board_position(
        &self,
        anchor: Anchor,
        row: usize,
        col: usize,
    ) -> Option<(i32, i32)> {
        let up = i32::try_from(self.rows - 1 - row).ok()?;
        let right = i32::try_from(col).ok()?;
        Some((anchor.row.checked_add(up)?, anchor.col.checked_add(right)?))
    }

    /// Clockwise quarter turn; tiles travel with their cells.
    pub fn rotated_clockwise(&self) -> Self {
        let mut rotated = Self {
            rows: self.cols,
            cols: self.rows,
            cells: vec![None; self.cells.len()],
        };
        for r in 0..self.rows {
            for c in 0..self.cols {
                rotated.set(c, self.rows - 1 - r, self.get(r, c).cloned());
            }
        }
        rotated
    }

    /// Trims empty border rows and columns. Returns the trimmed matrix with
    /// the number of rows dropped from the bottom and columns dropped from
    /// the left, or `None` if no cell is occupied.
    pub fn trimmed(&self) -> Option<(Self, usize, usize)> {
        let mut occupied = self.occupied();
        let (r0, c0, _) = occupied.next()?;
        let (mut top, mut bottom, mut left, mut right) = (r0, r0, c0, c0);
        for (r, c, _) in occupied {
            top = top.min(r);
            bottom = bottom.max(r);
            left = left.min(c);
            right = right.max(c);
        }
        let mut trimmed = Self {
            rows: bottom - top + 1,
            cols: right - left + 1,
            cells: vec![None; (bottom - top + 1) * (right - left + 1)],
        };
        for r in top..=bottom {
            for c in left..=right {
                trimmed.set(r - top, c - left, self.get(r, c).cloned());
            }
        }
        Some((trimmed, self.rows - 1 - bottom, left))
    }
}

// ============================================================================
// Settle Coordinator
// ============================================================================

/// What one settle cycle did to the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SettleOutcome {
    /// A piece cell landed above the top row.
    pub game_over: bool,
    pub merges: u32,
    pub floating_removed: u32,
    pub rows_cleared: u32,
    /// Score gained by this cycle.
    pub points: u64,
}

/// Locks a landed piece into the board, then merges, removes floating tiles
/// and clears full rows, in that order.
///
/// Cells that map above the top row are dropped and signal game over; the
/// rest of the piece still locks and the pipeline still runs. Cells that map
/// left, right or below the board are a caller error and leave the board
/// untouched.
pub fn settle(
    board: &mut Board,
    matrix: TileMatrix,
    anchor: Anchor,
) -> Result<SettleOutcome, GridError> {
    let width = board.width() as i32;
    let mut positions = Vec::with_capacity(matrix.cells.len());
    for (r, c, _) in matrix.occupied() {
        let (row, col) = matrix
            .checked_board_position(anchor, r, c)
            .ok_or(GridError::OutOfBounds {
                row: anchor.row,
                col: anchor.col,
            })?;
        if row < 0 || col < 0 || col >= width {
            return Err(GridError::OutOfBounds { row, col });
        }
        positions.push((row, col));
    }

    let score_before = board.score();
    let mut outcome = SettleOutcome::default();
    let height = board.height() as i32;
    // `occupied` and `flatten` both walk the cells in storage order.
    for (tile, (row, col)) in matrix.cells.into_iter().flatten().zip(positions) {
        if row >= height {
            outcome.game_over = true;
        } else {
            board.put(row as usize, col as usize, tile);
        }
    }
    log::debug!("locked piece at {anchor:?}, game over: {}", outcome.game_over);

    outcome.merges = merge_all(board);
    outcome.floating_removed = eliminate_floating(board);
    outcome.rows_cleared = clear_full_rows(board);
    outcome.points = board.score() - score_before;
    log::debug!(
        "settled: {} merges, {} floating, {} rows, +{}",
        outcome.merges,
        outcome.floating_removed,
        outcome.rows_cleared,
        outcome.points
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_helpers::*;

    #[test]
    fn ragged_and_empty_matrices_are_rejected() {
        assert_eq!(
            TileMatrix::from_rows(vec![vec![None, None], vec![None]]),
            Err(GridError::RaggedMatrix {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(TileMatrix::from_rows(vec![]), Err(GridError::EmptyMatrix));
        assert_eq!(TileMatrix::from_rows(vec![vec![]]), Err(GridError::EmptyMatrix));
    }

    #[test]
    fn matrix_row_zero_maps_to_highest_board_row() {
        let mut board = empty_board();
        // 2 .
        // 4 8
        let outcome = settle(&mut board, matrix(&[&[2, 0], &[4, 8]]), Anchor::new(0, 3)).unwrap();

        assert!(!outcome.game_over);
        assert_eq!(board.value_at(0, 3), Some(4));
        assert_eq!(board.value_at(0, 4), Some(8));
        assert_eq!(board.value_at(1, 3), Some(2));
    }

    #[test]
    fn locked_pair_merges() {
        let mut board = empty_board();
        stack(&mut board, 0, &[2]);

        let outcome = settle(&mut board, matrix(&[&[2]]), Anchor::new(1, 0)).unwrap();

        assert_eq!(outcome.merges, 1);
        assert_eq!(outcome.points, 4);
        assert_eq!(board.value_at(0, 0), Some(4));
    }

    #[test]
    fn cell_above_top_signals_game_over_but_still_locks() {
        let mut board = empty_board();
        let top = board.height() as i32 - 1;
        for row in 0..board.height() - 1 {
            place(&mut board, row, 0, if row % 2 == 0 { 2 } else { 4 });
        }

        // Vertical pair whose lower cell lands on the top row.
        let outcome = settle(&mut board, matrix(&[&[8], &[16]]), Anchor::new(top, 0)).unwrap();

        assert!(outcome.game_over);
        assert_eq!(board.value_at(top as usize, 0), Some(16));
    }

    #[test]
    fn sideways_out_of_range_is_rejected_without_mutation() {
        let mut board = empty_board();
        place(&mut board, 0, 0, 2);
        let before = board.clone();
        let width = board.width() as i32;

        let err = settle(&mut board, matrix(&[&[2, 2]]), Anchor::new(0, width - 1)).unwrap_err();

        assert_eq!(err, GridError::OutOfBounds { row: 0, col: width });
        assert_eq!(board, before);
    }

    #[test]
    fn below_ground_is_rejected() {
        let mut board = empty_board();
        let err = settle(&mut board, matrix(&[&[2]]), Anchor::new(-1, 0)).unwrap_err();
        assert_eq!(err, GridError::OutOfBounds { row: -1, col: 0 });
    }

    #[test]
    fn anchor_overflowing_i32_is_rejected() {
        let mut board = empty_board();
        let before = board.clone();

        let tall = settle(&mut board, matrix(&[&[2], &[2]]), Anchor::new(i32::MAX, 0));
        let wide = settle(&mut board, matrix(&[&[2, 2]]), Anchor::new(0, i32::MAX));

        assert_eq!(tall, Err(GridError::OutOfBounds { row: i32::MAX, col: 0 }));
        assert_eq!(wide, Err(GridError::OutOfBounds { row: 0, col: i32::MAX }));
        assert_eq!(board, before);
    }

    #[test]
    fn pipeline_runs_merge_then_floating_then_rows() {
        let mut board = empty_board();
        let width = board.width();
        // Ground row full except column 0; a 4 overhangs from column 1.
        fill_row_with_gap(&mut board, 0, 2, 0);
        place(&mut board, 1, 1, 4);
        place(&mut board, 1, 0, 8);

        // Drop a lone 2 into the gap: row 0 fills. The column-0 8 now rests
        // on it. Row 0 clears, the row above drops to the ground.
        let outcome = settle(&mut board, matrix(&[&[2]]), Anchor::new(0, 0)).unwrap();

        assert_eq!(outcome.merges, 0);
        assert_eq!(outcome.floating_removed, 0);
        assert_eq!(outcome.rows_cleared, 1);
        assert_eq!(outcome.points, 2 * width as u64);
        assert_eq!(board.value_at(0, 0), Some(8));
        assert_eq!(board.value_at(0, 1), Some(4));
    }

    #[test]
    fn merge_can_leave_tiles_floating() {
        let mut board = empty_board();
        stack(&mut board, 1, &[2]);
        place(&mut board, 1, 2, 16);

        // The dropped 2 lands beside the 16 and merges down into column 1,
        // leaving the 16 with nothing under or beside it.
        let outcome = settle(&mut board, matrix(&[&[2]]), Anchor::new(1, 1)).unwrap();

        assert_eq!(outcome.merges, 1);
        assert_eq!(outcome.floating_removed, 1);
        assert_eq!(outcome.points, 4 + 16);
        assert_eq!(board.value_at(1, 2), None);
        assert_eq!(board.value_at(0, 1), Some(4));
    }

    #[test]
    fn trimmed_reports_bottom_and_left_offsets() {
        let m = matrix(&[&[0, 0, 0], &[0, 2, 4], &[0, 0, 0]]);
        let (trimmed, bottom, left) = m.trimmed().unwrap();
        assert_eq!(trimmed.values(), vec![vec![Some(2), Some(4)]]);
        assert_eq!((bottom, left), (1, 1));
    }

    #[test]
    fn rotation_carries_values() {
        // 2 4      8 2
        // 8 .  ->  . 4
        let m = matrix(&[&[2, 4], &[8, 0]]);
        assert_eq!(
            m.rotated_clockwise().values(),
            vec![vec![Some(8), Some(2)], vec![None, Some(4)]]
        );
    }
}
