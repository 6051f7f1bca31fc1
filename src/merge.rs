use crate::board::Board;
use crate::tile::Tile;

/// Merges equal vertically adjacent tiles in every column until none remain.
///
/// Each merge doubles the lower tile, scores the doubled value, removes the
/// upper tile and drops everything above it by one row. The column is then
/// rescanned from the bottom, so merges cascade. A pair that would overflow
/// `u32` stays in place. Returns the number of merges.
pub fn merge_all(board: &mut Board) -> u32 {
    let mut merges = 0;
    for col in 0..board.width() {
        while merge_once(board, col) {
            merges += 1;
        }
    }
    merges
}

/// Performs the lowest merge available in `col`, if any.
fn merge_once(board: &mut Board, col: usize) -> bool {
    for row in 0..board.height().saturating_sub(1) {
        let (Some(lower), Some(upper)) = (board.value_at(row, col), board.value_at(row + 1, col))
        else {
            continue;
        };
        if lower != upper {
            continue;
        }
        let Some(merged) = board.get_mut(row, col).and_then(Tile::double) else {
            continue;
        };
        board.add_score(u64::from(merged));
        board.collapse_column(col, row + 1);
        log::trace!("merged column {col} row {row} into {merged}");
        return true;
    }
    false
}
