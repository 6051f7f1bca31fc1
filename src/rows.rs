use crate::board::Board;

/// Clears every full row, scoring the values of its tiles, and drops the
/// rows above it. Returns the number of rows cleared.
pub fn clear_full_rows(board: &mut Board) -> u32 {
    let mut cleared = 0;
    for row in 0..board.height() {
        // Don't advance until this index holds a row that isn't full; a
        // stacked run of full rows collapses into the same index.
        while board.is_row_full(row) {
            let points = board.drain_row(row);
            board.add_score(points);
            board.collapse_rows(row);
            cleared += 1;
            log::trace!("cleared row {row} for {points}");
        }
    }
    cleared
}
