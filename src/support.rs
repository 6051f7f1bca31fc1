//! Ground connectivity.
//!
//! A tile is supported when it sits on row 0 or is 4-connected (no diagonals)
//! through occupied cells to a tile that does. Support is recomputed from
//! scratch on every settle cycle with a breadth-first flood fill seeded from
//! the ground row, so arbitrarily winding support paths are always found.

use std::collections::VecDeque;

use crate::board::Board;

const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Recomputes every tile's `supported` flag. Occupancy is not changed.
pub fn compute_support(board: &mut Board) {
    for tile in board.tiles_mut() {
        tile.supported = false;
    }

    let mut frontier = VecDeque::new();
    for col in 0..board.width() {
        if let Some(tile) = board.get_mut(0, col) {
            tile.supported = true;
            frontier.push_back((0usize, col));
        }
    }

    while let Some((row, col)) = frontier.pop_front() {
        for (dr, dc) in NEIGHBORS {
            let nr = row as i32 + dr;
            let nc = col as i32 + dc;
            if !board.is_inside(nr, nc) {
                continue;
            }
            let (nr, nc) = (nr as usize, nc as usize);
            if let Some(tile) = board.get_mut(nr, nc) {
                if !tile.supported {
                    tile.supported = true;
                    frontier.push_back((nr, nc));
                }
            }
        }
    }
}

/// Removes every tile not connected to the ground, scoring its value.
/// Returns the number of tiles removed.
pub fn eliminate_floating(board: &mut Board) -> u32 {
    compute_support(board);

    let mut removed = 0;
    let mut points = 0u64;
    for row in 0..board.height() {
        for col in 0..board.width() {
            if board.get(row, col).is_some_and(|tile| !tile.is_supported()) {
                if let Some(tile) = board.take(row, col) {
                    points += u64::from(tile.value());
                    removed += 1;
                }
            }
        }
    }
    board.add_score(points);
    removed
}
