use alloc::vec::Vec;
use ndarray::Array2;

use crate::*;

/// How much of the first-stepped area must stay free of mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StartTile {
    Random,
    SimpleSafe,
    AlwaysZero,
}

/// Seeded mine placement. The same size, mine count, seed and start cell
/// always produce the same layout.
#[derive(Clone, Debug, PartialEq)]
pub struct MinePlacer {
    seed: Seed,
    start: Coord2,
    start_tile: StartTile,
}

impl MinePlacer {
    pub fn new(seed: Seed, start: Coord2, start_tile: StartTile) -> Self {
        Self {
            seed,
            start,
            start_tile,
        }
    }

    pub fn place(&self, size: Coord2, mines: CellCount) -> Array2<bool> {
        use StartTile::*;
        use rand::prelude::*;

        let total_cells = mult(size.0, size.1);
        let start_in_board = in_bounds(self.start, size);

        let requested = mines;
        let mines = mines.min(total_cells.saturating_sub(1));
        if mines != requested {
            log::warn!(
                "Minefield cannot hold {} mines with a safe start, placing {}",
                requested,
                mines
            );
        }

        let zero_zone = BoardIter::around(self.start)
            .filter(|&pos| in_bounds(pos, size))
            .count() as CellCount;

        let actual_start_tile = match self.start_tile {
            _ if !start_in_board => Random,
            Random => Random,
            SimpleSafe => SimpleSafe,
            AlwaysZero if mines + zero_zone > total_cells => {
                log::warn!("Cannot make start tile zero, fallback to simple safe");
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        };

        let excluded = |pos: Coord2| match actual_start_tile {
            Random => false,
            SimpleSafe => pos == self.start,
            AlwaysZero => (pos.0 - self.start.0).abs() <= 1 && (pos.1 - self.start.1).abs() <= 1,
        };

        let mut candidates: Vec<Coord2> = BoardIter::whole(size)
            .filter(|&pos| !excluded(pos))
            .collect();

        let mut rng = SmallRng::seed_from_u64(self.seed.to_u64());
        let mines = (mines as usize).min(candidates.len());

        // partial Fisher-Yates, only the first `mines` slots matter
        for i in 0..mines {
            let j = rng.random_range(i..candidates.len());
            candidates.swap(i, j);
        }

        let mut mine_mask: Array2<bool> = Array2::default(grid_shape(size));
        for &pos in &candidates[..mines] {
            mine_mask[pos.to_nd_index()] = true;
        }
        mine_mask
    }
}
