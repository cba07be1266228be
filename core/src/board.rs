use alloc::collections::VecDeque;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::*;

/// The playfield: three same-sized bitmaps for mines, flags and revealed cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    mines: Array2<bool>,
    flags: Array2<bool>,
    revealed: Array2<bool>,
}

impl Board {
    pub fn new((width, height): Coord2) -> Self {
        let shape = grid_shape((width.max(1), height.max(1)));
        Self {
            mines: Array2::default(shape),
            flags: Array2::default(shape),
            revealed: Array2::default(shape),
        }
    }

    /// Builds a board from text rows, one char per cell:
    /// `.` hidden, `@` revealed, `*` mine, `+` flagged mine, `!` flagged safe cell.
    pub fn from_layout(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 || rows.iter().any(|row| row.chars().count() != width) {
            return Err(GameError::InvalidBoardShape);
        }

        let mut board = Self::new((width as Coord, height as Coord));
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let index = [y, x];
                match ch {
                    '.' => {}
                    '@' => board.revealed[index] = true,
                    '*' => board.mines[index] = true,
                    '+' => {
                        board.mines[index] = true;
                        board.flags[index] = true;
                    }
                    '!' => board.flags[index] = true,
                    _ => return Err(GameError::InvalidBoardShape),
                }
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.mines)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len() as CellCount
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        in_bounds(coords, self.size())
    }

    pub fn is_mine(&self, coords: Coord2) -> bool {
        self.mines[coords.to_nd_index()]
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flags[coords.to_nd_index()]
    }

    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.revealed[coords.to_nd_index()]
    }

    pub fn set_mine(&mut self, coords: Coord2, value: bool) {
        self.mines[coords.to_nd_index()] = value;
    }

    pub fn set_flag(&mut self, coords: Coord2, value: bool) {
        self.flags[coords.to_nd_index()] = value;
    }

    pub fn set_revealed(&mut self, coords: Coord2, value: bool) {
        self.revealed[coords.to_nd_index()] = value;
    }

    pub fn mines(&self) -> &Array2<bool> {
        &self.mines
    }

    pub fn flags(&self) -> &Array2<bool> {
        &self.flags
    }

    pub fn revealed(&self) -> &Array2<bool> {
        &self.revealed
    }

    pub(crate) fn set_mine_mask(&mut self, mines: Array2<bool>) {
        debug_assert_eq!(mines.dim(), self.mines.dim());
        self.mines = mines;
    }

    pub fn has_mines(&self) -> bool {
        self.mines.iter().any(|&is_mine| is_mine)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mines.iter().filter(|&&is_mine| is_mine).count() as CellCount
    }

    pub fn flag_count(&self) -> CellCount {
        self.flags.iter().filter(|&&is_flag| is_flag).count() as CellCount
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed.iter().filter(|&&is_revealed| is_revealed).count() as CellCount
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mines.iter_neighbors(coords)
    }

    /// Mines in the Moore neighborhood, the center excluded.
    pub fn neighbor_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.is_mine(pos))
            .count() as u8
    }

    pub fn neighbor_flag_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.is_flagged(pos))
            .count() as u8
    }

    /// Neighbors that are neither revealed nor flagged.
    pub fn has_open_neighbor(&self, coords: Coord2) -> bool {
        self.iter_neighbors(coords)
            .any(|pos| !self.is_revealed(pos) && !self.is_flagged(pos))
    }

    /// Player-visible state, or `None` outside the board.
    pub fn cell_at(&self, coords: Coord2) -> Option<CellView> {
        if !self.contains(coords) {
            return None;
        }
        Some(if self.is_revealed(coords) {
            CellView::Revealed(self.neighbor_mine_count(coords))
        } else if self.is_flagged(coords) {
            CellView::Flagged
        } else {
            CellView::Hidden
        })
    }

    /// Reveals `coords` and, while the revealed cell has no adjacent mines,
    /// keeps spreading to its neighbors. Mines are never revealed; flags are
    /// ignored here and cleaned up by [`Board::clear_revealed_flags`].
    pub fn spread_safe_area(&mut self, coords: Coord2) {
        let mut to_visit = VecDeque::from([coords]);

        while let Some(visit_coords) = to_visit.pop_front() {
            if !self.contains(visit_coords)
                || self.is_revealed(visit_coords)
                || self.is_mine(visit_coords)
            {
                continue;
            }

            self.set_revealed(visit_coords, true);

            if self.neighbor_mine_count(visit_coords) == 0 {
                to_visit.extend(
                    self.iter_neighbors(visit_coords)
                        .filter(|&pos| !self.is_revealed(pos)),
                );
            }
        }
    }

    pub fn clear_revealed_flags(&mut self) {
        Zip::from(&mut self.flags)
            .and(&self.revealed)
            .for_each(|flag, &revealed| {
                if revealed {
                    *flag = false;
                }
            });
    }

    /// Every non-mine cell is revealed.
    pub fn is_cleared(&self) -> bool {
        Zip::from(&self.mines)
            .and(&self.revealed)
            .all(|&mine, &revealed| mine || revealed)
    }

    /// Whether any of the three bitmaps differ.
    pub fn differs_from(&self, other: &Self) -> bool {
        self != other
    }
}
