use ndarray::Array2;

/// Single coordinate axis. Signed so that neighborhoods and sub-regions may
/// reach past the board edge; callers test the result against the board.
pub type Coord = i32;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Grids are stored row-major with shape `(height, width)`, so `(x, y)` lives
/// at `[y, x]` and the flat index is `x + y * width`.
pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.1 as usize, self.0 as usize]
    }
}

/// Shape of a grid holding a board of `size`.
pub const fn grid_shape((width, height): Coord2) -> (usize, usize) {
    (height as usize, width as usize)
}

/// Board size recovered from a grid shape.
pub fn grid_size<T>(grid: &Array2<T>) -> Coord2 {
    let (height, width) = grid.dim();
    (width as Coord, height as Coord)
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = if a < 0 { 0 } else { a as CellCount };
    let b = if b < 0 { 0 } else { b as CellCount };
    a.saturating_mul(b)
}

pub const fn in_bounds((x, y): Coord2, (width, height): Coord2) -> bool {
    x >= 0 && x < width && y >= 0 && y < height
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, grid_size(self))
    }
}

pub trait NeighborCellIterExt<T>: NeighborIterExt {
    fn iter_neighbor_cells_with_index(&self, index: Coord2) -> impl Iterator<Item = (Coord2, T)>;

    fn iter_neighbor_cells(&self, index: Coord2) -> impl Iterator<Item = T> {
        self.iter_neighbor_cells_with_index(index)
            .map(|(_, cell)| cell)
    }
}

impl<T: Copy> NeighborCellIterExt<T> for Array2<T> {
    fn iter_neighbor_cells_with_index(&self, index: Coord2) -> impl Iterator<Item = (Coord2, T)> {
        self.iter_neighbors(index)
            .map(|index| (index, self[index.to_nd_index()]))
    }
}

const DISPLACEMENTS: [Coord2; 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: Coord2, bounds: Coord2) -> Option<Coord2> {
    let next = (coords.0.checked_add(delta.0)?, coords.1.checked_add(delta.1)?);
    in_bounds(next, bounds).then_some(next)
}

/// The in-bounds Moore neighbors of a cell, excluding the cell itself.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

/// Inclusive cursor over a rectangular sub-region, row by row.
///
/// The region is not clamped to any board, so callers must test yielded
/// coordinates themselves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoardIter {
    min: Coord2,
    max: Coord2,
    current: Coord2,
}

impl BoardIter {
    pub const fn new(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Self {
        let min = (if x1 < x2 { x1 } else { x2 }, if y1 < y2 { y1 } else { y2 });
        let max = (if x1 > x2 { x1 } else { x2 }, if y1 > y2 { y1 } else { y2 });
        Self {
            min,
            max,
            current: min,
        }
    }

    /// The 3×3 block centered at `center`, center included.
    pub const fn around((x, y): Coord2) -> Self {
        Self::new(x - 1, y - 1, x + 1, y + 1)
    }

    /// Every cell of a board of `size`.
    pub const fn whole((width, height): Coord2) -> Self {
        Self::new(0, 0, width - 1, height - 1)
    }

    pub const fn has_next(&self) -> bool {
        self.current.1 <= self.max.1
    }

    /// Returns the current cell and advances. Past the end it keeps returning
    /// cells below the region, so check `has_next` first.
    pub fn get_next(&mut self) -> Coord2 {
        let item = self.current;

        self.current.0 += 1;
        if self.current.0 > self.max.0 {
            self.current.0 = self.min.0;
            self.current.1 += 1;
        }

        item
    }

    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

impl Iterator for BoardIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        self.has_next().then(|| self.get_next())
    }
}
