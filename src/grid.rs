//! Cell grid and coordinate types.

use core::fmt;

use itertools::iproduct;

/// A cell coordinate within a [`Grid`].
///
/// Used as the key of the voice registry, so it is cheap to copy and hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for CellId {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A fixed-size, row-major grid of boolean cells.
///
/// The dimensions never change for the lifetime of a `Grid`; resizing builds
/// a new one (see [`Grid::resized`]). Every indexed access is checked against
/// the current `rows`/`cols`, so out-of-range lookups return `None` instead of
/// aliasing into a neighbouring row.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Build a grid with the given cells alive. Out-of-range cells are ignored.
    pub fn with_live_cells<I, C>(rows: usize, cols: usize, live: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellId>,
    {
        let mut grid = Self::new(rows, cols);
        for cell in live {
            let cell = cell.into();
            grid.set(cell.row, cell.col, true);
        }
        grid
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Flat index of `(row, col)`, or `None` if it lies outside the grid.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// State of a cell, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Whether a cell is alive. Out-of-bounds cells are reported dead.
    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col).unwrap_or(false)
    }

    /// Set a cell's state. Returns `false` (and does nothing) if out of bounds.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = alive;
                true
            }
            None => false,
        }
    }

    /// Flip a cell. Returns `false` (and does nothing) if out of bounds.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = !self.cells[i];
                true
            }
            None => false,
        }
    }

    /// Kill every cell in place.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Every coordinate of the grid, row-major.
    pub fn coords(&self) -> impl Iterator<Item = CellId> {
        iproduct!(0..self.rows, 0..self.cols).map(CellId::from)
    }

    /// Coordinates of the live cells, row-major.
    pub fn live_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(move |(i, _)| CellId::new(i / cols, i % cols))
    }

    /// Number of live Moore neighbours of `(row, col)`.
    ///
    /// Edges are clamped: positions outside the grid are not neighbours and
    /// nothing wraps around.
    pub fn live_neighbors(&self, row: usize, col: usize) -> u32 {
        let row_range = row.saturating_sub(1)..(row + 2).min(self.rows);
        let col_range = col.saturating_sub(1)..(col + 2).min(self.cols);

        iproduct!(row_range, col_range)
            .filter(|&(r, c)| (r, c) != (row, col))
            .filter(|&(r, c)| self.cells[r * self.cols + c])
            .count() as u32
    }

    /// A new grid of the requested size holding the overlapping top-left
    /// rectangle of this one. Cells outside the overlap are dead.
    pub fn resized(&self, rows: usize, cols: usize) -> Self {
        let mut next = Self::new(rows, cols);
        let keep_rows = self.rows.min(rows);
        let keep_cols = self.cols.min(cols);

        for row in 0..keep_rows {
            let src = row * self.cols;
            let dst = row * cols;
            next.cells[dst..dst + keep_cols].copy_from_slice(&self.cells[src..src + keep_cols]);
        }

        next
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            for &alive in row {
                f.write_str(if alive { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
