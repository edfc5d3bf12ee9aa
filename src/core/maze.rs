//! Procedural maze generation.
//!
//! Mazes are cell grids where every cell is either [`Cell::Wall`] or
//! [`Cell::Floor`]. Logical maze cells sit on odd coordinates; the even rows
//! and columns between them are the walls that get knocked out while carving.
//!
//! ```text
//! #######
//! #   # #
//! ### # #
//! #     #
//! #######
//! ```

use core::fmt;

use crate::error::{SimError, SimResult};
use crate::prng::Prng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Cell {
    Wall,
    Floor,
}

impl Cell {
    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }

    pub fn as_char(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Floor => ' ',
        }
    }
}

/// Upper bound on the cell count of a generated or widened grid.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Size of `width`×`height` widened by `factor`, or `None` when the result
/// overflows or exceeds [`MAX_GRID_CELLS`].
pub fn widened_dims(width: usize, height: usize, factor: usize) -> Option<(usize, usize)> {
    let w = width.checked_mul(factor)?;
    let h = height.checked_mul(factor)?;
    w.checked_mul(h)
        .filter(|&cells| cells <= MAX_GRID_CELLS)
        .map(|_| (w, h))
}

/// Row-major rectangular cell matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid where every cell is wall.
    pub fn solid(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    /// A walled rectangle with an open interior (no inner walls).
    pub fn open_room(width: usize, height: usize) -> Self {
        let mut grid = Self::solid(width, height);
        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                grid.set(x, y, Cell::Floor);
            }
        }
        grid
    }

    /// Parse a layout where `#` is wall and anything else is floor.
    ///
    /// Short rows are padded with wall so the grid stays rectangular.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> SimResult<Self> {
        let height = rows.len();
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(SimError::InvalidConfig("grid layout is empty"));
        }

        let mut grid = Self::solid(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                if ch != '#' {
                    grid.set(x, y, Cell::Floor);
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[self.idx(x, y)])
    }

    pub fn is_floor(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(Cell::Floor)
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            let i = self.idx(x, y);
            self.cells[i] = cell;
        }
    }

    pub fn floor_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_wall()).count()
    }

    /// One string per row, `#` for wall and space for floor.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|c| c.as_char()).collect())
            .collect()
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Carve a perfect maze with randomized iterative depth-first backtracking.
///
/// Carving starts at `(1, 1)` and walks the odd-coordinate lattice two cells
/// at a time, opening the wall in between. Every odd lattice cell ends up
/// reachable and the corridors form a tree. The border is never touched.
pub fn generate(width: usize, height: usize, rng: &mut Prng) -> SimResult<Grid> {
    if width < 3
        || height < 3
        || width % 2 == 0
        || height % 2 == 0
        || widened_dims(width, height, 1).is_none()
    {
        return Err(SimError::InvalidMazeDimensions { width, height });
    }

    let mut grid = Grid::solid(width, height);
    let mut stack: Vec<(usize, usize)> = Vec::new();
    grid.set(1, 1, Cell::Floor);
    stack.push((1, 1));

    const STEPS: [(isize, isize); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

    while let Some(&(x, y)) = stack.last() {
        let mut neighbors = [(0usize, 0usize); 4];
        let mut n = 0usize;

        for (dx, dy) in STEPS {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 1 || ny < 1 || nx >= width as isize - 1 || ny >= height as isize - 1 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if grid.get(nx, ny) == Some(Cell::Wall) {
                neighbors[n] = (nx, ny);
                n += 1;
            }
        }

        if n == 0 {
            stack.pop();
            continue;
        }

        let (nx, ny) = neighbors[rng.gen_range_usize(0, n)];
        grid.set((x + nx) / 2, (y + ny) / 2, Cell::Floor);
        grid.set(nx, ny, Cell::Floor);
        stack.push((nx, ny));
    }

    Ok(grid)
}

/// Scale every cell up into a `factor`×`factor` block of the same kind.
///
/// Corridors become `factor` cells wide and walls `factor` cells thick, so
/// connectivity is unchanged.
pub fn widen(grid: &Grid, factor: usize) -> SimResult<Grid> {
    if factor == 0 {
        return Err(SimError::InvalidWidenFactor(factor));
    }
    let (out_w, out_h) = widened_dims(grid.width, grid.height, factor)
        .ok_or(SimError::InvalidWidenFactor(factor))?;
    if factor == 1 {
        return Ok(grid.clone());
    }

    let mut out = Grid::solid(out_w, out_h);
    for y in 0..grid.height {
        for x in 0..grid.width {
            if grid.is_floor(x, y) {
                for by in 0..factor {
                    for bx in 0..factor {
                        out.set(x * factor + bx, y * factor + by, Cell::Floor);
                    }
                }
            }
        }
    }
    Ok(out)
}
