//! Grid map queries over a generated maze.
//!
//! Positions are continuous and measured in cells; cell `(x, y)` covers
//! `[x, x + 1) × [y, y + 1)`. Anything outside the grid counts as wall.

use hashbrown::HashSet;

use crate::config::MazeConfig;
use crate::error::{SimError, SimResult};
use crate::maze::{self, Grid};
use crate::prng::Prng;

/// Integer cell coordinates.
pub type CellCoord = (usize, usize);

/// 8-neighborhood used when spawning next to another agent.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    grid: Grid,
}

impl GridMap {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    /// Generate a maze and widen its corridors per `cfg`.
    pub fn generate(cfg: &MazeConfig, rng: &mut Prng) -> SimResult<Self> {
        let grid = maze::generate(cfg.width, cfg.height, rng)?;
        let grid = maze::widen(&grid, cfg.corridor_width)?;
        Ok(Self::new(grid))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Wall test at a continuous position. Out of bounds is wall.
    pub fn is_wall(&self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return true;
        }
        let (ix, iy) = (x.floor(), y.floor());
        if ix < 0.0 || iy < 0.0 {
            return true;
        }
        !self.grid.is_floor(ix as usize, iy as usize)
    }

    /// Wall test on integer cell indices (signed so callers can step off the edge).
    pub fn is_wall_cell(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 {
            return true;
        }
        !self.grid.is_floor(x as usize, y as usize)
    }

    /// Circle-vs-grid collision, approximated by the four corners of the
    /// circle's bounding square.
    pub fn blocks_circle(&self, x: f32, y: f32, radius: f32) -> bool {
        [(-radius, -radius), (-radius, radius), (radius, -radius), (radius, radius)]
            .iter()
            .any(|&(ox, oy)| self.is_wall(x + ox, y + oy))
    }

    /// All floor cells in row-major order.
    pub fn free_cells(&self) -> Vec<CellCoord> {
        let w = self.width().max(1);
        self.grid
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_wall())
            .map(|(i, _)| (i % w, i / w))
            .collect()
    }

    /// Center of the first floor cell in row-major order.
    pub fn start_pos(&self) -> SimResult<(f32, f32)> {
        let w = self.width().max(1);
        self.grid
            .cells()
            .iter()
            .position(|c| !c.is_wall())
            .map(|i| cell_center((i % w, i / w)))
            .ok_or(SimError::NoFreeCell)
    }

    /// Center of a uniformly chosen floor cell that is not in `avoid`.
    pub fn find_random_empty(
        &self,
        avoid: &HashSet<CellCoord>,
        rng: &mut Prng,
    ) -> SimResult<(f32, f32)> {
        let candidates: Vec<CellCoord> = self
            .free_cells()
            .into_iter()
            .filter(|c| !avoid.contains(c))
            .collect();
        rng.choose(&candidates)
            .map(|&c| cell_center(c))
            .ok_or(SimError::NoFreeCell)
    }

    /// Center of a random floor cell in the 8-neighborhood of `cell`, if any.
    pub fn adjacent_free_cell(&self, cell: CellCoord, rng: &mut Prng) -> Option<(f32, f32)> {
        let mut offsets = NEIGHBOR_OFFSETS;
        rng.shuffle(&mut offsets);
        offsets.iter().find_map(|&(dx, dy)| {
            let nx = cell.0 as isize + dx;
            let ny = cell.1 as isize + dy;
            if self.is_wall_cell(nx, ny) {
                None
            } else {
                Some(cell_center((nx as usize, ny as usize)))
            }
        })
    }
}

/// Cell containing a continuous position. Callers only pass in-map positions.
pub fn cell_of(x: f32, y: f32) -> CellCoord {
    (x.max(0.0).floor() as usize, y.max(0.0).floor() as usize)
}

pub fn cell_center(cell: CellCoord) -> (f32, f32) {
    (cell.0 as f32 + 0.5, cell.1 as f32 + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> GridMap {
        GridMap::new(Grid::open_room(5, 5))
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let map = room();
        assert!(map.is_wall(-0.01, 2.5));
        assert!(map.is_wall(2.5, -3.0));
        assert!(map.is_wall(5.0, 2.5));
        assert!(map.is_wall(2.5, 5.2));
        assert!(map.is_wall(f32::NAN, 2.5));
        assert!(map.is_wall_cell(-1, 2));
        assert!(map.is_wall_cell(2, 5));
        assert!(!map.is_wall(2.5, 2.5));
        assert!(!map.is_wall(1.0, 3.999));
        assert!(map.is_wall(0.999, 2.0));
    }

    #[test]
    fn start_pos_is_first_floor_cell_centered() {
        let map = GridMap::new(Grid::from_rows(&["####", "## #", "#  #", "####"]).unwrap());
        assert_eq!(map.start_pos(), Ok((2.5, 1.5)));
        let solid = GridMap::new(Grid::solid(3, 3));
        assert_eq!(solid.start_pos(), Err(SimError::NoFreeCell));
    }

    #[test]
    fn random_empty_respects_avoid_set() {
        let map = room();
        let mut rng = Prng::new(17);
        let mut avoid: HashSet<CellCoord> = map.free_cells().into_iter().collect();
        avoid.remove(&(3, 2));
        for _ in 0..20 {
            assert_eq!(map.find_random_empty(&avoid, &mut rng), Ok((3.5, 2.5)));
        }
        avoid.insert((3, 2));
        assert_eq!(
            map.find_random_empty(&avoid, &mut rng),
            Err(SimError::NoFreeCell)
        );
    }

    #[test]
    fn random_empty_lands_on_cell_centers() {
        let mut rng = Prng::new(8);
        let map = GridMap::generate(
            &MazeConfig {
                width: 9,
                height: 9,
                corridor_width: 2,
            },
            &mut rng,
        )
        .unwrap();
        for _ in 0..50 {
            let (x, y) = map.find_random_empty(&HashSet::new(), &mut rng).unwrap();
            assert_eq!(x.fract(), 0.5);
            assert_eq!(y.fract(), 0.5);
            assert!(!map.is_wall(x, y));
        }
    }

    #[test]
    fn corner_test_catches_walls_only_near_edges() {
        let map = room();
        assert!(!map.blocks_circle(2.5, 2.5, 0.21));
        assert!(!map.blocks_circle(1.25, 1.25, 0.21));
        assert!(map.blocks_circle(1.15, 2.5, 0.21));
        assert!(map.blocks_circle(2.5, 3.85, 0.21));
    }

    #[test]
    fn adjacent_free_cell_stays_next_to_origin() {
        let map = room();
        let mut rng = Prng::new(4);
        for _ in 0..20 {
            let (x, y) = map.adjacent_free_cell((1, 1), &mut rng).unwrap();
            let (cx, cy) = cell_of(x, y);
            assert!(cx.abs_diff(1) <= 1 && cy.abs_diff(1) <= 1);
            assert_ne!((cx, cy), (1, 1));
            assert!(!map.is_wall(x, y));
        }
        let boxed = GridMap::new(Grid::from_rows(&["###", "# #", "###"]).unwrap());
        assert_eq!(boxed.adjacent_free_cell((1, 1), &mut rng), None);
    }
}
