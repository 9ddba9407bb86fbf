use core::fmt;
use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use grid_util::SimpleValueGrid;
use itertools::iproduct;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::IMPASSABLE_COST;

/// Offsets of the 8-neighbourhood in the order [CostGrid::adjacent] reports them: the rows above,
/// level with and below the cell, each from left to right.
const ADJACENT_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// [CostGrid] stores a traversal cost per cell in a [SimpleValueGrid]. Cells whose cost is at or
/// below [IMPASSABLE_COST] are obstacles. It also keeps the connected components of the
/// traversable cells in a [UnionFind] structure so that callers can rule out hopeless searches
/// without flood-filling the grid.
#[derive(Clone, Debug)]
pub struct CostGrid {
    pub grid: SimpleValueGrid<f32>,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl Default for CostGrid {
    fn default() -> CostGrid {
        CostGrid {
            grid: SimpleValueGrid::new(0, 0, 1.0),
            components: UnionFind::new(0),
            components_dirty: false,
        }
    }
}

impl CostGrid {
    pub fn cost(&self, cell: &Point) -> f32 {
        debug_assert!(self.in_bounds(cell), "{} is outside the grid", cell);
        self.grid.get_point(*cell)
    }

    pub fn set_cost(&mut self, cell: &Point, cost: f32) {
        self.set(cell.x, cell.y, cost);
    }

    pub fn in_bounds(&self, cell: &Point) -> bool {
        self.grid.point_in_bounds(*cell)
    }

    /// Whether the cell lies on the grid and may be entered.
    pub fn is_traversable(&self, cell: &Point) -> bool {
        self.in_bounds(cell) && self.grid.get_point(*cell) > IMPASSABLE_COST
    }

    /// Writes the in-bounds 8-neighbours of `cell` into `buffer`, at most `buffer.len()` of them,
    /// and returns how many were written. Obstacles are included; filtering them is up to the
    /// caller.
    pub fn adjacent(&self, cell: &Point, buffer: &mut [Point]) -> usize {
        let mut count = 0;
        for (dx, dy) in ADJACENT_OFFSETS {
            if count == buffer.len() {
                break;
            }
            let neighbour = Point::new(cell.x + dx, cell.y + dy);
            if self.in_bounds(&neighbour) {
                buffer[count] = neighbour;
                count += 1;
            }
        }
        count
    }

    pub fn neighbours(&self, cell: &Point) -> SmallVec<[Point; 8]> {
        let mut buffer = [Point::new(0, 0); 8];
        let count = self.adjacent(cell, &mut buffer);
        SmallVec::from_slice(&buffer[..count])
    }

    /// Checks whether a search from start could possibly reach goal, based on the connected
    /// components. The start cell itself may be an obstacle: searches leave it regardless of its
    /// cost.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        if !self.in_bounds(start) || !self.in_bounds(goal) {
            return false;
        }
        if start == goal {
            return true;
        }
        if !self.is_traversable(goal) {
            return false;
        }
        let goal_ix = self.grid.get_ix_point(goal);
        if self.is_traversable(start) {
            self.components
                .equiv(self.grid.get_ix_point(start), goal_ix)
        } else {
            self.neighbours(start)
                .iter()
                .filter(|n| self.is_traversable(n))
                .any(|n| self.components.equiv(self.grid.get_ix_point(n), goal_ix))
        }
    }

    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        !self.reachable(start, goal)
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up traversable neighbours. Only the
    /// forward half of the neighbourhood is visited; the other half is covered from the
    /// neighbour's side.
    pub fn generate_components(&mut self) {
        let w = self.grid.width();
        let h = self.grid.height();
        self.components = UnionFind::new(w * h);
        self.components_dirty = false;
        for (x, y) in iproduct!(0..w as i32, 0..h as i32) {
            let point = Point::new(x, y);
            if !self.is_traversable(&point) {
                continue;
            }
            let parent_ix = self.grid.get_ix_point(&point);
            for (dx, dy) in [(1, -1), (1, 0), (1, 1), (0, 1)] {
                let n = Point::new(x + dx, y + dy);
                if self.is_traversable(&n) {
                    let ix = self.grid.get_ix_point(&n);
                    self.components.union(parent_ix, ix);
                }
            }
        }
    }
}

impl fmt::Display for CostGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Grid:")?;
        for y in 0..self.grid.height() as i32 {
            let values = (0..self.grid.width() as i32)
                .map(|x| self.grid.get(x, y))
                .collect::<Vec<f32>>();
            writeln!(f, "{:?}", values)?;
        }
        Ok(())
    }
}

impl ValueGrid<f32> for CostGrid {
    fn new(width: usize, height: usize, default_value: f32) -> Self {
        let mut base_grid = CostGrid {
            grid: SimpleValueGrid::new(width, height, default_value),
            components: UnionFind::new(width * height),
            components_dirty: false,
        };
        base_grid.generate_components();
        base_grid
    }
    fn get(&self, x: i32, y: i32) -> f32 {
        self.grid.get(x, y)
    }
    /// Updates a cell's cost. Newly traversable cells are joined with their neighbours' components;
    /// a cell becoming an obstacle may split a component, so the components are flagged as dirty.
    fn set(&mut self, x: i32, y: i32, cost: f32) {
        let p = Point::new(x, y);
        let was_traversable = self.is_traversable(&p);
        self.grid.set(x, y, cost);
        if cost > IMPASSABLE_COST {
            let p_ix = self.grid.get_ix_point(&p);
            for n in self.neighbours(&p) {
                if self.is_traversable(&n) {
                    self.components.union(p_ix, self.grid.get_ix_point(&n));
                }
            }
        } else if was_traversable {
            self.components_dirty = true;
        }
    }
    fn width(&self) -> usize {
        self.grid.width()
    }
    fn height(&self) -> usize {
        self.grid.height()
    }
}
