use core::fmt;
use grid_util::point::Point;
use itertools::Itertools;
use log::{info, warn};
use std::time::{Duration, Instant};

use crate::astar::Search;
use crate::cost_grid::CostGrid;
use crate::heuristic::Heuristic;
use crate::pool::DEFAULT_POOL_CAPACITY;

/// Diagnostics of one search attempt. Not needed for correctness, only for reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchStats {
    pub elapsed: Duration,
    /// Node slots carved out of the pool.
    pub carved: usize,
    /// Slots on the pool's free list when the search ended.
    pub free: usize,
    pub open: usize,
    pub closed: usize,
    pub expanded: usize,
    /// Closed cells that were reached again at a lower cost.
    pub reopened: usize,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.2?}, {} nodes expanded, pool carved {} nodes ({} on free list)",
            self.elapsed, self.expanded, self.carved, self.free
        )
    }
}

/// Result holder of a search: [find](Path::find) fills in the cells from start to goal.
#[derive(Clone, Debug)]
pub struct Path {
    pub cells: Vec<Point>,
    pub heuristic: Heuristic,
    /// Size of the first block of the node pool each search starts with.
    pub pool_capacity: usize,
    stats: Option<SearchStats>,
}

impl Default for Path {
    fn default() -> Path {
        Path::new(Heuristic::default())
    }
}

impl Path {
    pub fn new(heuristic: Heuristic) -> Path {
        Path {
            cells: Vec::new(),
            heuristic,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            stats: None,
        }
    }

    /// Searches for a cheapest route from `start` to `goal`. Entering a cell costs the cell's
    /// cost, whether the step is straight or diagonal. Returns whether a route was found; the
    /// cells are empty otherwise.
    pub fn find(&mut self, grid: &CostGrid, start: Point, goal: Point) -> bool {
        info!("Finding path from cell {} to {}", start, goal);
        self.cells.clear();
        self.stats = None;
        if !grid.in_bounds(&start) || !grid.in_bounds(&goal) {
            warn!("Cells {} and {} must both lie on the grid", start, goal);
            return false;
        }

        let before = Instant::now();
        let mut search = Search::new(grid, self.heuristic, start, goal, self.pool_capacity);
        let result = search.run();
        let stats = search.stats(before.elapsed());
        self.stats = Some(stats);

        match result {
            Some(cells) => {
                info!("Path found in {}", stats);
                self.cells = cells;
                true
            }
            None => {
                info!("No path after {}", stats);
                false
            }
        }
    }

    pub fn cells(&self) -> &[Point] {
        &self.cells
    }

    /// Number of cells, both endpoints included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Diagnostics of the last call to [find](Path::find).
    pub fn stats(&self) -> Option<&SearchStats> {
        self.stats.as_ref()
    }

    /// Sum of the costs of every cell entered after the start, as charged by the search.
    pub fn cost(&self, grid: &CostGrid) -> f32 {
        self.cells.iter().skip(1).map(|c| grid.cost(c)).sum()
    }

    /// Whether each cell is one of the 8 neighbours of the one before it.
    pub fn is_contiguous(&self) -> bool {
        self.cells.iter().tuple_windows().all(|(a, b)| {
            let (dx, dy) = ((a.x - b.x).abs(), (a.y - b.y).abs());
            dx.max(dy) == 1
        })
    }
}
