//! Batch routing on top of [Path]: turns pixel routes into cell searches and keeps later routes
//! away from cells taken by earlier ones by raising their cost.
use core::fmt;
use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use log::{info, warn};
use std::time::{Duration, Instant};

use crate::cost_grid::CostGrid;
use crate::heuristic::Heuristic;
use crate::path::Path;
use crate::pool::DEFAULT_POOL_CAPACITY;

mod route;
mod sampling;

pub use route::{parse_routes, Route, RouteParseError};
pub use sampling::{sample_mask, MaskError};

pub const DEFAULT_CELL_SIZE: i32 = 12;
pub const DEFAULT_LAND_COST: f32 = 200.0;
pub const DEFAULT_CROSS_COST: f32 = 10.0;

/// Pixel at the centre of `cell` for cells `cell_size` pixels wide.
pub fn cell_centre(cell: &Point, cell_size: i32) -> Point {
    Point::new(
        cell.x * cell_size + cell_size / 2,
        cell.y * cell_size + cell_size / 2,
    )
}

/// Settings of a [RoutePlanner]. Values out of range are replaced by the defaults in
/// [sanitized](PlannerConfig::sanitized).
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Pixels per cell side.
    pub cell_size: i32,
    /// Cost added for a fully white cell of the mask.
    pub land_cost: f32,
    /// Lowest cost of a cell once a route runs through it.
    pub cross_cost: f32,
    pub heuristic: Heuristic,
    pub pool_capacity: usize,
    /// Check the grid's connected components before searching, so that routes without any
    /// chance of success do not flood the grid.
    pub skip_unreachable: bool,
}

impl Default for PlannerConfig {
    fn default() -> PlannerConfig {
        PlannerConfig {
            cell_size: DEFAULT_CELL_SIZE,
            land_cost: DEFAULT_LAND_COST,
            cross_cost: DEFAULT_CROSS_COST,
            heuristic: Heuristic::default(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
            skip_unreachable: true,
        }
    }
}

impl PlannerConfig {
    /// Selects the heuristic by id, falling back to Manhattan for unknown ids.
    pub fn with_heuristic_id(mut self, id: i32) -> PlannerConfig {
        self.heuristic = Heuristic::from_id(id);
        self
    }

    pub fn sanitized(mut self) -> PlannerConfig {
        if self.cell_size < 1 {
            warn!("Cell size {} too small, using {}", self.cell_size, DEFAULT_CELL_SIZE);
            self.cell_size = DEFAULT_CELL_SIZE;
        }
        if !(self.land_cost >= 1.0) {
            warn!("Land cost {} too small, using {}", self.land_cost, DEFAULT_LAND_COST);
            self.land_cost = DEFAULT_LAND_COST;
        }
        if !(self.cross_cost >= 1.0) {
            warn!("Cross cost {} too small, using {}", self.cross_cost, DEFAULT_CROSS_COST);
            self.cross_cost = DEFAULT_CROSS_COST;
        }
        self
    }
}

/// Outcome of one route of a batch.
#[derive(Clone, Debug)]
pub struct PlannedRoute {
    pub route: Route,
    /// Empty if no path was found.
    pub path: Path,
    cell_size: i32,
}

impl PlannedRoute {
    pub fn found(&self) -> bool {
        !self.path.is_empty()
    }

    /// The path in pixel coordinates for drawing: the route's own endpoints with the centres of
    /// the cells in between. A route within a single cell gives just its two endpoints.
    pub fn anchored_points(&self) -> Vec<Point> {
        let cells = self.path.cells();
        if cells.is_empty() {
            return Vec::new();
        }
        let interior = cells.len().saturating_sub(2);
        let mut points = Vec::with_capacity(interior + 2);
        points.push(self.route.start);
        points.extend(
            cells
                .iter()
                .skip(1)
                .take(interior)
                .map(|c| cell_centre(c, self.cell_size)),
        );
        points.push(self.route.end);
        points
    }
}

/// Everything [RoutePlanner::plan] produced: one entry per requested route, in order.
#[derive(Clone, Debug, Default)]
pub struct PlanReport {
    pub routes: Vec<PlannedRoute>,
    pub elapsed: Duration,
    /// Time spent inside [Path::find], summed over all routes.
    pub searching: Duration,
}

impl PlanReport {
    pub fn found(&self) -> usize {
        self.routes.iter().filter(|p| p.found()).count()
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "routed {} of {} routes in {:.2?} ({:.2?} searching)",
            self.found(),
            self.routes.len(),
            self.elapsed,
            self.searching
        )
    }
}

/// Plans batches of routes. The configuration is sanitized once on construction and can't be
/// changed afterwards.
#[derive(Clone, Debug, Default)]
pub struct RoutePlanner {
    config: PlannerConfig,
}

impl RoutePlanner {
    pub fn new(config: PlannerConfig) -> RoutePlanner {
        RoutePlanner {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn pixel_to_cell(&self, p: &Point) -> Point {
        let d = self.config.cell_size;
        Point::new(p.x.div_euclid(d), p.y.div_euclid(d))
    }

    pub fn cell_to_pixel(&self, c: &Point) -> Point {
        cell_centre(c, self.config.cell_size)
    }

    /// Builds the cost grid for a mask image given as one byte per pixel.
    pub fn sample(&self, mask: &[u8], width: usize, height: usize) -> Result<CostGrid, MaskError> {
        sample_mask(
            mask,
            width,
            height,
            self.config.cell_size as usize,
            self.config.land_cost,
        )
    }

    /// Routes every entry in order. A route that cannot be found is logged and left empty;
    /// every route that is found raises the cost of its cells before the next search.
    pub fn plan(&self, grid: &mut CostGrid, routes: &[Route]) -> PlanReport {
        let before = Instant::now();
        if self.config.skip_unreachable {
            grid.update();
        }
        let mut planned = Vec::with_capacity(routes.len());
        let mut searched = Duration::ZERO;
        for (i, route) in routes.iter().enumerate() {
            let start = self.pixel_to_cell(&route.start);
            let goal = self.pixel_to_cell(&route.end);
            let mut path = Path::new(self.config.heuristic);
            path.pool_capacity = self.config.pool_capacity;
            if self.config.skip_unreachable && grid.unreachable(&start, &goal) {
                warn!("No path found for route {}: {} (not connected)", i, route);
            } else if path.find(grid, start, goal) {
                info!(
                    "Found path of length {} cells for route {}: {}",
                    path.len(),
                    i,
                    route
                );
                self.occupy(grid, &path);
            } else {
                warn!("No path found for route {}: {}", i, route);
            }
            if let Some(stats) = path.stats() {
                searched += stats.elapsed;
            }
            planned.push(PlannedRoute {
                route: *route,
                path,
                cell_size: self.config.cell_size,
            });
        }
        let report = PlanReport {
            routes: planned,
            elapsed: before.elapsed(),
            searching: searched,
        };
        info!("Batch done: {}", report);
        report
    }

    /// Makes the cells of a found path at least `cross_cost` expensive.
    fn occupy(&self, grid: &mut CostGrid, path: &Path) {
        let cross = self.config.cross_cost;
        for cell in path.cells() {
            let cost = grid.cost(cell);
            grid.set(cell.x, cell.y, cost.max(cross));
        }
    }
}
