//! # route_pathfinding
//!
//! Cheapest paths on weighted grids using [A*](https://en.wikipedia.org/wiki/A*_search_algorithm)
//! with 8-adjacency. Every cell carries a cost that is paid on entering it; cells costing
//! [IMPASSABLE_COST] or less can't be entered. Search nodes live in a growable [NodePool], and
//! closed cells are reopened when reached again more cheaply, so any of the [Heuristic]s can be
//! used, admissible or not.
//!
//! The [planner] module routes batches of pixel routes over a cost grid sampled from a mask
//! image, making cells used by one route expensive for the routes after it.
//!
//! ```
//! use route_pathfinding::{CostGrid, Heuristic, Path, Point, ValueGrid};
//!
//! let mut grid = CostGrid::new(5, 5, 1.0);
//! grid.set(2, 2, 0.0);
//! let mut path = Path::new(Heuristic::Chebyshev);
//! assert!(path.find(&grid, Point::new(0, 0), Point::new(4, 4)));
//! assert!(!path.cells().contains(&Point::new(2, 2)));
//! ```
mod astar;
pub mod cost_grid;
pub mod heuristic;
pub mod path;
pub mod planner;
pub mod pool;

pub use crate::cost_grid::CostGrid;
pub use crate::heuristic::Heuristic;
pub use crate::path::{Path, SearchStats};
pub use crate::planner::{PlanReport, PlannedRoute, PlannerConfig, Route, RoutePlanner};
pub use crate::pool::{NodeId, NodePool, DEFAULT_POOL_CAPACITY};
pub use grid_util::grid::ValueGrid;
pub use grid_util::point::Point;

/// Cells with a cost at or below this value are obstacles.
pub const IMPASSABLE_COST: f32 = 0.1;
