//! Best-first search over a [CostGrid].
//!
//! The open set is a [BinaryHeap], which can neither remove arbitrary entries nor lower the
//! priority of one. A node that gets beaten by a cheaper candidate is therefore only flagged as
//! superseded and dropped from the open index; its heap entry lingers until it is popped, at
//! which point the node goes back to the pool.
//!
//! Nodes that have already been expanded may be the parent of other nodes, so they are never
//! recycled during a search. When such a node is improved (a closed node being reopened, or a
//! reopened node being improved again) its slot is updated in place and pushed again; heap
//! entries left behind by the old cost are recognised by their cost no longer matching the node.
use fxhash::FxHashMap;
use grid_util::point::Point;
use log::debug;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::mem::size_of;
use std::time::Duration;

use crate::cost_grid::CostGrid;
use crate::heuristic::Heuristic;
use crate::path::SearchStats;
use crate::pool::{NodeId, NodePool};
use crate::IMPASSABLE_COST;

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    cell: Point,
    /// Accumulated cost of the cells entered since the start.
    cost: f32,
    remaining: f32,
    total: f32,
    parent: Option<NodeId>,
    superseded: bool,
    expanded: bool,
}

// Recycled slots hold a free-list link in place of the node.
const _: () = assert!(size_of::<SearchNode>() >= size_of::<Option<NodeId>>());

impl SearchNode {
    fn new(cell: Point, cost: f32) -> SearchNode {
        SearchNode {
            cell,
            cost,
            remaining: 0.0,
            total: 0.0,
            parent: None,
            superseded: false,
            expanded: false,
        }
    }
}

struct SmallestCostHolder {
    total: f32,
    cost: f32,
    node: NodeId,
}

impl Eq for SmallestCostHolder {}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        // First orders per total, then creates subordering
        // based on cost, favoring exploration of the deepest nodes first
        match other.total.total_cmp(&self.total) {
            Ordering::Equal => self.cost.total_cmp(&other.cost),
            s => s,
        }
    }
}

/// State of a single search. The pool, heap and indices live exactly as long as the search.
pub(crate) struct Search<'a> {
    grid: &'a CostGrid,
    heuristic: Heuristic,
    goal: Point,
    pool: NodePool<SearchNode>,
    to_see: BinaryHeap<SmallestCostHolder>,
    open: FxHashMap<Point, NodeId>,
    closed: FxHashMap<Point, NodeId>,
    expanded: usize,
    reopened: usize,
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        grid: &'a CostGrid,
        heuristic: Heuristic,
        start: Point,
        goal: Point,
        pool_capacity: usize,
    ) -> Search<'a> {
        let mut search = Search {
            grid,
            heuristic,
            goal,
            pool: NodePool::with_capacity(pool_capacity),
            to_see: BinaryHeap::new(),
            open: FxHashMap::default(),
            closed: FxHashMap::default(),
            expanded: 0,
            reopened: 0,
        };
        let id = search.pool.obtain(SearchNode::new(start, 0.0));
        search.push(id, None);
        search
    }

    /// Runs the search to completion. Returns the cells from start to goal, or [None] once every
    /// reachable cell has been expanded without meeting the goal.
    pub(crate) fn run(&mut self) -> Option<Vec<Point>> {
        let mut candidates: SmallVec<[NodeId; 8]> = SmallVec::new();
        while let Some(SmallestCostHolder { cost, node, .. }) = self.to_see.pop() {
            let current = self.pool[node];
            if current.superseded {
                self.pool.discard(node);
                continue;
            }
            // An expanded node that was improved in place leaves its old entries behind.
            if cost != current.cost {
                continue;
            }
            if current.cell == self.goal {
                let path = self.reconstruct(node);
                self.finish();
                return Some(path);
            }
            self.open.remove(&current.cell);
            self.closed.insert(current.cell, node);
            self.pool[node].expanded = true;
            self.expanded += 1;

            self.generate(node, &mut candidates);
            for candidate in candidates.drain(..) {
                self.consider(candidate, node);
            }
        }
        self.finish();
        None
    }

    /// Allocates a candidate for every traversable neighbour of `node`, charged with the cost of
    /// the cell it enters. Diagonal steps cost the same as straight ones.
    fn generate(&mut self, node: NodeId, out: &mut SmallVec<[NodeId; 8]>) {
        let SearchNode { cell, cost, .. } = self.pool[node];
        out.clear();
        for n in self.grid.neighbours(&cell) {
            let c = self.grid.cost(&n);
            if c > IMPASSABLE_COST {
                out.push(self.pool.obtain(SearchNode::new(n, cost + c)));
            }
        }
    }

    fn consider(&mut self, candidate: NodeId, parent: NodeId) {
        let SearchNode { cell, cost, .. } = self.pool[candidate];
        if let Some(&existing) = self.open.get(&cell) {
            if self.pool[existing].cost <= cost {
                self.pool.discard(candidate);
                return;
            }
            if self.pool[existing].expanded {
                self.pool.discard(candidate);
                self.improve(existing, cost, parent);
                return;
            }
            self.open.remove(&cell);
            self.pool[existing].superseded = true;
        }
        if let Some(&existing) = self.closed.get(&cell) {
            if self.pool[existing].cost <= cost {
                self.pool.discard(candidate);
                return;
            }
            debug!(
                "Reopening cell {} (cost {} -> {})",
                cell, self.pool[existing].cost, cost
            );
            self.closed.remove(&cell);
            self.reopened += 1;
            self.pool.discard(candidate);
            self.improve(existing, cost, parent);
            return;
        }
        self.push(candidate, Some(parent));
    }

    /// Lowers the cost of an already expanded node and queues it again. Its descendants keep
    /// pointing at the same slot, so their chains stay intact.
    fn improve(&mut self, node: NodeId, cost: f32, parent: NodeId) {
        self.pool[node].cost = cost;
        self.push(node, Some(parent));
    }

    /// Admits a node into the open set.
    fn push(&mut self, id: NodeId, parent: Option<NodeId>) {
        let remaining = self.heuristic.estimate(&self.pool[id].cell, &self.goal);
        let node = &mut self.pool[id];
        node.remaining = remaining;
        node.total = node.cost + node.remaining;
        node.parent = parent;
        let (cell, total, cost) = (node.cell, node.total, node.cost);
        self.to_see.push(SmallestCostHolder {
            total,
            cost,
            node: id,
        });
        self.open.insert(cell, id);
    }

    /// Follows the back-pointers from `node` to the start and returns the cells start first.
    fn reconstruct(&self, node: NodeId) -> Vec<Point> {
        let mut path: Vec<Point> =
            std::iter::successors(Some(node), |id| self.pool[*id].parent)
                .map(|id| self.pool[id].cell)
                .collect();
        path.reverse();
        path
    }

    /// Hands the superseded nodes still waiting in the heap back to the pool, so that every slot
    /// ends up either indexed or on the free list.
    fn finish(&mut self) {
        for SmallestCostHolder { node, .. } in std::mem::take(&mut self.to_see) {
            if self.pool[node].superseded {
                self.pool.discard(node);
            }
        }
    }

    pub(crate) fn stats(&self, elapsed: Duration) -> SearchStats {
        SearchStats {
            elapsed,
            carved: self.pool.carved(),
            free: self.pool.free_len(),
            open: self.open.len(),
            closed: self.closed.len(),
            expanded: self.expanded,
            reopened: self.reopened,
        }
    }

    /// Checks that the open index, the closed index and the free list together account for
    /// every slot ever carved, without any slot appearing twice.
    #[cfg(test)]
    fn audit(&self) -> bool {
        let mut seen = fxhash::FxHashSet::default();
        let ids = self
            .open
            .values()
            .chain(self.closed.values())
            .copied()
            .chain(self.pool.free_ids());
        for id in ids {
            if !seen.insert(id) {
                return false;
            }
        }
        seen.len() == self.pool.carved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_util::grid::ValueGrid;
    use itertools::Itertools;

    fn search(
        grid: &CostGrid,
        h: Heuristic,
        start: Point,
        goal: Point,
    ) -> (Option<Vec<Point>>, bool, SearchStats) {
        let mut s = Search::new(grid, h, start, goal, 4);
        let path = s.run();
        (path, s.audit(), s.stats(Duration::ZERO))
    }

    fn path_cost(grid: &CostGrid, path: &[Point]) -> f32 {
        path.iter().skip(1).map(|p| grid.cost(p)).sum()
    }

    #[test]
    fn heap_pops_lowest_total_then_deepest() {
        let mut pool = NodePool::new();
        let a = pool.obtain(1);
        let b = pool.obtain(2);
        let c = pool.obtain(3);
        let mut heap = BinaryHeap::new();
        heap.push(SmallestCostHolder {
            total: 5.0,
            cost: 1.0,
            node: a,
        });
        heap.push(SmallestCostHolder {
            total: 3.0,
            cost: 1.0,
            node: b,
        });
        heap.push(SmallestCostHolder {
            total: 5.0,
            cost: 4.0,
            node: c,
        });
        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn start_equals_goal() {
        let grid = CostGrid::new(1, 1, 1.0);
        let p = Point::new(0, 0);
        let (path, audit, stats) = search(&grid, Heuristic::Manhattan, p, p);
        assert_eq!(path, Some(vec![p]));
        assert!(audit);
        assert_eq!(stats.carved, 1);
    }

    #[test]
    fn accounting_holds_on_success_and_failure() {
        let mut grid = CostGrid::new(8, 8, 1.0);
        for y in 0..8 {
            grid.set(4, y, 0.0);
        }
        for h in Heuristic::ALL {
            let (path, audit, stats) = search(&grid, h, Point::new(0, 0), Point::new(7, 7));
            assert!(path.is_none());
            assert!(audit);
            assert_eq!(stats.open, 0);
            assert_eq!(stats.carved, stats.closed + stats.free);

            let (path, audit, stats) = search(&grid, h, Point::new(0, 0), Point::new(3, 6));
            assert!(path.is_some());
            assert!(audit);
            assert_eq!(stats.carved, stats.open + stats.closed + stats.free);
        }
    }

    /// With the Manhattan estimate a diagonal step lowers the estimate by two while costing as
    /// little as a straight one, so (2,0) is first closed through the expensive cell (1,0) and
    /// only later reached through (1,1) for less.
    #[test]
    fn reopening_picks_up_cheaper_cost() {
        let costs = [
            [1.0, 2.0, 1.0, 2.0, 1.0],
            [1.0, 1.0, 4.0, 2.0, 2.0],
            [4.0, 0.0, 1.0, 4.0, 2.0],
            [0.5, 2.0, 2.0, 0.5, 1.0],
        ];
        let mut grid = CostGrid::new(5, 4, 1.0);
        for (y, row) in costs.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                grid.set(x as i32, y as i32, *c);
            }
        }
        let start = Point::new(0, 0);
        let goal = Point::new(4, 0);
        let (path, audit, stats) = search(&grid, Heuristic::Manhattan, start, goal);
        let path = path.unwrap();
        assert!(audit);
        assert!(stats.reopened >= 1);
        assert_eq!(
            path,
            vec![
                Point::new(0, 0),
                Point::new(1, 1),
                Point::new(2, 0),
                Point::new(3, 0),
                Point::new(4, 0),
            ]
        );
        assert_eq!(path_cost(&grid, &path), 5.0);
    }

    #[test]
    fn paths_are_contiguous_for_every_heuristic() {
        let mut grid = CostGrid::new(9, 9, 0.5);
        for x in 1..8 {
            grid.set(x, 4, 5.0);
        }
        grid.set(4, 4, 0.5);
        let start = Point::new(0, 0);
        let goal = Point::new(8, 8);
        for h in Heuristic::ALL {
            let (path, audit, _) = search(&grid, h, start, goal);
            let path = path.unwrap();
            assert!(audit);
            assert_eq!(path.first(), Some(&start));
            assert_eq!(path.last(), Some(&goal));
            assert!(path
                .iter()
                .tuple_windows()
                .all(|(a, b)| (a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1 && a != b));
            assert!(path.iter().all_unique());
        }
    }

    /// Scenario where the cheap route passes under an expensive cell.
    #[test]
    fn detour_below_expensive_cell() {
        //   S   1   1   9   G
        //   #  50   1   1   #
        let mut grid = CostGrid::new(5, 2, 0.0);
        for (x, y, c) in [
            (0, 0, 1.0),
            (1, 0, 1.0),
            (2, 0, 1.0),
            (3, 0, 9.0),
            (4, 0, 1.0),
            (1, 1, 50.0),
            (2, 1, 1.0),
            (3, 1, 1.0),
        ] {
            grid.set(x, y, c);
        }
        let (path, audit, _) = search(
            &grid,
            Heuristic::Manhattan,
            Point::new(0, 0),
            Point::new(4, 0),
        );
        let path = path.unwrap();
        assert!(audit);
        assert_eq!(path_cost(&grid, &path), 4.0);
        assert!(!path.contains(&Point::new(3, 0)));
    }

    #[test]
    fn obstacles_are_never_generated() {
        let mut grid = CostGrid::new(6, 6, 1.0);
        for i in 1..5 {
            grid.set(i, 2, 0.05);
        }
        let start = Point::new(0, 0);
        let goal = Point::new(5, 5);
        let mut s = Search::new(&grid, Heuristic::Chebyshev, start, goal, 8);
        let path = s.run().unwrap();
        assert!(path.iter().all(|p| grid.is_traversable(p)));
        assert!(s.closed.keys().all(|p| grid.is_traversable(p)));
        assert!(s.open.keys().all(|p| grid.is_traversable(p)));
    }
}
