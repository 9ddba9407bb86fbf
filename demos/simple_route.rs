use route_pathfinding::{CostGrid, Heuristic, Path, Point, ValueGrid};

// In this example a path is found on a weighted grid with shape
// S . . . .
// . # # # .
// . 5 5 # .
// . . . # E
// S marks the start, E marks the end, # marks impassable cells and 5 marks cells that are five
// times as expensive to enter as the others.
fn main() {
    let mut grid = CostGrid::new(5, 4, 1.0);
    for (x, y) in [(1, 1), (2, 1), (3, 1), (3, 2), (3, 3)] {
        grid.set(x, y, 0.0);
    }
    grid.set(1, 2, 5.0);
    grid.set(2, 2, 5.0);
    println!("{}", grid);

    let start = Point::new(0, 0);
    let end = Point::new(4, 3);
    let mut path = Path::new(Heuristic::Chebyshev);
    if path.find(&grid, start, end) {
        println!("A path has been found with cost {}:", path.cost(&grid));
        for p in path.cells() {
            println!("{}", p);
        }
    } else {
        println!("No path between {} and {}", start, end);
    }
    if let Some(stats) = path.stats() {
        println!("{}", stats);
    }
}
