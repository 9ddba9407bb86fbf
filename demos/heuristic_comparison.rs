use rand::prelude::*;
use route_pathfinding::{CostGrid, Heuristic, Path, Point, ValueGrid};

/// Runs every heuristic on the same random weighted grid and prints how much work each one did
/// next to the cost of the path it returned. Chebyshev never overestimates here, so its cost is
/// the optimum the others can be compared against.
fn main() {
    const N: usize = 64;
    let mut rng = StdRng::seed_from_u64(7);
    let mut grid = CostGrid::new(N, N, 1.0);
    for x in 0..N as i32 {
        for y in 0..N as i32 {
            let cost = match rng.gen_range(0..10) {
                0..=1 => 0.0,
                2..=3 => rng.gen_range(2.0..8.0),
                _ => 1.0,
            };
            grid.set(x, y, cost);
        }
    }
    let start = Point::new(0, 0);
    let end = Point::new(N as i32 - 1, N as i32 - 1);
    grid.set_point(start, 1.0);
    grid.set_point(end, 1.0);

    for heuristic in Heuristic::ALL {
        let mut path = Path::new(heuristic);
        let found = path.find(&grid, start, end);
        let cost = if found { path.cost(&grid) } else { f32::NAN };
        print!("{:<14} {:<20} ", heuristic.to_string(), heuristic.formula());
        match path.stats() {
            Some(stats) => println!(
                "cost {:>8.2}, {} cells, {} expanded, {} reopened",
                cost,
                path.len(),
                stats.expanded,
                stats.reopened
            ),
            None => println!("no search"),
        }
    }
}
