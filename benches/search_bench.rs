use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use route_pathfinding::{CostGrid, Heuristic, Path, Point, ValueGrid};
use std::hint::black_box;

fn random_grid(n: usize, rng: &mut StdRng) -> CostGrid {
    let mut grid = CostGrid::new(n, n, 1.0);
    for x in 0..n as i32 {
        for y in 0..n as i32 {
            let cost = match rng.gen_range(0..10) {
                0 => 0.0,
                1..=2 => rng.gen_range(2.0..10.0),
                _ => 1.0,
            };
            grid.set(x, y, cost);
        }
    }
    grid.update();
    grid
}

fn scenarios(n: usize, count: usize, grid: &CostGrid, rng: &mut StdRng) -> Vec<(Point, Point)> {
    let mut scenarios = Vec::with_capacity(count);
    while scenarios.len() < count {
        let start = Point::new(rng.gen_range(0..n as i32), rng.gen_range(0..n as i32));
        let end = Point::new(rng.gen_range(0..n as i32), rng.gen_range(0..n as i32));
        if grid.is_traversable(&start) && grid.reachable(&start, &end) {
            scenarios.push((start, end));
        }
    }
    scenarios
}

fn heuristic_bench(c: &mut Criterion) {
    const N: usize = 128;
    let mut rng = StdRng::seed_from_u64(0);
    let grid = random_grid(N, &mut rng);
    let scenarios = scenarios(N, 20, &grid, &mut rng);
    for heuristic in Heuristic::ALL {
        c.bench_function(format!("{N}x{N} weighted, {}", heuristic.name()).as_str(), |b| {
            b.iter(|| {
                for (start, end) in &scenarios {
                    let mut path = Path::new(heuristic);
                    black_box(path.find(&grid, *start, *end));
                }
            })
        });
    }
}

fn pool_capacity_bench(c: &mut Criterion) {
    const N: usize = 256;
    let grid = CostGrid::new(N, N, 1.0);
    let start = Point::new(0, 0);
    let end = Point::new(N as i32 - 1, N as i32 / 2);
    for capacity in [1, 128, 4096] {
        c.bench_function(format!("{N}x{N} uniform, pool capacity {capacity}").as_str(), |b| {
            b.iter(|| {
                let mut path = Path::new(Heuristic::Euclidean);
                path.pool_capacity = capacity;
                black_box(path.find(&grid, start, end));
            })
        });
    }
}

criterion_group!(benches, heuristic_bench, pool_capacity_bench);
criterion_main!(benches);
