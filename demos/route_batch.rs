use route_pathfinding::planner::parse_routes;
use route_pathfinding::{PlannerConfig, RoutePlanner};

// Routes a few journeys over a synthetic map. The mask is dark (cheap) water with a bright
// (expensive) island in the middle; routes are given in pixels, one per line.
const ROUTES: &str = "
10,10 230,150
10,150 230,10
5,80 235,80
120,5 120,155
this line is ignored
";

fn main() {
    let (width, height) = (240, 160);
    let mask: Vec<u8> = (0..width * height)
        .map(|i| {
            let (x, y) = ((i % width) as i32 - 120, (i / width) as i32 - 80);
            if x * x + 4 * y * y < 60 * 60 {
                255
            } else {
                0
            }
        })
        .collect();

    let config = PlannerConfig {
        cell_size: 8,
        ..PlannerConfig::default()
    };
    let planner = RoutePlanner::new(config);
    let mut grid = match planner.sample(&mask, width, height) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Could not sample mask: {}", e);
            return;
        }
    };

    let routes = parse_routes(ROUTES);
    let report = planner.plan(&mut grid, &routes);
    for planned in &report.routes {
        let points = planned
            .anchored_points()
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}: {}", planned.route, points);
    }
    println!("{}", report);
}
