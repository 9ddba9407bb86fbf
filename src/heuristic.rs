use core::fmt;
use grid_util::Point;
use log::warn;

/// `2 - sqrt(2)`, the saving of one diagonal step over two straight ones.
const OCTILE_SAVING: f32 = 2.0 - std::f32::consts::SQRT_2;

/// Estimator of the remaining cost between two cells, selected by a numeric id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Heuristic {
    #[default]
    Manhattan = 0,
    Chebyshev = 1,
    Diagonal = 2,
    Euclidean = 3,
}

impl Heuristic {
    pub const ALL: [Heuristic; 4] = [
        Heuristic::Manhattan,
        Heuristic::Chebyshev,
        Heuristic::Diagonal,
        Heuristic::Euclidean,
    ];

    /// Looks up the estimator with the given id. Unknown ids are not an error: a warning is
    /// logged and [Heuristic::Manhattan] is used instead.
    pub fn from_id(id: i32) -> Heuristic {
        match Heuristic::ALL.iter().find(|h| h.id() == id) {
            Some(h) => *h,
            None => {
                warn!("Invalid heuristic ID: {}, using {}", id, Heuristic::Manhattan);
                Heuristic::Manhattan
            }
        }
    }

    pub fn id(&self) -> i32 {
        *self as i32
    }

    pub fn name(&self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Chebyshev => "chebyshev",
            Heuristic::Diagonal => "diagonal",
            Heuristic::Euclidean => "euclidean",
        }
    }

    /// Human readable formula, used in help output.
    pub fn formula(&self) -> &'static str {
        match self {
            Heuristic::Manhattan => "dx + dy",
            Heuristic::Chebyshev => "max(dx, dy)",
            Heuristic::Diagonal => "dx+dy - (2-sqrt(2))*min(dx, dy)",
            Heuristic::Euclidean => "sqrt(dx^2 + dy^2)",
        }
    }

    pub fn estimate(&self, a: &Point, b: &Point) -> f32 {
        let dx = (a.x - b.x).abs() as f32;
        let dy = (a.y - b.y).abs() as f32;
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Chebyshev => dx.max(dy),
            Heuristic::Diagonal => dx + dy - OCTILE_SAVING * dx.min(dy),
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.name())
    }
}
