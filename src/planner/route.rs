use core::fmt;
use grid_util::point::Point;
use log::warn;
use std::error::Error;
use std::str::FromStr;

/// A requested route between two pixel positions of the map image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    pub start: Point,
    pub end: Point,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteParseError {
    /// Fewer than two points on the line.
    MissingPoint,
    /// A point that is not of the form `x,y` with integer coordinates.
    InvalidPoint(String),
}

impl fmt::Display for RouteParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteParseError::MissingPoint => write!(f, "expected two points 'x0,y0 x1,y1'"),
            RouteParseError::InvalidPoint(s) => write!(f, "invalid point '{}'", s),
        }
    }
}

impl Error for RouteParseError {}

fn parse_point(s: &str) -> Result<Point, RouteParseError> {
    let invalid = || RouteParseError::InvalidPoint(s.to_owned());
    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x = x.parse::<i32>().map_err(|_| invalid())?;
    let y = y.parse::<i32>().map_err(|_| invalid())?;
    Ok(Point::new(x, y))
}

impl FromStr for Route {
    type Err = RouteParseError;

    /// Parses `"x0,y0 x1,y1"`. Whitespace may surround the points and follow their commas, as
    /// in `"1, 2  3, 4"`; anything after the second point is ignored.
    fn from_str(s: &str) -> Result<Route, RouteParseError> {
        let mut tokens = s.split_whitespace();
        let mut next_point = || -> Result<Point, RouteParseError> {
            let token = tokens.next().ok_or(RouteParseError::MissingPoint)?;
            if token.ends_with(',') {
                let y = tokens
                    .next()
                    .ok_or_else(|| RouteParseError::InvalidPoint(token.to_owned()))?;
                parse_point(&format!("{}{}", token, y))
            } else {
                parse_point(token)
            }
        };
        let start = next_point()?;
        let end = next_point()?;
        Ok(Route { start, end })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{},{}-{},{}",
            self.start.x, self.start.y, self.end.x, self.end.y
        )
    }
}

/// Parses a route list, one route per line. Blank lines are skipped; malformed lines are logged
/// with their line number and skipped as well.
pub fn parse_routes(text: &str) -> Vec<Route> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match line.parse::<Route>() {
            Ok(route) => Some(route),
            Err(e) => {
                warn!("Route list line {}: {}", i + 1, e);
                None
            }
        })
        .collect()
}
