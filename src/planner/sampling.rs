use core::fmt;
use grid_util::grid::ValueGrid;
use itertools::iproduct;
use std::error::Error;

use crate::cost_grid::CostGrid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MaskError {
    /// The buffer does not hold `width * height` bytes.
    SizeMismatch { expected: usize, actual: usize },
    ZeroCellSize,
}

impl fmt::Display for MaskError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MaskError::SizeMismatch { expected, actual } => write!(
                f,
                "mask buffer holds {} bytes, expected {}",
                actual, expected
            ),
            MaskError::ZeroCellSize => write!(f, "cell size must be at least one pixel"),
        }
    }
}

impl Error for MaskError {}

/// Downsamples a row-major, single channel mask into a [CostGrid]. Every `cell_size` square of
/// pixels becomes one cell costing `1 + land_cost * brightness`, brightness being the mean pixel
/// value scaled to `0..=1`. Pixels beyond the last whole cell are ignored.
pub fn sample_mask(
    mask: &[u8],
    width: usize,
    height: usize,
    cell_size: usize,
    land_cost: f32,
) -> Result<CostGrid, MaskError> {
    if cell_size == 0 {
        return Err(MaskError::ZeroCellSize);
    }
    if mask.len() != width * height {
        return Err(MaskError::SizeMismatch {
            expected: width * height,
            actual: mask.len(),
        });
    }
    let (w, h) = (width / cell_size, height / cell_size);
    let mut grid = CostGrid::new(w, h, 1.0);
    let full = 255.0 * (cell_size * cell_size) as f64;
    for (x, y) in iproduct!(0..w, 0..h) {
        let rows = y * cell_size..(y + 1) * cell_size;
        let columns = x * cell_size..(x + 1) * cell_size;
        // Wide enough for any cell that fits in memory.
        let sum: u64 = iproduct!(rows, columns)
            .map(|(v, u)| mask[v * width + u] as u64)
            .sum();
        let brightness = (sum as f64 / full) as f32;
        grid.grid
            .set(x as i32, y as i32, 1.0 + land_cost * brightness);
    }
    grid.generate_components();
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_util::point::Point;

    #[test]
    fn averages_each_cell() {
        // 4x2 pixels, 2 pixel cells: left cell black, right cell half white.
        let mask = [0u8, 0, 255, 0, 0, 0, 255, 0];
        let grid = sample_mask(&mask, 4, 2, 2, 100.0).unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.cost(&Point::new(0, 0)), 1.0);
        assert_eq!(grid.cost(&Point::new(1, 0)), 51.0);
    }

    #[test]
    fn partial_cells_are_dropped() {
        let mask = vec![255u8; 5 * 7];
        let grid = sample_mask(&mask, 5, 7, 3, 2.0).unwrap();
        assert_eq!((grid.width(), grid.height()), (1, 2));
        assert_eq!(grid.cost(&Point::new(0, 1)), 3.0);
    }

    #[test]
    fn huge_cells_do_not_overflow() {
        // 255 * 4200^2 does not fit in a u32.
        let n = 4200;
        let mask = vec![255u8; n * n];
        let grid = sample_mask(&mask, n, n, n, 2.0).unwrap();
        assert_eq!((grid.width(), grid.height()), (1, 1));
        assert_eq!(grid.cost(&Point::new(0, 0)), 3.0);
    }

    #[test]
    fn sampled_cells_are_always_traversable() {
        let mask = [0u8; 16];
        let grid = sample_mask(&mask, 4, 4, 1, 200.0).unwrap();
        assert!(grid.reachable(&Point::new(0, 0), &Point::new(3, 3)));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            sample_mask(&[0u8; 3], 2, 2, 1, 1.0).unwrap_err(),
            MaskError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(
            sample_mask(&[0u8; 4], 2, 2, 0, 1.0).unwrap_err(),
            MaskError::ZeroCellSize
        );
    }
}
