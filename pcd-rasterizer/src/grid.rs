use pcd_core::pointcloud::point::Point;

use crate::geometry::GridGeometry;

/// Row-major elevation cells, `NaN` where no point landed.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    cells: Vec<f64>,
}

impl RasterGrid {
    pub const NODATA: f64 = f64::NAN;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Self::NODATA; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(
            row < self.height && col < self.width,
            "cell ({row}, {col}) outside {}x{} grid",
            self.width,
            self.height
        );
        self.cells[row * self.width + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.width;
        &self.cells[start..start + self.width]
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Single narrowing cast for output; `NaN` stays `NaN`.
    pub fn to_f32(&self) -> Vec<f32> {
        self.cells.iter().map(|&v| v as f32).collect()
    }

    /// Bins points in order. A later point overwrites an earlier one in the
    /// same cell; points outside the grid are dropped.
    pub fn bin_points(geometry: &GridGeometry, points: &[Point]) -> (Self, RasterStats) {
        let mut grid = Self::new(geometry.width, geometry.height);
        let mut discarded = 0;

        for point in points {
            match geometry.cell_of(point.x, point.y) {
                Some((row, col)) => grid.set(row, col, point.z),
                None => discarded += 1,
            }
        }

        let stats = RasterStats::collect(&grid, points.len(), discarded);
        (grid, stats)
    }
}

/// Summary of a binning pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterStats {
    pub point_count: usize,
    pub discarded_points: usize,
    pub filled_cells: usize,
    pub nodata_cells: usize,
    pub z_min: Option<f64>,
    pub z_max: Option<f64>,
}

impl RasterStats {
    fn collect(grid: &RasterGrid, point_count: usize, discarded_points: usize) -> Self {
        let mut stats = RasterStats {
            point_count,
            discarded_points,
            ..Default::default()
        };

        for &value in grid.cells() {
            if value.is_nan() {
                stats.nodata_cells += 1;
                continue;
            }
            stats.filled_cells += 1;
            stats.z_min = Some(stats.z_min.map_or(value, |m| m.min(value)));
            stats.z_max = Some(stats.z_max.map_or(value, |m| m.max(value)));
        }

        stats
    }
}
