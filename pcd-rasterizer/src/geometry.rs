use pcd_core::pointcloud::point::{BoundingVolume, PointCloud};

use crate::error::FormatError;
use crate::transform::AffineTransform;

/// Room left for the header, directory and strip tables of a classic TIFF.
const TIFF_OVERHEAD: u64 = 1 << 20;

/// Largest float32 image whose offsets still fit in a classic (non-BigTIFF) file.
pub(crate) const MAX_TIFF_DATA_BYTES: u64 = u32::MAX as u64 - TIFF_OVERHEAD;

/// Number of cells of a `width` x `height` grid that can be held as f64 in
/// memory and written as float32 to a classic TIFF.
pub(crate) fn checked_cell_count(width: u64, height: u64) -> Result<usize, FormatError> {
    let too_large = FormatError::GridTooLarge { width, height };
    if width == 0 || height == 0 {
        return Err(FormatError::EmptyGrid);
    }
    if width > u64::from(u32::MAX) || height > u64::from(u32::MAX) {
        return Err(too_large);
    }

    let cells = width.checked_mul(height).ok_or(too_large.clone())?;
    let output_bytes = cells
        .checked_mul(std::mem::size_of::<f32>() as u64)
        .ok_or(too_large.clone())?;
    if output_bytes > MAX_TIFF_DATA_BYTES {
        return Err(too_large);
    }

    let cells = usize::try_from(cells).map_err(|_| too_large.clone())?;
    cells
        .checked_mul(std::mem::size_of::<f64>())
        .ok_or(too_large)?;

    Ok(cells)
}

pub(crate) fn validate_resolution(resolution: f64) -> Result<f64, FormatError> {
    if resolution.is_finite() && resolution > 0.0 {
        Ok(resolution)
    } else {
        Err(FormatError::InvalidResolution(resolution))
    }
}

/// Extent and cell layout of the output raster.
///
/// Row 0 is the northern edge (`y_max`) and column 0 the western edge
/// (`x_min`). Each dimension is `floor(extent / resolution) + 1`, so the
/// points on `x_max` and `y_min` still land in the last column and row.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub resolution: f64,
    pub width: usize,
    pub height: usize,
}

impl GridGeometry {
    pub fn new(bounds: &BoundingVolume, resolution: f64) -> Result<Self, FormatError> {
        let resolution = validate_resolution(resolution)?;
        if bounds.is_empty() {
            return Err(FormatError::EmptyPointCloud);
        }

        let [x_min, y_min, _] = bounds.min;
        let [x_max, y_max, _] = bounds.max;

        // saturating casts: an infinite extent becomes u64::MAX
        let width = (((x_max - x_min) / resolution).floor() as u64).saturating_add(1);
        let height = (((y_max - y_min) / resolution).floor() as u64).saturating_add(1);

        checked_cell_count(width, height)?;

        Ok(GridGeometry {
            x_min,
            x_max,
            y_min,
            y_max,
            resolution,
            width: width as usize,
            height: height as usize,
        })
    }

    pub fn from_point_cloud(
        point_cloud: &PointCloud,
        resolution: f64,
    ) -> Result<Self, FormatError> {
        let bounds = point_cloud.bounds().ok_or(FormatError::EmptyPointCloud)?;
        Self::new(bounds, resolution)
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// `(row, col)` of the cell containing the point, `None` when it falls
    /// outside the grid.
    pub fn cell_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.x_min) / self.resolution).floor();
        let row = ((self.y_max - y) / self.resolution).floor();

        // NaN fails both comparisons
        if !(col >= 0.0 && col < self.width as f64) || !(row >= 0.0 && row < self.height as f64) {
            return None;
        }

        Some((row as usize, col as usize))
    }

    pub fn transform(&self) -> AffineTransform {
        AffineTransform::from_origin(self.x_min, self.y_max, self.resolution, self.resolution)
    }
}
