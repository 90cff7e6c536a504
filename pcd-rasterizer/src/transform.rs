/// Affine mapping from raster (col, row) to world (x, y).
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// Rasters produced here have no rotation, so `b` and `d` are zero and `e`
/// is the negated cell height: rows grow southwards from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    /// Transform whose pixel (0, 0) has its upper left corner at (`west`, `north`).
    /// Both sizes are positive magnitudes.
    pub fn from_origin(west: f64, north: f64, xsize: f64, ysize: f64) -> Self {
        Self {
            a: xsize,
            b: 0.0,
            c: west,
            d: 0.0,
            e: -ysize,
            f: north,
        }
    }

    /// World coordinate of the upper left corner of a cell. Fractional
    /// indices address positions inside the cell.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.c, self.f)
    }

    /// Cell size as positive magnitudes (x, y).
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.a.abs(), self.e.abs())
    }
}
