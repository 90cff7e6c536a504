pub mod error;
pub mod geometry;
pub mod geotiff;
pub mod grid;
pub mod rasterizer;
pub mod transform;

pub use error::{FormatError, RasterizeError};
pub use geometry::GridGeometry;
pub use geotiff::{GeoTiffCompression, GeoTiffWriter};
pub use grid::{RasterGrid, RasterStats};
pub use rasterizer::{rasterize, Raster, Rasterizer, DEFAULT_RESOLUTION};
pub use transform::AffineTransform;
