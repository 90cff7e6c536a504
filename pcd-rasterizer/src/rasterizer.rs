use std::path::Path;

use pcd_core::pointcloud::point::PointCloud;
use pcd_parser::parser_for_path;

use crate::error::RasterizeError;
use crate::geometry::{validate_resolution, GridGeometry};
use crate::geotiff::{GeoTiffCompression, GeoTiffWriter};
use crate::grid::{RasterGrid, RasterStats};
use crate::transform::AffineTransform;

pub const DEFAULT_RESOLUTION: f64 = 1.0;

/// Elevation raster held in memory before it is written.
#[derive(Debug, Clone)]
pub struct Raster {
    pub geometry: GridGeometry,
    pub transform: AffineTransform,
    pub grid: RasterGrid,
    pub stats: RasterStats,
}

impl Raster {
    pub fn write_geotiff<P: AsRef<Path>>(
        &self,
        path: P,
        compression: GeoTiffCompression,
    ) -> Result<(), RasterizeError> {
        GeoTiffWriter::new(&self.grid, &self.transform)
            .compression(compression)
            .write(path)
    }
}

#[derive(Debug, Clone)]
pub struct Rasterizer {
    resolution: f64,
    compression: GeoTiffCompression,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl Rasterizer {
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution,
            compression: GeoTiffCompression::default(),
        }
    }

    pub fn with_compression(mut self, compression: GeoTiffCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Bins the cloud into a grid covering its bounding box.
    pub fn rasterize_point_cloud(
        &self,
        point_cloud: &PointCloud,
    ) -> Result<Raster, RasterizeError> {
        let geometry = GridGeometry::from_point_cloud(point_cloud, self.resolution)?;
        log::debug!(
            "grid: {} x {} ({} cells), x [{}, {}], y [{}, {}], resolution {}",
            geometry.width,
            geometry.height,
            geometry.cell_count(),
            geometry.x_min,
            geometry.x_max,
            geometry.y_min,
            geometry.y_max,
            geometry.resolution
        );

        let (grid, stats) = RasterGrid::bin_points(&geometry, &point_cloud.points);
        if stats.discarded_points > 0 {
            log::warn!("{} points fell outside the grid", stats.discarded_points);
        }

        let transform = geometry.transform();

        Ok(Raster {
            geometry,
            transform,
            grid,
            stats,
        })
    }

    /// Reads `input`, bins it and writes a GeoTIFF to `output`.
    pub fn rasterize(&self, input: &Path, output: &Path) -> Result<Raster, RasterizeError> {
        validate_resolution(self.resolution)?;

        log::info!("start parsing {}...", input.display());
        let start = std::time::Instant::now();
        let parser = parser_for_path(input)?;
        let point_cloud = parser.parse()?;
        log::info!(
            "finish parsing {} points in {:?}",
            point_cloud.len(),
            start.elapsed()
        );

        log::info!("start rasterizing...");
        let start = std::time::Instant::now();
        let raster = self.rasterize_point_cloud(&point_cloud)?;
        log::info!(
            "finish rasterizing {} x {} grid ({} filled cells) in {:?}",
            raster.geometry.width,
            raster.geometry.height,
            raster.stats.filled_cells,
            start.elapsed()
        );

        log::info!("start writing {}...", output.display());
        let start = std::time::Instant::now();
        raster.write_geotiff(output, self.compression)?;
        log::info!("finish writing in {:?}", start.elapsed());

        Ok(raster)
    }
}

/// Converts the point cloud at `input_path` into a float32 elevation GeoTIFF
/// at `output_path` with square cells of `resolution` map units.
pub fn rasterize<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    resolution: f64,
) -> Result<(), RasterizeError> {
    let output_path = output_path.as_ref();
    Rasterizer::new(resolution).rasterize(input_path.as_ref(), output_path)?;
    log::info!("conversion finished: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pcd_core::pointcloud::point::Point;
    use tiff::decoder::{Decoder, DecodingResult};

    use super::*;
    use crate::error::FormatError;
    use crate::geotiff::{geotiff_tag, MODEL_PIXEL_SCALE, MODEL_TIEPOINT};

    fn write_las(path: &Path, points: &[(f64, f64, f64)]) {
        let mut writer = las::Writer::from_path(path, las::Header::default()).unwrap();
        for &(x, y, z) in points {
            writer
                .write_point(las::Point {
                    x,
                    y,
                    z,
                    ..Default::default()
                })
                .unwrap();
        }
        writer.close().unwrap();
    }

    fn read_tif(path: &Path) -> ((u32, u32), Vec<f32>) {
        let mut decoder = Decoder::new(std::fs::File::open(path).unwrap()).unwrap();
        let dimensions = decoder.dimensions().unwrap();
        match decoder.read_image().unwrap() {
            DecodingResult::F32(pixels) => (dimensions, pixels),
            _ => panic!("expected f32 samples"),
        }
    }

    fn fixture(points: &[(f64, f64, f64)]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.las");
        write_las(&input, points);
        (dir, input)
    }

    #[test]
    fn three_point_las_to_tif() {
        let (dir, input) = fixture(&[(0.0, 0.0, 10.0), (1.0, 0.0, 20.0), (0.0, 1.0, 30.0)]);
        let output = dir.path().join("output.tif");

        rasterize(&input, &output, 1.0).unwrap();

        let ((width, height), pixels) = read_tif(&output);
        assert_eq!((width, height), (2, 2));
        assert_eq!(pixels[0], 30.0);
        assert!(pixels[1].is_nan());
        assert_eq!(pixels[2], 10.0);
        assert_eq!(pixels[3], 20.0);

        let mut decoder = Decoder::new(std::fs::File::open(&output).unwrap()).unwrap();
        let tiepoint = decoder.get_tag_f64_vec(geotiff_tag(MODEL_TIEPOINT)).unwrap();
        assert_eq!(tiepoint, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let scale = decoder
            .get_tag_f64_vec(geotiff_tag(MODEL_PIXEL_SCALE))
            .unwrap();
        assert_eq!(scale, vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn csv_input_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(&input, "x,y,z\n0,0,10\n1,0,20\n0,1,30\n").unwrap();
        let output = dir.path().join("output.tif");

        let raster = Rasterizer::new(1.0).rasterize(&input, &output).unwrap();
        assert_eq!(raster.grid.row(0)[0], 30.0);
        assert_eq!(raster.grid.row(1), &[10.0, 20.0]);
        assert!(output.exists());
    }

    #[test]
    fn same_input_gives_identical_files() {
        let (dir, input) = fixture(&[
            (100.0, 200.0, 1.5),
            (103.5, 201.25, 2.5),
            (101.0, 204.0, -3.0),
            (103.9, 200.1, 7.25),
        ]);
        let first = dir.path().join("first.tif");
        let second = dir.path().join("second.tif");

        rasterize(&input, &first, 0.5).unwrap();
        rasterize(&input, &second, 0.5).unwrap();

        assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
    }

    #[test]
    fn later_point_wins_in_output() {
        let (dir, input) = fixture(&[
            (0.0, 0.0, 1.0),
            (0.25, 0.25, 2.0),
            (0.5, 0.5, 3.0),
            (0.1, 0.6, 4.0),
        ]);
        let output = dir.path().join("output.tif");

        rasterize(&input, &output, 1.0).unwrap();

        let ((width, height), pixels) = read_tif(&output);
        assert_eq!((width, height), (1, 1));
        assert_eq!(pixels, vec![4.0]);
    }

    #[test]
    fn single_point_is_one_pixel() {
        let (dir, input) = fixture(&[(345.5, 678.25, 12.75)]);
        let output = dir.path().join("output.tif");

        rasterize(&input, &output, 1.0).unwrap();

        assert_eq!(read_tif(&output), ((1, 1), vec![12.75]));
    }

    #[test]
    fn sparse_cloud_keeps_nodata() {
        let (dir, input) = fixture(&[(0.0, 0.0, 1.0), (9.0, 4.0, 2.0)]);
        let output = dir.path().join("output.tif");

        rasterize(&input, &output, 1.0).unwrap();

        let ((width, height), pixels) = read_tif(&output);
        assert_eq!((width, height), (10, 5));
        assert_eq!(pixels[9], 2.0);
        assert_eq!(pixels[4 * 10], 1.0);
        assert_eq!(pixels.iter().filter(|v| v.is_nan()).count(), 48);
    }

    #[test]
    fn empty_cloud_is_format_error() {
        let (dir, input) = fixture(&[]);
        let output = dir.path().join("output.tif");

        let err = rasterize(&input, &output, 1.0).unwrap_err();
        assert!(matches!(
            err,
            RasterizeError::Format(FormatError::EmptyPointCloud)
        ));
        assert!(err.is_format());
        assert!(!output.exists());
    }

    #[test]
    fn bad_resolution_is_format_error() {
        let (dir, input) = fixture(&[(0.0, 0.0, 1.0)]);
        let output = dir.path().join("output.tif");

        for resolution in [0.0, -2.0] {
            let err = rasterize(&input, &output, resolution).unwrap_err();
            assert!(matches!(
                err,
                RasterizeError::Format(FormatError::InvalidResolution(_))
            ));
        }
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.tif");

        let err = rasterize(dir.path().join("missing.las"), &output, 1.0).unwrap_err();
        assert!(matches!(err, RasterizeError::Read(_)));
        assert!(err.is_io());
    }

    #[test]
    fn unwritable_output_is_io_error() {
        let (dir, input) = fixture(&[(0.0, 0.0, 1.0)]);
        let output = dir.path().join("no-such-dir").join("output.tif");

        let err = rasterize(&input, &output, 1.0).unwrap_err();
        assert!(matches!(err, RasterizeError::Io(_)));
        assert!(err.is_io());
    }

    #[test]
    fn oversized_grid_is_format_error() {
        let points: PointCloud = [(0.0, 0.0, 0.0), (4_294_967_294.0, 2_147_483_648.0, 0.0)]
            .into_iter()
            .map(Point::from)
            .collect();

        let err = Rasterizer::new(1.0)
            .rasterize_point_cloud(&points)
            .unwrap_err();
        assert!(matches!(
            err,
            RasterizeError::Format(FormatError::GridTooLarge {
                width: 4_294_967_295,
                height: 2_147_483_649
            })
        ));
        assert!(err.is_format());
    }

    #[test]
    fn in_memory_raster_matches_geometry() {
        let points: PointCloud = [(0.0, 0.0, 5.0), (2.5, 7.5, 6.0)]
            .into_iter()
            .map(Point::from)
            .collect();

        let raster = Rasterizer::new(2.0).rasterize_point_cloud(&points).unwrap();
        assert_eq!((raster.geometry.width, raster.geometry.height), (2, 4));
        assert_eq!(raster.transform.origin(), (0.0, 7.5));
        assert_eq!(raster.grid.get(3, 0), Some(5.0));
        assert_eq!(raster.grid.get(0, 1), Some(6.0));
        assert_eq!(raster.stats.filled_cells, 2);
        assert_eq!(raster.stats.nodata_cells, 6);
    }

    #[test]
    fn default_resolution_is_one() {
        assert_eq!(Rasterizer::default().resolution(), DEFAULT_RESOLUTION);
        assert_eq!(DEFAULT_RESOLUTION, 1.0);
    }
}
