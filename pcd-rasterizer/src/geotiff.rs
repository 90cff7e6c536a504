//! Single band float32 GeoTIFF output.
//!
//! The georeferencing is stored as a tie point on the upper left corner of
//! pixel (0, 0) plus a pixel scale. No coordinate reference system keys are
//! written; the GeoKey directory only declares the raster as pixel-is-area.
//! The nodata value goes into the GDAL_NODATA tag so GIS tools pick it up.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::{Compression, DeflateLevel, DirectoryEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;

use crate::error::RasterizeError;
use crate::geometry::checked_cell_count;
use crate::grid::RasterGrid;
use crate::transform::AffineTransform;

pub(crate) const MODEL_PIXEL_SCALE: u16 = 33550;
pub(crate) const MODEL_TIEPOINT: u16 = 33922;
pub(crate) const GEO_KEY_DIRECTORY: u16 = 34735;
pub(crate) const GDAL_NODATA: u16 = 42113;

const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Resolves to the named variant when the tiff crate knows the code.
pub(crate) fn geotiff_tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeoTiffCompression {
    #[default]
    None,
    Lzw,
    Deflate,
}

impl GeoTiffCompression {
    fn to_tiff(self) -> Compression {
        match self {
            GeoTiffCompression::None => Compression::Uncompressed,
            GeoTiffCompression::Lzw => Compression::Lzw,
            GeoTiffCompression::Deflate => Compression::Deflate(DeflateLevel::Balanced),
        }
    }
}

pub struct GeoTiffWriter<'a> {
    grid: &'a RasterGrid,
    transform: &'a AffineTransform,
    compression: GeoTiffCompression,
}

impl<'a> GeoTiffWriter<'a> {
    pub fn new(grid: &'a RasterGrid, transform: &'a AffineTransform) -> Self {
        Self {
            grid,
            transform,
            compression: GeoTiffCompression::default(),
        }
    }

    pub fn compression(mut self, compression: GeoTiffCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Writes the file, removing it again if encoding fails midway.
    pub fn write<P: AsRef<Path>>(self, path: P) -> Result<(), RasterizeError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let result = self
            .write_to(&mut writer)
            .and_then(|()| writer.flush().map_err(RasterizeError::from));
        drop(writer);

        if let Err(e) = result {
            if let Err(remove_err) = fs::remove_file(path) {
                log::warn!(
                    "failed to remove incomplete {}: {}",
                    path.display(),
                    remove_err
                );
            }
            return Err(e);
        }

        Ok(())
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), RasterizeError> {
        checked_cell_count(self.grid.width() as u64, self.grid.height() as u64)?;
        let width = self.grid.width() as u32;
        let height = self.grid.height() as u32;

        let mut encoder = TiffEncoder::new(writer)?.with_compression(self.compression.to_tiff());
        let mut image = encoder.new_image::<Gray32Float>(width, height)?;
        self.write_geotiff_tags(image.encoder())?;
        image.write_data(&self.grid.to_f32())?;

        Ok(())
    }

    fn write_geotiff_tags<W: Write + Seek, K: TiffKind>(
        &self,
        dir: &mut DirectoryEncoder<'_, W, K>,
    ) -> Result<(), RasterizeError> {
        let (scale_x, scale_y) = self.transform.pixel_size();
        let pixel_scale = [scale_x, scale_y, 0.0];
        dir.write_tag(geotiff_tag(MODEL_PIXEL_SCALE), &pixel_scale[..])?;

        let (west, north) = self.transform.origin();
        let tiepoint = [0.0, 0.0, 0.0, west, north, 0.0];
        dir.write_tag(geotiff_tag(MODEL_TIEPOINT), &tiepoint[..])?;

        let geokeys = build_geokey_directory();
        dir.write_tag(geotiff_tag(GEO_KEY_DIRECTORY), &geokeys[..])?;

        dir.write_tag(geotiff_tag(GDAL_NODATA), "nan")?;

        Ok(())
    }
}

/// `[version, revision, minor, key count, (id, location, count, value)...]`
fn build_geokey_directory() -> Vec<u16> {
    let mut keys = vec![1, 1, 0, 1];
    keys.extend_from_slice(&[GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA]);
    keys
}
