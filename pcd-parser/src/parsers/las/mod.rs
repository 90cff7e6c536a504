use std::{fs::File, io::BufReader, path::PathBuf};

use las::Reader;

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::{Parser, ParserProvider};
use crate::error::ParseError;

pub struct LasParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filename: self.filename.clone(),
        })
    }
}

/// Reads x, y, z of every point of a LAS or LAZ file, in file order.
pub struct LasParser {
    pub filename: PathBuf,
}

impl Parser for LasParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let start = std::time::Instant::now();
        let io_error = |source| ParseError::Io {
            path: self.filename.clone(),
            source,
        };
        let file = File::open(&self.filename).map_err(io_error)?;
        let file_len = file.metadata().map_err(io_error)?.len();
        let mut reader = Reader::new(BufReader::new(file))?;
        log::debug!("open LAS header: {:?}", start.elapsed());

        // the header count is untrusted; no more records than the file can hold
        let declared = reader.header().number_of_points();
        let record_len = u64::from(reader.header().point_format().len()).max(1);
        let capacity = declared.min(file_len / record_len);
        let mut points = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));

        let start = std::time::Instant::now();
        for las_point in reader.points() {
            let las_point = las_point?;
            points.push(Point::new(las_point.x, las_point.y, las_point.z));
        }
        log::debug!("read {} LAS points: {:?}", points.len(), start.elapsed());

        if points.len() as u64 != declared {
            log::warn!(
                "{}: header declares {} points but {} were read",
                self.filename.display(),
                declared,
                points.len()
            );
        }

        Ok(PointCloud::new(points))
    }
}
