use std::{fs::File, path::PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::{Parser, ParserProvider};
use crate::error::ParseError;

pub struct CsvParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filename: self.filename.clone(),
        })
    }
}

pub struct CsvParser {
    pub filename: PathBuf,
}

const COORDINATE_FIELDS: [&str; 3] = ["x", "y", "z"];

/// Column index of x, y and z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldMapping {
    columns: [usize; 3],
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self { columns: [0, 1, 2] }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace(['_', '-'], "")
}

/// Returns the mapping when the record is a header naming x, y and z.
fn header_mapping(record: &StringRecord) -> Option<FieldMapping> {
    let mut columns = [None; 3];

    for (index, header) in record.iter().enumerate() {
        let header = normalize(header);
        for (slot, name) in COORDINATE_FIELDS.iter().enumerate() {
            if columns[slot].is_none() && header == *name {
                columns[slot] = Some(index);
            }
        }
    }

    match columns {
        [Some(x), Some(y), Some(z)] => Some(FieldMapping { columns: [x, y, z] }),
        _ => None,
    }
}

fn parse_point(
    record: &StringRecord,
    mapping: &FieldMapping,
    record_number: u64,
) -> Result<Point, ParseError> {
    let mut values = [0.0; 3];

    for (slot, &column) in mapping.columns.iter().enumerate() {
        let field = COORDINATE_FIELDS[slot];
        let value = record.get(column).ok_or(ParseError::MissingField {
            field,
            record: record_number,
        })?;
        values[slot] = value.parse().map_err(|_| ParseError::InvalidNumber {
            field,
            value: value.to_string(),
            record: record_number,
        })?;
    }

    Ok(Point::new(values[0], values[1], values[2]))
}

impl Parser for CsvParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let start = std::time::Instant::now();
        let file = File::open(&self.filename).map_err(|source| ParseError::Io {
            path: self.filename.clone(),
            source,
        })?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let mut records = reader.records();
        let mut points = Vec::new();

        let mapping = match records.next() {
            Some(first) => {
                let first = first?;
                match header_mapping(&first) {
                    Some(mapping) => mapping,
                    None => {
                        // no header, the first row is already a point
                        let mapping = FieldMapping::default();
                        points.push(parse_point(&first, &mapping, 1)?);
                        mapping
                    }
                }
            }
            None => FieldMapping::default(),
        };
        log::debug!("CSV column mapping: {:?}", mapping.columns);

        for (index, record) in records.enumerate() {
            let record = record?;
            points.push(parse_point(&record, &mapping, index as u64 + 2)?);
        }
        log::debug!("read {} CSV points: {:?}", points.len(), start.elapsed());

        Ok(PointCloud::new(points))
    }
}
