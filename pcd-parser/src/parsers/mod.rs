use std::path::{Path, PathBuf};

use pcd_core::pointcloud::point::PointCloud;

use crate::error::ParseError;

pub mod csv;
pub mod las;

use self::csv::CsvParserProvider;
use self::las::LasParserProvider;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
    Csv,
    Txt,
}

pub fn get_extension(extension: &str) -> Result<Extension, ParseError> {
    match extension.to_ascii_lowercase().as_str() {
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        "csv" => Ok(Extension::Csv),
        "txt" => Ok(Extension::Txt),
        _ => Err(ParseError::UnsupportedExtension(extension.to_string())),
    }
}

/// Picks the reader for a single input file from its extension.
pub fn parser_for_path(path: &Path) -> Result<Box<dyn Parser>, ParseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| ParseError::UnsupportedExtension(path.display().to_string()))?;

    let filename = PathBuf::from(path);
    let parser = match get_extension(extension)? {
        Extension::Las | Extension::Laz => LasParserProvider { filename }.get_parser(),
        Extension::Csv | Extension::Txt => CsvParserProvider { filename }.get_parser(),
    };

    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(get_extension("las").unwrap(), Extension::Las);
        assert_eq!(get_extension("LAZ").unwrap(), Extension::Laz);
        assert_eq!(get_extension("csv").unwrap(), Extension::Csv);
        assert_eq!(get_extension("txt").unwrap(), Extension::Txt);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            get_extension("ply"),
            Err(ParseError::UnsupportedExtension(ext)) if ext == "ply"
        ));
    }

    #[test]
    fn path_without_extension_is_rejected() {
        assert!(matches!(
            parser_for_path(Path::new("points")),
            Err(ParseError::UnsupportedExtension(_))
        ));
    }
}
