use pcd_parser::ParseError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("point cloud contains no points")]
    EmptyPointCloud,

    #[error("resolution must be a positive finite number, got {0}")]
    InvalidResolution(f64),

    #[error("grid of {width} x {height} cells cannot be written")]
    GridTooLarge { width: u64, height: u64 },

    #[error("grid has no cells")]
    EmptyGrid,
}

#[derive(Debug, thiserror::Error)]
pub enum RasterizeError {
    #[error("failed to read point cloud: {0}")]
    Read(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF encoding error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl RasterizeError {
    /// Input rejected for its content or for the requested resolution.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Input could not be read or output could not be written.
    pub fn is_io(&self) -> bool {
        !self.is_format()
    }
}
