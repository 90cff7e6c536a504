use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid number {value:?} in field '{field}' at record {record}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        record: u64,
    },

    #[error("field '{field}' is missing at record {record}")]
    MissingField { field: &'static str, record: u64 },

    #[error("unsupported extension: {0:?}")]
    UnsupportedExtension(String),
}
