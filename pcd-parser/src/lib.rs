pub mod error;
pub mod parsers;

pub use error::ParseError;
pub use parsers::{get_extension, parser_for_path, Extension, Parser, ParserProvider};
