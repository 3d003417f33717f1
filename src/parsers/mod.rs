//! File parsing modules
//!
//! Contains the CSV reader and writer used for sheet exports.

pub mod csv_parser;


// Re-export commonly used parsers
pub use csv_parser::*;
