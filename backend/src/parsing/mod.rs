//! Parsing of telemetry result tables.

pub mod table_parser;

pub use table_parser::{parse_rows, parse_table};
