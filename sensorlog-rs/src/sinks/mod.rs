pub mod csv;

pub use crate::sinks::csv::CsvSink;
