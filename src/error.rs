use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while turning a source document into a
/// [`PassengerTable`](crate::data::model::PassengerTable).
///
/// Loading is all-or-nothing: any of these aborts the whole load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),

    #[error("reading CSV")]
    Csv(#[from] csv::Error),

    #[error("reading parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding arrow record batch")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("expected a top-level JSON array of passenger records")]
    NotAnArray,

    #[error("row {row} is not a JSON object")]
    RowNotObject { row: usize },

    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("row {row}: field '{field}' appears more than once")]
    DuplicateField { row: usize, field: String },

    #[error("row {row}: field '{field}' is not an integer: {value}")]
    NotAnInteger {
        row: usize,
        field: String,
        value: String,
    },

    #[error("row {row}: field '{field}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        row: usize,
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("row {row}: field '{field}' has unknown value '{value}'")]
    UnknownCategory {
        row: usize,
        field: String,
        value: String,
    },

    #[error("parquet column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },
}

/// Rejected [`FilterSelection`](crate::data::filter::FilterSelection).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("at least one {field} value must be selected")]
    Empty { field: &'static str },

    #[error("'{value}' is not a valid {field} value (expected one of: {expected})")]
    UnknownValue {
        field: &'static str,
        value: String,
        expected: String,
    },
}
