use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a table from headers and rows
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table has no columns")]
    NoColumns,

    #[error("Row {row} has {actual} cells, expected {expected}")]
    LengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised while loading a table from a source file
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Source contains no header row")]
    Empty,

    #[error("Malformed table: {0}")]
    Malformed(String),

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for LoadError {
    fn from(err: calamine::Error) -> Self {
        match err {
            calamine::Error::Io(io) => LoadError::Io(io),
            other => LoadError::Malformed(other.to_string()),
        }
    }
}

impl From<TableError> for LoadError {
    fn from(err: TableError) -> Self {
        LoadError::Malformed(err.to_string())
    }
}

/// Errors raised by the filter engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Invalid number for numeric column '{column}': {value:?}")]
    InvalidNumber { column: String, value: String },
}

/// Errors raised by the sort engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SortError {
    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },
}

/// Errors raised while writing a view to a destination file
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Row index overflow: {0}")]
    TooLarge(String),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
