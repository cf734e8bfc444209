//! In-memory table engine for sift
//!
//! Loads a spreadsheet or delimited file into a typed [`Table`], then filters,
//! sorts, validates and summarizes it, and writes the result back out.
//!
//! # Examples
//!
//! ## Building a table
//!
//! ```
//! use sift_sheet::{ColumnType, Table};
//!
//! let table = Table::from_data(vec![
//!     vec!["Name", "Age", "Joined"],
//!     vec!["Ana", "30", "2020-01-01"],
//!     vec!["Bo", "41", "2019-05-05"],
//! ])
//! .unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.column_type("Age"), Some(ColumnType::Numeric));
//! assert_eq!(table.column_type("Joined"), Some(ColumnType::Temporal));
//! ```
//!
//! ## Filtering and sorting
//!
//! ```
//! use sift_sheet::{filter, sort, SortDirection, Table};
//!
//! let table = Table::from_csv_str("Name,Age\nAna,30\nBo,\nCy,30\n").unwrap();
//!
//! let thirty = filter(&table, "Age", "30").unwrap();
//! let sorted = sort(&thirty, "Name", SortDirection::Descending).unwrap();
//!
//! let names: Vec<String> = sorted.column_values(0).map(|c| c.to_string()).collect();
//! assert_eq!(names, vec!["Cy", "Ana"]);
//! ```
//!
//! ## Reports
//!
//! ```
//! use sift_sheet::{summarize, validate, Table};
//!
//! let table = Table::from_csv_str("Name,Age\nAna,30\nBo,\n").unwrap();
//!
//! assert_eq!(validate(&table).messages(), vec!["Age: 1 missing values"]);
//! assert_eq!(summarize(&table).column("Age").unwrap().missing, 1);
//! ```
//!
//! ## Loading and exporting
//!
//! ```no_run
//! use sift_sheet::{export, LoadOptions, TableStore};
//!
//! let mut store = TableStore::new();
//! store.load("data.xlsx", &LoadOptions::default().with_sheet("Q1")).unwrap();
//! export(store.current_view().unwrap(), "out.csv").unwrap();
//! ```

mod cell;
mod column;
mod csv;
mod error;
mod filter;
mod io;
mod sort;
mod stats;
mod store;
mod table;
mod validate;
mod xlsx;

/// Re-export cell types and parsers.
pub use cell::{format_timestamp, parse_number, parse_timestamp, CellKind, CellValue};
/// Re-export column metadata.
pub use column::{Column, ColumnType};
/// Re-export error types.
pub use error::{ExportError, FilterError, LoadError, SortError, TableError};
pub use filter::filter;
/// Re-export import and export entry points.
pub use io::{export, FileFormat, LoadOptions, DEFAULT_NA_VALUES};
pub use sort::{sort, SortDirection};
/// Re-export statistics types.
pub use stats::{summarize, ColumnStatistics, NumericSummary, StatisticsReport};
pub use store::TableStore;
pub use table::Table;
pub use validate::{validate, ValidationIssue, ValidationReport};
