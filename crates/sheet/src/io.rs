//! Format detection and the load/export entry points.

use crate::error::{ExportError, LoadError};
use crate::table::Table;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Values treated as absent when reading a source
pub const DEFAULT_NA_VALUES: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "#N/A", "None"];

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text with the given field separator
    Delimited(u8),
    /// Spreadsheet workbook (xlsx, xlsm, xls, ods)
    Workbook,
}

impl FileFormat {
    /// Detect the format from the file extension
    pub fn detect(path: &Path) -> Option<FileFormat> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("csv" | "txt") => Some(FileFormat::Delimited(b',')),
            Some("tsv" | "tab") => Some(FileFormat::Delimited(b'\t')),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Some(FileFormat::Workbook),
            _ => None,
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

/// Options for reading a source file
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter for delimited sources, overriding the extension default
    pub delimiter: Option<u8>,
    /// Worksheet to read from a workbook (default: the first one)
    pub sheet: Option<String>,
    /// Values that mark a cell as absent
    pub na_values: Vec<String>,
    /// Whether delimited fields are typed one by one (number, timestamp, text)
    pub infer_cell_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: None,
            sheet: None,
            na_values: DEFAULT_NA_VALUES.iter().map(ToString::to_string).collect(),
            infer_cell_types: true,
        }
    }
}

impl LoadOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Select a worksheet by name
    #[must_use]
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Replace the absent markers
    #[must_use]
    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether to type delimited fields
    #[must_use]
    pub fn with_cell_type_inference(mut self, infer_cell_types: bool) -> Self {
        self.infer_cell_types = infer_cell_types;
        self
    }

    /// Whether a raw value marks an absent cell
    #[must_use]
    pub fn is_na(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty() || self.na_values.iter().any(|na| na == trimmed)
    }
}

impl Table {
    /// Load a table from a file, picking the reader from the extension.
    ///
    /// The first row holds the column names.
    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Table, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let format = FileFormat::detect(path).ok_or_else(|| LoadError::UnsupportedFormat {
            extension: extension_of(path),
        })?;

        let start_time = Instant::now();
        let mut table = match format {
            FileFormat::Delimited(default_delimiter) => {
                let options = LoadOptions {
                    delimiter: Some(options.delimiter.unwrap_or(default_delimiter)),
                    ..options.clone()
                };
                Table::from_csv(path, &options)?
            }
            FileFormat::Workbook => Table::from_workbook(path, options)?,
        };
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            table.set_name(stem);
        }

        info!(
            "Loaded {} ({} rows, {} columns) in {}ms",
            path.display(),
            table.row_count(),
            table.col_count(),
            start_time.elapsed().as_millis()
        );
        Ok(table)
    }
}

/// Write every row of `view` to `path`, headers first, in view order.
///
/// Returns the number of data rows written.
pub fn export<P: AsRef<Path>>(view: &Table, path: P) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let format = FileFormat::detect(path).ok_or_else(|| ExportError::UnsupportedFormat {
        extension: extension_of(path),
    })?;

    match format {
        FileFormat::Delimited(delimiter) => view.save_as_csv(path, delimiter)?,
        FileFormat::Workbook => {
            if !matches!(extension_of(path).to_lowercase().as_str(), "xlsx") {
                return Err(ExportError::UnsupportedFormat {
                    extension: extension_of(path),
                });
            }
            view.save_as_xlsx(path)?;
        }
    }

    info!("Exported {} rows to {}", view.row_count(), path.display());
    Ok(view.row_count())
}
