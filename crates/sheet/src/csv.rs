use crate::cell::CellValue;
use crate::error::{ExportError, LoadError};
use crate::io::LoadOptions;
use crate::table::Table;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const BOM: char = '\u{feff}';

impl Table {
    /// Load a table from a delimited file
    pub fn from_csv<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, LoadError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Self::from_csv_reader(reader, options)
    }

    /// Load a table from a CSV string with default options
    pub fn from_csv_str(content: &str) -> Result<Self, LoadError> {
        Self::from_csv_reader(content.as_bytes(), &LoadOptions::default())
    }

    /// Load a table from a reader. The first record holds the headers.
    pub fn from_csv_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Self, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter.unwrap_or(b','))
            .has_headers(false) // We handle headers ourselves
            .flexible(false)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(malformed)?
                .iter()
                .enumerate()
                .map(|(idx, field)| {
                    if idx == 0 {
                        field.trim_start_matches(BOM).to_string()
                    } else {
                        field.to_string()
                    }
                })
                .collect(),
            None => return Err(LoadError::Empty),
        };

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        for result in records {
            let record = result.map_err(malformed)?;
            let row = record
                .iter()
                .map(|field| {
                    if options.is_na(field) {
                        CellValue::Null
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        // Column types come from the raw text, so text columns keep it verbatim
        let mut table = Table::new("Sheet1", headers, rows)?;
        if options.infer_cell_types {
            table.coerce_cells();
        }
        Ok(table)
    }

    /// Save the table to a delimited file
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P, delimiter: u8) -> Result<(), ExportError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_csv(writer, delimiter)
    }

    /// Write the headers and every row as delimited text.
    /// Absent cells are written as empty fields.
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<(), ExportError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        csv_writer.write_record(self.column_names())?;
        for row in self.rows() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the table to a CSV string
    pub fn to_csv_string(&self) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer, b',')?;
        String::from_utf8(buffer)
            .map_err(|err| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
    }
}

fn malformed(err: csv::Error) -> LoadError {
    match err.kind() {
        csv::ErrorKind::UnequalLengths { .. } | csv::ErrorKind::Utf8 { .. } => {
            LoadError::Malformed(err.to_string())
        }
        _ => LoadError::Csv(err),
    }
}
