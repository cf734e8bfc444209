use crate::cell::{parse_timestamp, CellValue};
use crate::error::{ExportError, LoadError};
use crate::io::LoadOptions;
use crate::table::Table;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data, options: &LoadOptions) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::String(s) if options.is_na(s) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        // Serials are read against the workbook's own epoch, 1900 or 1904
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(CellValue::Number(dt.as_f64()), CellValue::Timestamp),
        Data::DateTimeIso(s) => parse_timestamp(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Timestamp),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            let rendered = e.to_string();
            if options.is_na(&rendered) {
                CellValue::Null
            } else {
                CellValue::Text(rendered)
            }
        }
    }
}

impl Table {
    /// Load a table from a workbook (xlsx, xlsm, xlsb, xls, ods).
    ///
    /// Reads the sheet named in `options`, or the first one.
    pub fn from_workbook<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, LoadError> {
        let mut workbook = open_workbook_auto(path.as_ref())?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match &options.sheet {
            Some(name) if sheet_names.contains(name) => name.clone(),
            Some(name) => return Err(LoadError::SheetNotFound { name: name.clone() }),
            None => sheet_names.first().cloned().ok_or(LoadError::Empty)?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|d| data_to_cell_value(d, options)).collect::<Vec<_>>());

        let headers: Vec<String> = rows
            .next()
            .ok_or(LoadError::Empty)?
            .iter()
            .map(CellValue::as_str)
            .collect();
        let body: Vec<Vec<CellValue>> = rows.collect();

        debug!("Read sheet '{}' with {} data rows", sheet_name, body.len());
        Ok(Table::new(&sheet_name, headers, body)?)
    }

    /// Save the table to an xlsx file, headers in bold on the first row
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        self.write_to_worksheet(worksheet)?;

        workbook.save(path.as_ref())?;
        Ok(())
    }

    /// Write headers and rows to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<(), ExportError> {
        let header_format = Format::new().set_bold();
        let datetime_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);

        for (col_idx, name) in self.column_names().enumerate() {
            worksheet.write_string_with_format(0, col_number(col_idx)?, name, &header_format)?;
        }

        for (row_idx, row) in self.rows().iter().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| ExportError::TooLarge(format!("row {row_idx}")))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = col_number(col_idx)?;
                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::Number(n) => {
                        worksheet.write_number(row_num, col_num, *n)?;
                    }
                    CellValue::Text(s) => {
                        worksheet.write_string(row_num, col_num, s)?;
                    }
                    CellValue::Timestamp(ts) => {
                        let datetime = to_excel_datetime(ts)?;
                        worksheet.write_datetime_with_format(row_num, col_num, &datetime, &datetime_format)?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn col_number(col_idx: usize) -> Result<u16, ExportError> {
    u16::try_from(col_idx).map_err(|_| ExportError::TooLarge(format!("column {col_idx}")))
}

fn to_excel_datetime(ts: &NaiveDateTime) -> Result<ExcelDateTime, ExportError> {
    let year = u16::try_from(ts.year()).map_err(|_| ExportError::TooLarge(format!("year {}", ts.year())))?;
    let datetime = ExcelDateTime::from_ymd(year, ts.month() as u8, ts.day() as u8)?.and_hms_milli(
        ts.hour() as u16,
        ts.minute() as u8,
        ts.second() as u8,
        (ts.nanosecond() / 1_000_000) as u16,
    )?;
    Ok(datetime)
}
