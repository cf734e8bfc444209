use crate::cell::CellValue;
use crate::column::{Column, ColumnType};
use crate::error::TableError;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, PartialEq)]
struct Schema {
    columns: Vec<Column>,
    index: IndexMap<String, usize>,
}

/// A loaded table or a view derived from one.
///
/// Column types are inferred once when a table is built. Views produced by
/// filtering or sorting share the schema of the table they came from, so a
/// column keeps its type for every later operation on that data.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Arc<Schema>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from header names and rows of cells.
    ///
    /// Blank headers are named `Unnamed: <index>` and repeated headers get a
    /// `.1`, `.2`, ... suffix so that every column name is unique.
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        if headers.is_empty() {
            return Err(TableError::NoColumns);
        }
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(TableError::LengthMismatch {
                    row: row_idx,
                    expected: headers.len(),
                    actual: row.len(),
                });
            }
        }

        let names = unique_headers(headers);
        let columns: Vec<Column> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let column_type = ColumnType::infer(rows.iter().map(|row| &row[idx]));
                Column::new(name.clone(), column_type)
            })
            .collect();
        let index = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect();

        Ok(Table {
            name: name.to_string(),
            schema: Arc::new(Schema { columns, index }),
            rows,
        })
    }

    /// Create a table from a 2D vector whose first row holds the headers
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Result<Self, TableError> {
        let mut rows = data.into_iter();
        let headers: Vec<String> = rows
            .next()
            .ok_or(TableError::NoColumns)?
            .into_iter()
            .map(|cell| Into::<CellValue>::into(cell).to_string())
            .collect();
        let body = rows
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::new("Sheet1", headers, body)
    }

    /// Build a view over a subset or permutation of this table's rows.
    /// The schema is shared, not re-inferred.
    pub(crate) fn derive(&self, rows: Vec<Vec<CellValue>>) -> Table {
        Table {
            name: self.name.clone(),
            schema: Arc::clone(&self.schema),
            rows,
        }
    }

    /// Store the cells of numeric and temporal columns as numbers and
    /// timestamps. Text columns keep their source text.
    pub(crate) fn coerce_cells(&mut self) {
        let types: Vec<ColumnType> = self.schema.columns.iter().map(Column::column_type).collect();
        for row in &mut self.rows {
            for (cell, column_type) in row.iter_mut().zip(&types) {
                let coerced = match column_type {
                    ColumnType::Numeric => cell.as_number().map(CellValue::Number),
                    ColumnType::Temporal => cell.as_timestamp().map(CellValue::Timestamp),
                    ColumnType::Text => None,
                };
                if let Some(value) = coerced {
                    *cell = value;
                }
            }
        }
    }

    /// Get the table name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the table name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows (excluding the header)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.schema.columns.len()
    }

    /// Check if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns in declared order
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.schema.columns
    }

    /// Column names in declared order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.columns.iter().map(Column::name)
    }

    /// Position of a column by name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.index.get(name).copied()
    }

    /// Look up a column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|idx| &self.schema.columns[idx])
    }

    /// Inferred type of a column
    #[must_use]
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(Column::column_type)
    }

    /// Cells of one column, top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// All rows
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Get a row by index
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a cell by row and column index (0-based, header excluded)
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell by row index and column name
    #[must_use]
    pub fn get_by_name(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column_index(column).and_then(|col| self.get(row, col))
    }

    /// Whether two tables share the same schema instance
    #[must_use]
    pub fn shares_schema_with(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema)
    }

    /// Convert rows to records keyed by column name
    #[must_use]
    pub fn to_records(&self) -> Vec<IndexMap<String, CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.column_names()
                    .map(str::to_string)
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Make header names unique and non-blank, matching the usual spreadsheet
/// reader convention.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut names = Vec::with_capacity(headers.len());

    for (idx, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        if candidate != base {
            warn!("Duplicate column name '{}' renamed to '{}'", base, candidate);
        }

        seen.insert(candidate.clone());
        names.push(candidate);
    }

    names
}
