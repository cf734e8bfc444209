//! Column-wide type classification.

use crate::cell::CellValue;
use serde::Serialize;
use std::fmt;

/// Inferred type of a column, used to pick parsing and comparison rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Temporal,
    Text,
}

impl ColumnType {
    /// Classify a column from its cell values.
    ///
    /// Numeric when every present value is a number, Temporal when every
    /// present value is a timestamp, Text otherwise. A column without any
    /// present value is Text.
    pub fn infer<'a, I>(values: I) -> ColumnType
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let mut present = false;
        let mut numeric = true;
        let mut temporal = true;

        for value in values {
            if value.is_null() {
                continue;
            }
            present = true;
            numeric = numeric && value.as_number().is_some();
            temporal = temporal && value.as_timestamp().is_some();
            if !numeric && !temporal {
                return ColumnType::Text;
            }
        }

        match (present, numeric, temporal) {
            (false, _, _) => ColumnType::Text,
            (true, true, _) => ColumnType::Numeric,
            (true, false, true) => ColumnType::Temporal,
            (true, false, false) => ColumnType::Text,
        }
    }

    /// Name used in reports
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Temporal => "temporal",
            ColumnType::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named column and its inferred type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
}

impl Column {
    pub(crate) fn new(name: String, column_type: ColumnType) -> Self {
        Column { name, column_type }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}
