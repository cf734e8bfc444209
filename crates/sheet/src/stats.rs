use crate::column::ColumnType;
use crate::table::Table;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Min, max and mean over the present values of a numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl NumericSummary {
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(NumericSummary { min, max, mean })
    }
}

/// Descriptive statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub missing: usize,
    /// Only set for numeric columns with at least one present value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Per-column statistics for a whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnStatistics>,
}

impl StatisticsReport {
    /// Statistics for a column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "Data Statistics")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total rows: {}", self.row_count)?;
        writeln!(f, "Total columns: {}", self.column_count)?;
        writeln!(f)?;
        writeln!(f, "Column Information:")?;
        writeln!(f, "{rule}")?;
        for column in &self.columns {
            writeln!(f, "{}: {}", column.name, column.column_type)?;
            writeln!(f, "  Missing values: {}", column.missing)?;
            if let Some(summary) = &column.numeric {
                writeln!(f, "  Min: {:.2}", summary.min)?;
                writeln!(f, "  Max: {:.2}", summary.max)?;
                writeln!(f, "  Mean: {:.2}", summary.mean)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Compute per-column statistics over every row of `table`.
#[must_use]
pub fn summarize(table: &Table) -> StatisticsReport {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let missing = table.column_values(idx).filter(|cell| cell.is_null()).count();
            let numeric = match column.column_type() {
                ColumnType::Numeric => {
                    let values: Vec<f64> = table.column_values(idx).filter_map(|cell| cell.as_number()).collect();
                    NumericSummary::from_values(&values)
                }
                ColumnType::Temporal | ColumnType::Text => None,
            };
            ColumnStatistics {
                name: column.name().to_string(),
                column_type: column.column_type(),
                missing,
                numeric,
            }
        })
        .collect();

    debug!("Summarized {} columns over {} rows", table.col_count(), table.row_count());
    StatisticsReport {
        row_count: table.row_count(),
        column_count: table.col_count(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_numeric_summary() {
        let table = Table::from_csv_str("x,label\n4,a\n,b\n1,c\n7,d\n").unwrap();
        let report = summarize(&table);

        assert_eq!(report.row_count, 4);
        assert_eq!(report.column_count, 2);

        let x = report.column("x").unwrap();
        assert_eq!(x.column_type, ColumnType::Numeric);
        assert_eq!(x.missing, 1);
        let summary = x.numeric.unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.mean, 4.0);
        assert!(summary.min <= summary.mean && summary.mean <= summary.max);

        let label = report.column("label").unwrap();
        assert_eq!(label.column_type, ColumnType::Text);
        assert!(label.numeric.is_none());
    }

    #[test]
    fn test_mean_is_unrounded() {
        let table = Table::from_csv_str("x\n1\n2\n2\n").unwrap();
        let summary = summarize(&table).columns[0].numeric.unwrap();
        assert_eq!(summary.mean, 5.0 / 3.0);
    }

    #[test]
    fn test_all_absent_column_has_no_summary() {
        let table = Table::from_csv_str("x,y\n,1\n,2\n").unwrap();
        let report = summarize(&table);
        let x = report.column("x").unwrap();
        // All-absent columns are Text, and never get min/max/mean
        assert_eq!(x.column_type, ColumnType::Text);
        assert_eq!(x.missing, 2);
        assert!(x.numeric.is_none());
    }

    #[test]
    fn test_numeric_view_without_present_values() {
        let table = Table::from_csv_str("x,tag\n1,a\n,b\n").unwrap();
        let view = crate::filter(&table, "tag", "b").unwrap();
        let report = summarize(&view);
        let x = report.column("x").unwrap();
        assert_eq!(x.column_type, ColumnType::Numeric);
        assert_eq!(x.missing, 1);
        assert!(x.numeric.is_none());
    }

    #[test]
    fn test_display_format() {
        let table = Table::from_csv_str("x\n1\n2\n").unwrap();
        let text = summarize(&table).to_string();
        assert!(text.contains("Total rows: 2"));
        assert!(text.contains("x: numeric"));
        assert!(text.contains("  Missing values: 0"));
        assert!(text.contains("  Mean: 1.50"));
    }
}
