//! Row selection by column value.
//!
//! The predicate is chosen from the column's inferred type:
//!
//! - numeric columns keep cells exactly equal to the parsed number
//! - temporal columns keep cells equal to the parsed timestamp, or fall back
//!   to a substring match when the value is not a full timestamp
//! - text columns keep cells whose rendered text contains the value,
//!   ignoring case
//!
//! Numeric equality has no tolerance: `0.1 + 0.2` does not match `0.3`.

use crate::cell::{parse_number, parse_timestamp, CellValue};
use crate::column::ColumnType;
use crate::error::FilterError;
use crate::table::Table;
use chrono::NaiveDateTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Equals(f64),
    At(NaiveDateTime),
    Contains(String),
}

impl Predicate {
    fn for_column(column: &str, column_type: ColumnType, raw: &str) -> Result<Self, FilterError> {
        match column_type {
            ColumnType::Numeric => parse_number(raw).map(Predicate::Equals).ok_or_else(|| {
                FilterError::InvalidNumber {
                    column: column.to_string(),
                    value: raw.to_string(),
                }
            }),
            ColumnType::Temporal => Ok(parse_timestamp(raw)
                .map_or_else(|| Predicate::Contains(raw.to_lowercase()), Predicate::At)),
            ColumnType::Text => Ok(Predicate::Contains(raw.to_lowercase())),
        }
    }

    #[allow(clippy::float_cmp)]
    fn matches(&self, cell: &CellValue) -> bool {
        match self {
            Predicate::Equals(n) => cell.as_number().is_some_and(|v| v == *n),
            Predicate::At(ts) => cell.as_timestamp().is_some_and(|v| v == *ts),
            Predicate::Contains(needle) => cell.to_string().to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Keep the rows of `view` whose `column` cell matches `raw`.
///
/// Returns a new view with the same columns and the matching rows in their
/// original order.
pub fn filter(view: &Table, column: &str, raw: &str) -> Result<Table, FilterError> {
    let col_idx = view.column_index(column).ok_or_else(|| FilterError::UnknownColumn {
        name: column.to_string(),
    })?;
    let column_type = view.columns()[col_idx].column_type();
    let predicate = Predicate::for_column(column, column_type, raw)?;

    let rows: Vec<Vec<CellValue>> = view
        .rows()
        .iter()
        .filter(|row| predicate.matches(&row[col_idx]))
        .cloned()
        .collect();

    debug!(
        "Filter {} ({}) by {:?}: {} of {} rows",
        column,
        column_type,
        predicate,
        rows.len(),
        view.row_count()
    );
    Ok(view.derive(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_csv_str(
            "Name,Age,Joined,Score\n\
             Ana,30,2020-01-01,0.3\n\
             Bo,,2019-05-05,0.1\n\
             Cy,30,2021-07-07 08:30:00,\n\
             anabel,41,,2.5\n",
        )
        .unwrap()
    }

    fn names(table: &Table) -> Vec<String> {
        table
            .rows()
            .iter()
            .map(|row| row[0].to_string())
            .collect()
    }

    #[test]
    fn test_unknown_column() {
        let err = filter(&sample(), "Nope", "x").unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownColumn {
                name: "Nope".to_string()
            }
        );
    }

    #[test]
    fn test_numeric_exact_match() {
        let result = filter(&sample(), "Age", "30").unwrap();
        assert_eq!(names(&result), vec!["Ana", "Cy"]);
        assert_eq!(result.col_count(), 4);
    }

    #[test]
    fn test_numeric_accepts_equivalent_forms() {
        let result = filter(&sample(), "Age", "+30.0").unwrap();
        assert_eq!(names(&result), vec!["Ana", "Cy"]);
    }

    #[test]
    fn test_numeric_invalid_number() {
        let err = filter(&sample(), "Age", "thirty").unwrap_err();
        assert!(matches!(err, FilterError::InvalidNumber { .. }));

        let err = filter(&sample(), "Age", "").unwrap_err();
        assert!(matches!(err, FilterError::InvalidNumber { .. }));
    }

    #[test]
    fn test_numeric_has_no_tolerance() {
        let table = Table::from_data(vec![
            vec![CellValue::from("x")],
            vec![CellValue::Number(0.1 + 0.2)],
            vec![CellValue::Number(0.3)],
        ])
        .unwrap();
        let result = filter(&table, "x", "0.3").unwrap();
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.get(0, 0), Some(&CellValue::Number(0.3)));
    }

    #[test]
    fn test_temporal_exact_match() {
        let result = filter(&sample(), "Joined", "2020-01-01").unwrap();
        assert_eq!(names(&result), vec!["Ana"]);

        let result = filter(&sample(), "Joined", "2021-07-07T08:30:00").unwrap();
        assert_eq!(names(&result), vec!["Cy"]);
    }

    #[test]
    fn test_temporal_substring_fallback() {
        let result = filter(&sample(), "Joined", "2019-05").unwrap();
        assert_eq!(names(&result), vec!["Bo"]);

        let result = filter(&sample(), "Joined", "08:30").unwrap();
        assert_eq!(names(&result), vec!["Cy"]);
    }

    #[test]
    fn test_date_only_cells_have_no_clock_text() {
        let result = filter(&sample(), "Joined", "00:00").unwrap();
        assert!(result.is_empty());

        let result = filter(&sample(), "Joined", "07 08:30").unwrap();
        assert_eq!(names(&result), vec!["Cy"]);
    }

    #[test]
    fn test_text_case_insensitive_substring() {
        let result = filter(&sample(), "Name", "ANA").unwrap();
        assert_eq!(names(&result), vec!["Ana", "anabel"]);
    }

    #[test]
    fn test_absent_never_matches_non_empty_substring() {
        let table = Table::from_data(vec![
            vec![CellValue::from("c")],
            vec![CellValue::from("a")],
            vec![CellValue::Null],
        ])
        .unwrap();
        assert_eq!(filter(&table, "c", "a").unwrap().row_count(), 1);
        // Empty needle matches everything, absent included
        assert_eq!(filter(&table, "c", "").unwrap().row_count(), 2);
    }

    #[test]
    fn test_filter_is_subset_and_idempotent() {
        let table = sample();
        let once = filter(&table, "Name", "a").unwrap();
        let twice = filter(&once, "Name", "a").unwrap();
        assert_eq!(once.rows(), twice.rows());
        for row in once.rows() {
            assert!(table.rows().contains(row));
        }
        assert!(once.shares_schema_with(&table));
    }

    #[test]
    fn test_filter_keeps_column_type_of_source() {
        let table = Table::from_data(vec![vec!["Code"], vec!["A1"], vec!["7"]]).unwrap();
        let narrowed = filter(&table, "Code", "7").unwrap();
        // Still a text column, so matching stays substring based
        assert_eq!(narrowed.column_type("Code"), Some(ColumnType::Text));
        assert_eq!(filter(&narrowed, "Code", "x").unwrap().row_count(), 0);
    }
}
