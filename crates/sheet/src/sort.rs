use crate::cell::CellValue;
use crate::column::ColumnType;
use crate::error::SortError;
use crate::table::Table;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("Unknown sort direction: {other}")),
        }
    }
}

/// Comparable key for one cell. Absent sorts below everything else.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Absent,
    Number(f64),
    Time(NaiveDateTime),
    Text(String),
}

impl SortKey {
    fn new(cell: &CellValue, column_type: ColumnType) -> Self {
        if cell.is_null() {
            return SortKey::Absent;
        }
        match column_type {
            ColumnType::Numeric => cell.as_number().map_or(SortKey::Absent, SortKey::Number),
            ColumnType::Temporal => cell.as_timestamp().map_or(SortKey::Absent, SortKey::Time),
            ColumnType::Text => SortKey::Text(cell.to_string().to_lowercase()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Absent => 0,
            SortKey::Number(_) => 1,
            SortKey::Time(_) => 2,
            SortKey::Text(_) => 3,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Reorder the rows of `view` by `column`.
///
/// Numeric and temporal columns compare by value, text columns compare
/// their rendered form ignoring case. Absent cells come first when
/// ascending and last when descending. The sort is stable in both
/// directions, so rows with equal keys keep their input order.
pub fn sort(view: &Table, column: &str, direction: SortDirection) -> Result<Table, SortError> {
    let col_idx = view.column_index(column).ok_or_else(|| SortError::UnknownColumn {
        name: column.to_string(),
    })?;
    let column_type = view.columns()[col_idx].column_type();

    let keys: Vec<SortKey> = view
        .column_values(col_idx)
        .map(|cell| SortKey::new(cell, column_type))
        .collect();

    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| {
        let ordering = keys[a].compare(&keys[b]);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    let rows = order
        .into_iter()
        .map(|idx| view.rows()[idx].clone())
        .collect();

    debug!(
        "Sort {} ({}) {}: {} rows",
        column,
        column_type,
        direction,
        keys.len()
    );
    Ok(view.derive(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_csv_str(
            "Name,Age,Joined\n\
             bo,25,2019-05-05\n\
             Ana,30,2020-01-01\n\
             Cy,,2021-07-07\n\
             dee,25,\n",
        )
        .unwrap()
    }

    fn column(table: &Table, name: &str) -> Vec<String> {
        let idx = table.column_index(name).unwrap();
        table.column_values(idx).map(CellValue::to_string).collect()
    }

    #[test]
    fn test_unknown_column() {
        let err = sort(&sample(), "Nope", SortDirection::Ascending).unwrap_err();
        assert_eq!(
            err,
            SortError::UnknownColumn {
                name: "Nope".to_string()
            }
        );
    }

    #[test]
    fn test_text_sort_is_case_insensitive() {
        let sorted = sort(&sample(), "Name", SortDirection::Ascending).unwrap();
        assert_eq!(column(&sorted, "Name"), vec!["Ana", "bo", "Cy", "dee"]);
    }

    #[test]
    fn test_numeric_sort_with_absent_first() {
        let sorted = sort(&sample(), "Age", SortDirection::Ascending).unwrap();
        assert_eq!(column(&sorted, "Name"), vec!["Cy", "bo", "dee", "Ana"]);
    }

    #[test]
    fn test_numeric_sort_descending_puts_absent_last() {
        let sorted = sort(&sample(), "Age", SortDirection::Descending).unwrap();
        assert_eq!(column(&sorted, "Name"), vec!["Ana", "bo", "dee", "Cy"]);
    }

    #[test]
    fn test_numeric_sort_is_by_value_not_text() {
        let table = Table::from_csv_str("n\n10\n9\n100\n-1\n").unwrap();
        let sorted = sort(&table, "n", SortDirection::Ascending).unwrap();
        assert_eq!(column(&sorted, "n"), vec!["-1", "9", "10", "100"]);
    }

    #[test]
    fn test_temporal_sort() {
        let sorted = sort(&sample(), "Joined", SortDirection::Descending).unwrap();
        assert_eq!(column(&sorted, "Name"), vec!["Cy", "Ana", "bo", "dee"]);
    }

    #[test]
    fn test_stable_on_ties() {
        // bo and dee share Age 25 and keep their input order both ways
        let asc = sort(&sample(), "Age", SortDirection::Ascending).unwrap();
        let names = column(&asc, "Name");
        let bo = names.iter().position(|n| n == "bo").unwrap();
        let dee = names.iter().position(|n| n == "dee").unwrap();
        assert!(bo < dee);

        let desc = sort(&sample(), "Age", SortDirection::Descending).unwrap();
        let names = column(&desc, "Name");
        let bo = names.iter().position(|n| n == "bo").unwrap();
        let dee = names.iter().position(|n| n == "dee").unwrap();
        assert!(bo < dee);
    }

    #[test]
    fn test_reverse_direction_reverses_without_ties() {
        let asc = sort(&sample(), "Name", SortDirection::Ascending).unwrap();
        let desc = sort(&asc, "Name", SortDirection::Descending).unwrap();
        let mut reversed = column(&asc, "Name");
        reversed.reverse();
        assert_eq!(column(&desc, "Name"), reversed);
    }

    #[test]
    fn test_sort_keeps_schema() {
        let table = sample();
        let sorted = sort(&table, "Name", SortDirection::Ascending).unwrap();
        assert!(sorted.shares_schema_with(&table));
        assert_eq!(sorted.row_count(), table.row_count());
    }

    #[test]
    fn test_direction_parse_and_toggle() {
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Ascending));
        assert_eq!(
            "descending".parse::<SortDirection>(),
            Ok(SortDirection::Descending)
        );
        assert!("sideways".parse::<SortDirection>().is_err());
        assert_eq!(
            SortDirection::Ascending.toggled(),
            SortDirection::Descending
        );
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }
}
