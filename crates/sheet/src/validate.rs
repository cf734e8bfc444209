use crate::cell::CellKind;
use crate::table::Table;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// A single data-quality finding for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// The column has absent cells
    MissingValues { column: String, count: usize },
    /// Present cells of the column do not share one runtime kind
    MixedTypes { column: String, kinds: Vec<CellKind> },
}

impl ValidationIssue {
    /// Column the issue was found in
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            ValidationIssue::MissingValues { column, .. }
            | ValidationIssue::MixedTypes { column, .. } => column,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingValues { column, count } => {
                write!(f, "{column}: {count} missing values")
            }
            ValidationIssue::MixedTypes { column, .. } => {
                write!(f, "{column}: Mixed data types detected")
            }
        }
    }
}

/// Ordered list of validation issues. Empty means no issues were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Human readable issue lines in report order
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Scan a table for missing values and mixed per-cell types.
///
/// Missing-value issues come first, then mixed-type issues, each in column
/// order. The mixed-type check looks at what each cell's content reads as,
/// not at the column's inferred type.
#[must_use]
pub fn validate(table: &Table) -> ValidationReport {
    let mut issues = Vec::new();

    for (idx, column) in table.columns().iter().enumerate() {
        let count = table.column_values(idx).filter(|cell| cell.is_null()).count();
        if count > 0 {
            issues.push(ValidationIssue::MissingValues {
                column: column.name().to_string(),
                count,
            });
        }
    }

    for (idx, column) in table.columns().iter().enumerate() {
        let kinds: BTreeSet<CellKind> = table.column_values(idx).filter_map(|cell| cell.kind()).collect();
        if kinds.len() > 1 {
            issues.push(ValidationIssue::MixedTypes {
                column: column.name().to_string(),
                kinds: kinds.into_iter().collect(),
            });
        }
    }

    debug!("Validated {} columns: {} issues", table.col_count(), issues.len());
    ValidationReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn test_clean_table_has_no_issues() {
        let table = Table::from_csv_str("a,b\n1,x\n2,y\n").unwrap();
        let report = validate(&table);
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn test_missing_values() {
        let table = Table::from_csv_str("a,b\n1,\n,\n3,z\n").unwrap();
        let report = validate(&table);
        assert_eq!(
            report.messages(),
            vec!["a: 1 missing values", "b: 2 missing values"]
        );
    }

    #[test]
    fn test_mixed_types() {
        let table = Table::from_csv_str("code,when\n10,2020-01-01\nA7,soon\n").unwrap();
        let report = validate(&table);
        assert_eq!(
            report.issues(),
            &[
                ValidationIssue::MixedTypes {
                    column: "code".to_string(),
                    kinds: vec![CellKind::Number, CellKind::Text],
                },
                ValidationIssue::MixedTypes {
                    column: "when".to_string(),
                    kinds: vec![CellKind::Timestamp, CellKind::Text],
                },
            ]
        );
    }

    #[test]
    fn test_mixed_types_independent_of_inferred_type() {
        let codes = Table::from_data(vec![
            vec![CellValue::from("code")],
            vec![CellValue::from("10")],
            vec![CellValue::from("A7")],
        ])
        .unwrap();
        assert_eq!(codes.column_type("code"), Some(crate::ColumnType::Text));
        assert_eq!(
            validate(&codes).messages(),
            vec!["code: Mixed data types detected"]
        );

        // A number and numeric text hold the same kind of value
        let numbers = Table::from_data(vec![
            vec![CellValue::from("n")],
            vec![CellValue::Number(1.0)],
            vec![CellValue::from("2")],
        ])
        .unwrap();
        assert!(validate(&numbers).is_empty());
    }

    #[test]
    fn test_missing_issues_come_before_mixed() {
        let table = Table::from_csv_str("a,b\n1,\nx,2\n").unwrap();
        assert_eq!(
            validate(&table).messages(),
            vec!["b: 1 missing values", "a: Mixed data types detected"]
        );
    }

    #[test]
    fn test_validation_is_deterministic() {
        let table = Table::from_csv_str("a,b\n1,\nx,2\n,y\n").unwrap();
        assert_eq!(validate(&table), validate(&table));
    }
}
