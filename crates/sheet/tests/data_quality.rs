use sift_sheet::{summarize, validate, CellKind, CellValue, ColumnType, Table, ValidationIssue};

#[test]
fn test_report_lists_missing_then_mixed() {
    let table = Table::from_csv_str(
        "id,score,note,when\n\
         1,10,,2020-01-01\n\
         2,,ok,later\n\
         x,7,,2020-02-02\n",
    )
    .unwrap();

    assert_eq!(
        validate(&table).messages(),
        vec![
            "score: 1 missing values",
            "note: 2 missing values",
            "id: Mixed data types detected",
            "when: Mixed data types detected",
        ]
    );
}

#[test]
fn test_report_serializes_issue_kinds() {
    let table = Table::from_csv_str("a,b\n1,1\nx,\n").unwrap();
    let report = validate(&table);
    assert_eq!(report.len(), 2);
    assert!(matches!(
        &report.issues()[1],
        ValidationIssue::MixedTypes { kinds, .. } if kinds == &vec![CellKind::Number, CellKind::Text]
    ));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["issues"][0]["kind"], "missing_values");
    assert_eq!(json["issues"][0]["count"], 1);
    assert_eq!(json["issues"][1]["kind"], "mixed_types");
}

#[test]
fn test_statistics_per_column() {
    let table = Table::from_csv_str(
        "name,score,joined\n\
         a,2.5,2020-01-01\n\
         b,,2020-01-02\n\
         c,-1,\n\
         d,10,2020-01-04\n",
    )
    .unwrap();
    let report = summarize(&table);

    assert_eq!(report.row_count, 4);
    assert_eq!(report.column_count, 3);

    let score = report.column("score").unwrap();
    assert_eq!(score.column_type, ColumnType::Numeric);
    assert_eq!(score.missing, 1);
    let summary = score.numeric.unwrap();
    assert!((summary.min - -1.0).abs() < f64::EPSILON);
    assert!((summary.max - 10.0).abs() < f64::EPSILON);
    assert!((summary.mean - 11.5 / 3.0).abs() < 1e-12);

    let joined = report.column("joined").unwrap();
    assert_eq!(joined.column_type, ColumnType::Temporal);
    assert_eq!(joined.missing, 1);
    assert!(joined.numeric.is_none());
}

#[test]
fn test_statistics_json_shape() {
    let table = Table::from_csv_str("x,y\n1,a\n3,b\n").unwrap();
    let json = serde_json::to_value(summarize(&table)).unwrap();
    assert_eq!(json["row_count"], 2);
    assert_eq!(json["columns"][0]["type"], "numeric");
    assert_eq!(json["columns"][0]["numeric"]["mean"], 2.0);
    assert_eq!(json["columns"][1]["type"], "text");
    assert!(json["columns"][1].get("numeric").is_none());
}

#[test]
fn test_numeric_text_cells_count_toward_statistics() {
    let table = Table::from_data(vec![
        vec![CellValue::from("n")],
        vec![CellValue::from("4")],
        vec![CellValue::Number(6.0)],
    ])
    .unwrap();

    let summary = summarize(&table).columns[0].numeric.unwrap();
    assert!((summary.mean - 5.0).abs() < f64::EPSILON);
    // Numeric text and numbers are the same kind of value
    assert!(validate(&table).is_empty());
}
