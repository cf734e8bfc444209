use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Canonical rendering for timestamps, also accepted when parsing.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATETIME_PARSE_FORMATS: [&str; 2] = [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_PARSE_FORMAT: &str = "%Y-%m-%d";

// Optional sign, digits with an optional fraction, or a bare fraction.
static NUMBER_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("number grammar is valid")
});

/// Parse a number using the single unambiguous grammar shared by type
/// inference and the numeric filter. Surrounding whitespace is ignored.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !NUMBER_GRAMMAR.is_match(trimmed) {
        return None;
    }
    trimmed.parse().ok()
}

/// Parse a timestamp in the canonical ISO-8601 layout.
///
/// Accepts `YYYY-MM-DD`, optionally followed by `T` or a space and
/// `HH:MM:SS[.fraction]`. A bare date resolves to midnight.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    DATETIME_PARSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, DATE_PARSE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Render a timestamp in the canonical layout. Sub-second precision is only
/// printed when present, and midnight renders as the bare date.
#[must_use]
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format(DATE_PARSE_FORMAT).to_string()
    } else {
        ts.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Runtime representation of a present cell, used by the mixed-types check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Number,
    Timestamp,
    Text,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Number => write!(f, "number"),
            CellKind::Timestamp => write!(f, "timestamp"),
            CellKind::Text => write!(f, "text"),
        }
    }
}

/// Represents a cell value in a table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value. Distinct from an empty string.
    Null,
    Number(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Check if the value is absent
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Kind of value the cell holds, `None` when absent.
    ///
    /// Text reads as a number or a timestamp when it parses as one, so a
    /// text column of codes like `10` and `A7` holds two kinds.
    #[must_use]
    pub fn kind(&self) -> Option<CellKind> {
        match self {
            CellValue::Null => None,
            CellValue::Number(_) => Some(CellKind::Number),
            CellValue::Timestamp(_) => Some(CellKind::Timestamp),
            CellValue::Text(s) if parse_number(s).is_some() => Some(CellKind::Number),
            CellValue::Text(s) if parse_timestamp(s).is_some() => Some(CellKind::Timestamp),
            CellValue::Text(_) => Some(CellKind::Text),
        }
    }

    /// Numeric value of the cell. Text is accepted when it matches the
    /// number grammar.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
            CellValue::Null | CellValue::Timestamp(_) => None,
        }
    }

    /// Timestamp value of the cell. Text is accepted when it parses under
    /// the canonical format.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Text(s) => parse_timestamp(s),
            CellValue::Null | CellValue::Number(_) => None,
        }
    }

    /// Rendered text form. Absent cells render as the empty string.
    #[must_use]
    pub fn as_str(&self) -> String {
        self.to_string()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Number(i as f64)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Number(f64::from(i))
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(ts: NaiveDateTime) -> Self {
        CellValue::Timestamp(ts)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_number_grammar() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("+7"), Some(7.0));
        assert_eq!(parse_number(".25"), Some(0.25));
        assert_eq!(parse_number("10."), Some(10.0));
        assert_eq!(parse_number("  12 "), Some(12.0));
    }

    #[test]
    fn test_number_grammar_rejects_ambiguous_forms() {
        assert_eq!(parse_number("1,5"), None);
        assert_eq!(parse_number("1e5"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("0x10"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("1 000"), None);
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2020-01-01"), Some(ts(2020, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("2020-01-01 13:45:10"),
            Some(ts(2020, 1, 1, 13, 45, 10))
        );
        assert_eq!(
            parse_timestamp("2020-01-01T13:45:10"),
            Some(ts(2020, 1, 1, 13, 45, 10))
        );
        assert_eq!(parse_timestamp("01/02/2020"), None);
        assert_eq!(parse_timestamp("2020-13-01"), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Number(30.0).to_string(), "30");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(
            CellValue::Timestamp(ts(2020, 1, 1, 0, 0, 0)).to_string(),
            "2020-01-01"
        );
        assert_eq!(
            CellValue::Timestamp(ts(2020, 1, 1, 0, 0, 1)).to_string(),
            "2020-01-01 00:00:01"
        );
        assert_eq!(CellValue::from("x").to_string(), "x");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::Text("12".to_string()).as_number(), Some(12.0));
        assert_eq!(CellValue::Text("abc".to_string()).as_number(), None);
        assert_eq!(CellValue::Null.as_number(), None);
        assert_eq!(
            CellValue::Text("2021-07-07".to_string()).as_timestamp(),
            Some(ts(2021, 7, 7, 0, 0, 0))
        );
        assert_eq!(CellValue::from(None::<f64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(3)), CellValue::Number(3.0));
    }

    #[test]
    fn test_kind() {
        assert_eq!(CellValue::Null.kind(), None);
        assert_eq!(CellValue::Number(1.0).kind(), Some(CellKind::Number));
        assert_eq!(CellValue::Text(String::new()).kind(), Some(CellKind::Text));
        assert_eq!(CellValue::from("02134").kind(), Some(CellKind::Number));
        assert_eq!(CellValue::from("2020-01-01").kind(), Some(CellKind::Timestamp));
        assert_eq!(CellValue::from("A7").kind(), Some(CellKind::Text));
    }
}
