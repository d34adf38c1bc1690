// Cell typing and text canonicalization

use nugget_resolve::sanitize::parse_timestamp;
use nugget_resolve::{Cell, Value};

/// Cell contents read as null, compared after trimming.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

pub fn is_null_marker(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw.trim())
}

/// Trim and uppercase, so "  ivanov " and "Ivanov" compare equal.
pub fn canonicalize_text(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Digits beyond this do not survive a round trip through `f64`.
const MAX_EXACT_DIGITS: usize = 15;

/// Integer text that `f64` would alter: a leading zero ("00123") or more
/// significant digits than a double holds exactly.
fn is_identifier_like(raw: &str) -> bool {
    let s = raw.trim();
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let significant = digits.trim_start_matches('0').len();
    (digits.len() > 1 && digits.starts_with('0')) || significant > MAX_EXACT_DIGITS
}

/// Type one column of raw cells.
///
/// Date columns become `Date` where the text parses; unparsable text is
/// kept so the sanitizer can account for it. Other columns are numeric
/// only when every present cell is a number and none is identifier-like,
/// otherwise canonicalized text.
pub fn type_column(raw: &[Option<&str>], is_date: bool) -> Vec<Cell> {
    if is_date {
        return raw
            .iter()
            .map(|c| {
                c.map(|s| match parse_timestamp(s) {
                    Some(dt) => Value::Date(dt),
                    None => Value::text(s.trim()),
                })
            })
            .collect();
    }

    let numeric = raw
        .iter()
        .flatten()
        .all(|s| parse_number(s).is_some() && !is_identifier_like(s));
    raw.iter()
        .map(|c| {
            c.map(|s| match parse_number(s) {
                Some(n) if numeric => Value::number(n),
                _ => Value::text(canonicalize_text(s)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn canonicalize() {
        assert_eq!(canonicalize_text("  ivanov "), "IVANOV");
        assert_eq!(canonicalize_text("Пётр"), "ПЁТР");
    }

    #[test]
    fn null_markers() {
        assert!(is_null_marker(""));
        assert!(is_null_marker("  NULL "));
        assert!(is_null_marker("nan"));
        assert!(!is_null_marker("0"));
        assert!(!is_null_marker("none of these"));
    }

    #[test]
    fn numeric_column() {
        let cells = type_column(&[Some("1"), None, Some(" 2.5 ")], false);
        assert_eq!(cells, vec![Some(Value::number(1.0)), None, Some(Value::number(2.5))]);
    }

    #[test]
    fn mixed_column_is_text() {
        let cells = type_column(&[Some("1"), Some("abc ")], false);
        assert_eq!(cells, vec![Some(Value::text("1")), Some(Value::text("ABC"))]);
    }

    #[test]
    fn leading_zero_keeps_column_text() {
        let cells = type_column(&[Some("00123"), Some("123"), Some("0.5")], false);
        assert_eq!(
            cells,
            vec![Some(Value::text("00123")), Some(Value::text("123")), Some(Value::text("0.5"))]
        );
    }

    #[test]
    fn long_integers_stay_exact() {
        let cells = type_column(&[Some("9007199254740993"), Some("7")], false);
        assert_eq!(cells, vec![Some(Value::text("9007199254740993")), Some(Value::text("7"))]);
        // Fifteen digits still fit
        let cells = type_column(&[Some("123456789012345"), Some("0")], false);
        assert_eq!(cells[0], Some(Value::number(123456789012345.0)));
    }

    #[test]
    fn identifier_detection() {
        assert!(is_identifier_like(" 0042 "));
        assert!(is_identifier_like("-12345678901234567"));
        assert!(!is_identifier_like("0"));
        assert!(!is_identifier_like("0.25"));
        assert!(!is_identifier_like("1e20"));
    }

    #[test]
    fn infinity_is_not_a_number() {
        let cells = type_column(&[Some("inf")], false);
        assert_eq!(cells, vec![Some(Value::text("INF"))]);
    }

    #[test]
    fn date_column() {
        let cells = type_column(&[Some("2020-01-02"), Some("soon"), None], true);
        let expected = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(cells, vec![Some(Value::Date(expected)), Some(Value::text("soon")), None]);
    }
}
