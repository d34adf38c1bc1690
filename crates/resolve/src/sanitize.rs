use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::DateWindow;
use crate::model::{Table, Value};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Parse a timestamp from text. Date-only forms map to midnight.
///
/// Shared by the reader (typing date columns on load) and the sanitizer
/// (re-parsing whatever text is left in a date column).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum InvalidReason {
    Unparsable,
    OutOfRange { year: i32 },
}

/// A date cell that was nulled. Recovered locally, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidDate {
    pub row: usize,
    pub field: String,
    pub reason: InvalidReason,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SanitizeReport {
    pub nulled: Vec<InvalidDate>,
}

/// Null every unparsable or out-of-window value in the named date columns.
///
/// Text that parses is converted to a `Date` value in place. Columns that
/// are not in the table are skipped.
pub fn sanitize_dates(table: &mut Table, date_fields: &[&str], window: &DateWindow) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    for &field in date_fields {
        let Some(col) = table.column_index(field) else {
            continue;
        };

        for (row_idx, row) in table.rows.iter_mut().enumerate() {
            let cell = &mut row.cells[col];
            let Some(value) = cell.take() else {
                continue;
            };

            let parsed = match value {
                Value::Date(dt) => Some(dt),
                Value::Text(ref s) => parse_timestamp(s),
                Value::Number(_) => None,
            };

            *cell = match parsed {
                Some(dt) if window.contains(dt.year()) => Some(Value::Date(dt)),
                Some(dt) => {
                    report.nulled.push(InvalidDate {
                        row: row_idx,
                        field: field.to_string(),
                        reason: InvalidReason::OutOfRange { year: dt.year() },
                    });
                    None
                }
                None => {
                    report.nulled.push(InvalidDate {
                        row: row_idx,
                        field: field.to_string(),
                        reason: InvalidReason::Unparsable,
                    });
                    None
                }
            };
        }
    }

    for invalid in &report.nulled {
        log::debug!(
            "nulled {} at row {}: {:?}",
            invalid.field,
            invalid.row,
            invalid.reason
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn parse_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 4, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2021-04-05"), Some(expected));
        assert_eq!(parse_timestamp(" 05.04.2021 "), Some(expected));
        assert_eq!(parse_timestamp("2021/04/05"), Some(expected));
        assert_eq!(parse_timestamp("20210405"), Some(expected));
        assert_eq!(
            parse_timestamp("2021-04-05 13:30:00"),
            NaiveDate::from_ymd_opt(2021, 4, 5).unwrap().and_hms_opt(13, 30, 0)
        );
        assert_eq!(
            parse_timestamp("2021-04-05T13:30:00Z"),
            NaiveDate::from_ymd_opt(2021, 4, 5).unwrap().and_hms_opt(13, 30, 0)
        );
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn out_of_window_years_are_nulled() {
        let mut table = Table::new(vec!["update_date".into(), "name".into()]);
        table.push(vec![Some(date(1850, 1, 1)), Some(Value::text("A"))]);
        table.push(vec![Some(date(2099, 1, 1)), Some(Value::text("B"))]);
        table.push(vec![Some(date(1924, 1, 1)), Some(Value::text("C"))]);
        table.push(vec![Some(date(2024, 12, 31)), Some(Value::text("D"))]);

        let report = sanitize_dates(&mut table, &["update_date"], &DateWindow::default());

        assert_eq!(table.rows[0].cells[0], None);
        assert_eq!(table.rows[1].cells[0], None);
        assert_eq!(table.rows[2].cells[0], Some(date(1924, 1, 1)));
        assert_eq!(table.rows[3].cells[0], Some(date(2024, 12, 31)));
        assert_eq!(report.nulled.len(), 2);
        assert_eq!(report.nulled[0].reason, InvalidReason::OutOfRange { year: 1850 });
        // Non-date columns untouched
        assert_eq!(table.rows[0].cells[1], Some(Value::text("A")));
    }

    #[test]
    fn text_is_parsed_or_nulled() {
        let mut table = Table::new(vec!["create_date".into()]);
        table.push(vec![Some(Value::text("2020-02-03"))]);
        table.push(vec![Some(Value::text("garbage"))]);
        table.push(vec![Some(Value::number(5.0))]);
        table.push(vec![None]);

        let report = sanitize_dates(&mut table, &["create_date"], &DateWindow::default());

        assert_eq!(table.rows[0].cells[0], Some(date(2020, 2, 3)));
        assert_eq!(table.rows[1].cells[0], None);
        assert_eq!(table.rows[2].cells[0], None);
        assert_eq!(table.rows[3].cells[0], None);
        assert_eq!(report.nulled.len(), 2);
        assert!(report.nulled.iter().all(|n| n.reason == InvalidReason::Unparsable));
    }

    #[test]
    fn missing_columns_are_skipped() {
        let mut table = Table::new(vec!["name".into()]);
        table.push(vec![Some(Value::text("X"))]);
        let report = sanitize_dates(&mut table, &["update_date"], &DateWindow::default());
        assert!(report.nulled.is_empty());
    }
}
