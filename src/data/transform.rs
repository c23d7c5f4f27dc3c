use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

use super::model::{CellValue, LongRecord, RawSheet};
use crate::config::SheetConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("header row {header_row} is outside the sheet ({height} rows)")]
    MissingHeaderRow { header_row: usize, height: usize },

    #[error("expected at least 3 columns (scenario, rate index, dates), found {found}")]
    TooFewColumns { found: usize },

    #[error("no column label from the third column onward parses as a date")]
    NoValuationDate,
}

impl TransformError {
    /// Whether the sheet itself has the wrong shape (as opposed to bad labels).
    pub fn is_schema(&self) -> bool {
        !matches!(self, TransformError::NoValuationDate)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Row-level drop counters. Drops never fail the transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropStats {
    /// Data rows below the header row.
    pub rows_read: usize,
    pub rows_missing_rate_index: usize,
    pub rows_missing_scenario: usize,
    /// Cells skipped because their column label is not a date.
    pub cells_bad_date: usize,
    /// Cells skipped because the rate is missing or not a finite number.
    pub cells_bad_rate: usize,
    pub records: usize,
}

impl DropStats {
    pub fn rows_dropped(&self) -> usize {
        self.rows_missing_rate_index + self.rows_missing_scenario
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub records: Vec<LongRecord>,
    pub valuation_date: NaiveDate,
    pub stats: DropStats,
}

// ---------------------------------------------------------------------------
// Transformer
// ---------------------------------------------------------------------------

/// Reshape a wide forecast sheet into long-form records tagged with `snapshot`.
///
/// Records come out row-major: every date column of the first kept row, then
/// the next row, and so on.
pub fn transform(
    raw: &RawSheet,
    config: &SheetConfig,
    snapshot: &str,
) -> Result<Transformed, TransformError> {
    let header = raw
        .rows
        .get(config.header_row)
        .ok_or(TransformError::MissingHeaderRow {
            header_row: config.header_row,
            height: raw.height(),
        })?;
    if raw.width() < 3 {
        return Err(TransformError::TooFewColumns { found: raw.width() });
    }

    let labels: Vec<String> = header
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();
    // Index i holds the date for column i + 2.
    let column_dates: Vec<Option<NaiveDate>> =
        labels[2..].iter().map(String::as_str).map(parse_date_label).collect();
    let valuation_date = column_dates
        .iter()
        .flatten()
        .next()
        .copied()
        .ok_or(TransformError::NoValuationDate)?;

    let mut stats = DropStats::default();
    let mut records = Vec::new();

    for row in &raw.rows[config.header_row + 1..] {
        stats.rows_read += 1;

        let Some(rate_index) = row[1].as_label() else {
            stats.rows_missing_rate_index += 1;
            continue;
        };
        let Some(scenario) = extract_scenario(&row[0].to_string()) else {
            stats.rows_missing_scenario += 1;
            continue;
        };

        for (cell, date) in row[2..].iter().zip(&column_dates) {
            let Some(date) = date else {
                stats.cells_bad_date += 1;
                continue;
            };
            let Some(rate) = cell.as_rate() else {
                stats.cells_bad_rate += 1;
                continue;
            };
            records.push(LongRecord {
                scenario: scenario.clone(),
                rate_index: rate_index.clone(),
                date: *date,
                rate,
                month_offset: month_diff(valuation_date, *date),
                snapshot: snapshot.to_string(),
            });
        }
    }

    stats.records = records.len();
    log::debug!("transform '{snapshot}': valuation {valuation_date}, {stats:?}");

    Ok(Transformed {
        records,
        valuation_date,
        stats,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whole-month difference `to - from`, ignoring the day of month.
pub fn month_diff(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// First slash-enclosed segment of a scenario path, trimmed.
pub fn extract_scenario(path: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"/\s*([^/]+)\s*/").expect("valid regex"));

    let caps = pattern.captures(path)?;
    let scenario = caps.get(1)?.as_str().trim();
    (!scenario.is_empty()).then(|| scenario.to_string())
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
// Month-first wins over day-first for ambiguous slashed dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y",
    "%B %d, %Y",
];
/// Labels without a day; they resolve to the 1st of the month.
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%b %Y", "%b-%Y", "%B %Y", "%B-%Y"];

/// Parse a column label as a calendar date.
///
/// Month-only labels (`Jan 2024`, `2024-01`) map to the 1st of the month and
/// a bare four-digit year to 1 January.
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(label, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
        })
        .or_else(|| {
            let with_day = format!("{label} 1");
            MONTH_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&with_day, &format!("{fmt} %d")).ok())
        })
        .or_else(|| parse_year_label(label))
}

fn parse_year_label(label: &str) -> Option<NaiveDate> {
    if label.len() != 4 || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(label.parse().ok()?, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Five banner rows, a header at row 5, then data.
    fn sheet(header: Vec<CellValue>, data: Vec<Vec<CellValue>>) -> RawSheet {
        let mut rows = vec![vec![text("Market Forecast")]];
        rows.extend((0..4).map(|_| vec![CellValue::Empty]));
        rows.push(header);
        rows.extend(data);
        RawSheet::from_rows(rows)
    }

    fn standard_header() -> Vec<CellValue> {
        vec![
            text(" Scenario "),
            text("Rate Index"),
            text("2024-01-15"),
            text("2024-02-15"),
            text("2024-03-01"),
        ]
    }

    #[test]
    fn month_offset_ignores_day_of_month() {
        assert_eq!(month_diff(date(2024, 1, 15), date(2024, 3, 1)), 2);
        assert_eq!(month_diff(date(2024, 1, 31), date(2024, 1, 1)), 0);
        assert_eq!(month_diff(date(2023, 11, 30), date(2025, 2, 1)), 15);
        assert_eq!(month_diff(date(2024, 5, 1), date(2024, 2, 28)), -3);
    }

    #[test]
    fn scenario_is_first_enclosed_segment() {
        assert_eq!(
            extract_scenario("Root/ Base Case /Sub").as_deref(),
            Some("Base Case")
        );
        assert_eq!(extract_scenario("A/B/C/D").as_deref(), Some("B"));
        assert_eq!(extract_scenario("RootOnly"), None);
        assert_eq!(extract_scenario("Root/Trailing"), None);
        assert_eq!(extract_scenario("Root/   /x"), None);
    }

    #[test]
    fn date_labels_in_common_layouts() {
        assert_eq!(parse_date_label("2024-01-31"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("2024-01-31 00:00:00"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("1/31/2024"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("31-Jan-2024"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("Jan 31, 2024"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("2024-01-31 00:00:00.000"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("2024-01-31T12:30:00.5"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("31/01/2024"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date_label("02/03/2024"), Some(date(2024, 2, 3)));
        assert_eq!(parse_date_label("Notes"), None);
        assert_eq!(parse_date_label(""), None);
    }

    #[test]
    fn month_and_year_labels_resolve_to_the_first() {
        assert_eq!(parse_date_label("2024-01"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date_label("2024/07"), Some(date(2024, 7, 1)));
        assert_eq!(parse_date_label("Jan 2024"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date_label("Jan-2024"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date_label("January 2024"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date_label("2024"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date_label("12"), None);
        assert_eq!(parse_date_label("2024-13"), None);
    }

    #[test]
    fn month_labelled_sheet_is_reshaped() {
        let raw = sheet(
            vec![text("Scenario"), text("Index"), text("2024-01"), text("2024-02")],
            vec![vec![text("R/Base/x"), text("SOFR"), num(5.0), num(4.9)]],
        );
        let out = transform(&raw, &SheetConfig::default(), "Current Rate").unwrap();
        assert_eq!(out.valuation_date, date(2024, 1, 1));
        let offsets: Vec<i32> = out.records.iter().map(|r| r.month_offset).collect();
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn reshapes_rows_into_long_records() {
        let raw = sheet(
            standard_header(),
            vec![
                vec![text("Root/ Base Case /Sub"), text("SOFR"), num(5.0), num(5.1), num(5.2)],
                vec![text("Root/Stress/Sub"), text("Prime"), num(8.0), num(8.5), num(9.0)],
            ],
        );
        let out = transform(&raw, &SheetConfig::default(), "Current Rate").unwrap();

        assert_eq!(out.valuation_date, date(2024, 1, 15));
        assert_eq!(out.records.len(), 6);

        let first = &out.records[0];
        assert_eq!(first.scenario, "Base Case");
        assert_eq!(first.rate_index, "SOFR");
        assert_eq!(first.date, date(2024, 1, 15));
        assert_eq!(first.month_offset, 0);
        assert_eq!(first.snapshot, "Current Rate");

        let offsets: Vec<i32> = out.records.iter().map(|r| r.month_offset).collect();
        assert_eq!(offsets, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(out.records[5].rate, 9.0);
        assert_eq!(out.stats.records, 6);
        assert_eq!(out.stats.rows_dropped(), 0);
    }

    #[test]
    fn unparseable_rows_and_cells_are_dropped_and_counted() {
        let mut header = standard_header();
        header.push(text("Comment"));
        let raw = sheet(
            header,
            vec![
                vec![text("Root/Base/x"), text("SOFR"), num(5.0), text("n/a"), CellValue::Empty, text("ok")],
                vec![text("Root/Base/x"), CellValue::Empty, num(1.0), num(1.0), num(1.0), num(1.0)],
                vec![text("RootOnly"), text("SOFR"), num(1.0), num(1.0), num(1.0), num(1.0)],
                vec![text("Root/Base/x"), text("   "), num(1.0), num(1.0), num(1.0), num(1.0)],
            ],
        );
        let out = transform(&raw, &SheetConfig::default(), "Previous Rate").unwrap();

        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].rate, 5.0);
        assert_eq!(
            out.stats,
            DropStats {
                rows_read: 4,
                rows_missing_rate_index: 2,
                rows_missing_scenario: 1,
                cells_bad_date: 1,
                cells_bad_rate: 2,
                records: 1,
            }
        );
    }

    #[test]
    fn valuation_date_is_first_parsed_column_not_earliest() {
        let raw = sheet(
            vec![
                text("Scenario"),
                text("Index"),
                text("Label"),
                text("2024-06-30"),
                text("2024-01-31"),
            ],
            vec![vec![text("R/Base/x"), text("SOFR"), num(1.0), num(2.0), num(3.0)]],
        );
        let out = transform(&raw, &SheetConfig::default(), "Current Rate").unwrap();

        assert_eq!(out.valuation_date, date(2024, 6, 30));
        let offsets: Vec<i32> = out.records.iter().map(|r| r.month_offset).collect();
        assert_eq!(offsets, vec![0, -5]);
    }

    #[test]
    fn datetime_header_cells_parse_as_dates() {
        let dt = |y, m, d| CellValue::DateTime(date(y, m, d).and_hms_opt(0, 0, 0).unwrap());
        let raw = sheet(
            vec![text("Scenario"), text("Index"), dt(2024, 1, 31), dt(2024, 2, 29)],
            vec![vec![text("R/Base/x"), text("SOFR"), num(1.0), num(2.0)]],
        );
        let out = transform(&raw, &SheetConfig::default(), "Current Rate").unwrap();
        assert_eq!(out.records[1].date, date(2024, 2, 29));
        assert_eq!(out.records[1].month_offset, 1);
    }

    #[test]
    fn schema_errors() {
        let narrow = sheet(vec![text("Scenario"), text("Index")], vec![]);
        let err = transform(&narrow, &SheetConfig::default(), "x").unwrap_err();
        assert_eq!(err, TransformError::TooFewColumns { found: 2 });
        assert!(err.is_schema());

        let short = RawSheet::from_rows(vec![vec![text("a"), text("b"), text("2024-01-01")]]);
        let err = transform(&short, &SheetConfig::default(), "x").unwrap_err();
        assert_eq!(err, TransformError::MissingHeaderRow { header_row: 5, height: 1 });
    }

    #[test]
    fn no_date_columns_is_an_error() {
        let raw = sheet(
            vec![text("Scenario"), text("Index"), text("Q1"), text("Q2")],
            vec![vec![text("R/Base/x"), text("SOFR"), num(1.0), num(2.0)]],
        );
        let err = transform(&raw, &SheetConfig::default(), "x").unwrap_err();
        assert_eq!(err, TransformError::NoValuationDate);
        assert!(!err.is_schema());
    }

    #[test]
    fn header_row_is_configurable() {
        let raw = RawSheet::from_rows(vec![
            standard_header(),
            vec![text("R/Base/x"), text("SOFR"), num(1.0), num(2.0), num(3.0)],
        ]);
        let config = SheetConfig {
            header_row: 0,
            ..SheetConfig::default()
        };
        let out = transform(&raw, &config, "Current Rate").unwrap();
        assert_eq!(out.records.len(), 3);
    }

    #[test]
    fn repeated_transform_is_identical() {
        let raw = sheet(
            standard_header(),
            vec![vec![text("R/Base/x"), text("SOFR"), num(1.0), num(2.0), num(3.0)]],
        );
        let config = SheetConfig::default();
        let a = transform(&raw, &config, "Current Rate").unwrap();
        let b = transform(&raw, &config, "Current Rate").unwrap();
        assert_eq!(a, b);
    }
}
