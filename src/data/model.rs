use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as delivered by the spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Date-formatted cell, already converted from the spreadsheet serial.
    DateTime(NaiveDateTime),
    /// Formula error such as `#N/A`, kept as its display text.
    Error(String),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Error(e) => write!(f, "{e}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a finite rate. Numeric text is accepted.
    pub fn as_rate(&self) -> Option<f64> {
        let v = match self {
            CellValue::Number(v) => *v,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Text content with surrounding whitespace removed, `None` when blank.
    pub fn as_label(&self) -> Option<String> {
        let text = self.to_string();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// RawSheet – the rectangular grid read from one worksheet
// ---------------------------------------------------------------------------

/// Grid of cells anchored at the sheet's first row and column, so row `n`
/// here is row `n` of the worksheet (0-based). Every row has the same width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    /// Build a grid, padding short rows with [`CellValue::Empty`].
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        RawSheet { rows }
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// LongRecord – one tidy observation
// ---------------------------------------------------------------------------

/// One forecast observation: a rate for a scenario / index pair at a date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub scenario: String,
    pub rate_index: String,
    pub date: NaiveDate,
    pub rate: f64,
    /// Whole months between the valuation date and `date`.
    pub month_offset: i32,
    pub snapshot: String,
}

// ---------------------------------------------------------------------------
// ForecastDataset – both snapshots concatenated
// ---------------------------------------------------------------------------

/// The combined long-form dataset with pre-computed selector values.
#[derive(Debug, Clone, Default)]
pub struct ForecastDataset {
    pub records: Vec<LongRecord>,
    /// Sorted unique rate index names.
    pub rate_indices: BTreeSet<String>,
    /// Sorted unique scenario names.
    pub scenarios: BTreeSet<String>,
}

impl ForecastDataset {
    pub fn from_records(records: Vec<LongRecord>) -> Self {
        let rate_indices = records.iter().map(|r| r.rate_index.clone()).collect();
        let scenarios = records.iter().map(|r| r.scenario.clone()).collect();
        ForecastDataset {
            records,
            rate_indices,
            scenarios,
        }
    }

    /// Concatenate snapshot collections in the given order.
    pub fn concat<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Vec<LongRecord>>,
    {
        Self::from_records(parts.into_iter().flatten().collect())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
