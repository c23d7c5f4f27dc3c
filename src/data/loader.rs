use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, open_workbook_auto};

use super::model::{CellValue, RawSheet};
use crate::config::SheetConfig;

/// Extensions offered in the upload dialog.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read the forecast sheet from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xls` / `.xlsx` / `.xlsm` / `.xlsb` / `.ods` – the sheet named in `config`
/// * `.csv` – an export of that sheet, banner rows included
pub fn load_sheet(path: &Path, config: &SheetConfig) -> Result<RawSheet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        e if SPREADSHEET_EXTENSIONS.contains(&e) => load_workbook(path, &config.sheet_name),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path, sheet_name: &str) -> Result<RawSheet> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening workbook {path:?}"))?;

    if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
        bail!(
            "Workbook has no sheet named '{sheet_name}' (found: {})",
            workbook.sheet_names().join(", ")
        );
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .with_context(|| format!("reading worksheet '{sheet_name}'"))?;

    Ok(range_to_sheet(&range))
}

/// Re-anchor a calamine range at A1 so row indices match the worksheet.
fn range_to_sheet(range: &Range<Data>) -> RawSheet {
    let Some((row_offset, col_offset)) = range.start() else {
        return RawSheet::default();
    };
    let row_offset = row_offset as usize;
    let col_offset = col_offset as usize;

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for source_row in range.rows() {
        let mut row = vec![CellValue::Empty; col_offset];
        row.extend(source_row.iter().map(cell_value));
        rows.push(row);
    }
    RawSheet::from_rows(rows)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Number(dt.as_f64()),
        },
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV exports keep the banner rows, so every record is read as data and the
/// header row is located later by index. Fully blank lines are skipped by the
/// reader; spreadsheet exports write them as `,,,`. Numeric-looking fields
/// become numbers.
fn load_csv(path: &Path) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawSheet::from_rows(rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Number(f);
    }
    CellValue::Text(s.to_string())
}
