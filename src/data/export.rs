use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use super::model::LongRecord;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write long-form records to a file.  Dispatch by extension.
///
/// * `.csv`     – header row, one record per line, ISO dates
/// * `.parquet` – flat schema, `date` as Date32
pub fn export_records(path: &Path, records: &[LongRecord]) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, records),
        "parquet" | "pq" => write_parquet(path, records),
        other => bail!("Unsupported export extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn write_csv(path: &Path, records: &[LongRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for record in records {
        writer.serialize(record).context("writing CSV record")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn long_schema() -> Schema {
    Schema::new(vec![
        Field::new("scenario", DataType::Utf8, false),
        Field::new("rate_index", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("rate", DataType::Float64, false),
        Field::new("month_offset", DataType::Int32, false),
        Field::new("snapshot", DataType::Utf8, false),
    ])
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

fn write_parquet(path: &Path, records: &[LongRecord]) -> Result<()> {
    let schema = Arc::new(long_schema());

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.scenario))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.rate_index))),
        Arc::new(Date32Array::from_iter_values(
            records.iter().map(|r| days_since_epoch(r.date)),
        )),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.rate))),
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.month_offset))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.snapshot))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("opening parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
