/// Data layer: core types, loading, reshaping and export.
///
/// Architecture:
/// ```text
///  .xlsx / .xlsm / .xls / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  named sheet → RawSheet (anchored at A1)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ transform  │  header row, scenario extraction, melt → Vec<LongRecord>
///   └───────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ForecastDataset │  both snapshots concatenated, selector values
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  long-form CSV / Parquet
///   └──────────┘
/// ```

pub mod export;
pub mod loader;
pub mod model;
pub mod transform;
