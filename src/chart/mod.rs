/// Chart layer: declarative figure description and its composition.
///
/// ```text
///   ForecastDataset + rate index + scenarios
///        │
///        ▼
///   ┌──────────┐
///   │ compose  │  filter, sort, grid layout, one trace per snapshot
///   └──────────┘
///        │
///        ▼
///   FigureSpec  ──▶  ui::plot (egui_plot) / JSON export
/// ```

pub mod compose;
pub mod figure;
